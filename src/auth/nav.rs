//! Navigation composer: which menu entries the current account sees.
//!
//! Every entry carries the `Requirement` its route is guarded by, and
//! visibility is decided by `policy::check_user`. The router registers these
//! same entries as guarded routes, so a hidden entry always corresponds to a
//! denied route.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use super::policy::{Requirement, check_user};
use super::store::Session;
use super::types::{Privilege, Role, User};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavEntry {
    pub path: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    /// `None` for storefront links anyone may follow.
    pub requirement: Option<Requirement>,
}

const fn entry(path: &'static str, icon: &'static str, label: &'static str, requirement: Requirement) -> NavEntry {
    NavEntry { path, icon, label, requirement: Some(requirement) }
}

const fn public(path: &'static str, label: &'static str) -> NavEntry {
    NavEntry { path, icon: "", label, requirement: None }
}

pub const ADMIN_DASHBOARD_PATH: &str = "/admin/dashboard";
pub const USER_DASHBOARD_PATH: &str = "/user/dashboard";

/// Admin back-office sidebar, in display order.
pub const ADMIN_MENU: [NavEntry; 6] = [
    entry(ADMIN_DASHBOARD_PATH, "📊", "Overview", Requirement::Admin),
    entry("/admin/users", "👥", "Users", Requirement::Admin),
    entry("/admin/categories", "📂", "Categories", Requirement::Admin),
    entry("/admin/brands", "🏢", "Brands", Requirement::Admin),
    entry("/admin/deals", "💰", "Deals", Requirement::Admin),
    entry("/admin/blogs", "📝", "Blogs", Requirement::Admin),
];

/// Data-entry sidebar, in display order. Overview is always present.
pub const USER_MENU: [NavEntry; 5] = [
    entry(USER_DASHBOARD_PATH, "📊", "Overview", Requirement::Authenticated),
    entry("/user/categories", "📂", "Categories", Requirement::Privilege(Privilege::Categories)),
    entry("/user/brands", "🏢", "Brands", Requirement::Privilege(Privilege::Brands)),
    entry("/user/deals", "💰", "Deals", Requirement::Privilege(Privilege::Deals)),
    entry("/user/blogs", "📝", "Blogs", Requirement::Privilege(Privilege::Blogs)),
];

/// Storefront links shown to everyone.
pub const PUBLIC_LINKS: [NavEntry; 5] = [
    public("/", "Home"),
    public("/categories", "Categories"),
    public("/brands", "Brands"),
    public("/deals", "Deals"),
    public("/blogs", "Blogs"),
];

/// Dashboard landing path for a role.
#[must_use]
pub fn dashboard_path(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_DASHBOARD_PATH,
        Role::DataEntry => USER_DASHBOARD_PATH,
    }
}

/// The sidebar menu for `role`, before filtering.
#[must_use]
pub fn menu_for(role: Role) -> &'static [NavEntry] {
    match role {
        Role::Admin => &ADMIN_MENU,
        Role::DataEntry => &USER_MENU,
    }
}

/// Sidebar entries `user` may open.
#[must_use]
pub fn sidebar(user: &User) -> Vec<NavEntry> {
    menu_for(user.role)
        .iter()
        .filter(|e| e.requirement.is_none_or(|r| check_user(user, r).is_ok()))
        .copied()
        .collect()
}

/// Sidebar for the current session; empty while loading or signed out.
#[must_use]
pub fn sidebar_for(session: &Session) -> Vec<NavEntry> {
    if session.loading {
        return Vec::new();
    }
    session.user().map(sidebar).unwrap_or_default()
}

/// Top navigation bar: storefront links plus the role's dashboard link.
#[must_use]
pub fn navbar(session: &Session) -> Vec<NavEntry> {
    let mut links = PUBLIC_LINKS.to_vec();
    if session.loading {
        return links;
    }
    match session.user().map(|u| u.role) {
        Some(Role::Admin) => links.push(entry(ADMIN_DASHBOARD_PATH, "", "Admin Dashboard", Requirement::Admin)),
        Some(Role::DataEntry) => links.push(entry(USER_DASHBOARD_PATH, "", "Dashboard", Requirement::Authenticated)),
        None => {}
    }
    links
}

/// Highlight test for the sidebar link matching the current location.
#[must_use]
pub fn is_active(entry: &NavEntry, current_path: &str) -> bool {
    entry.path == current_path
}
