//! Route table and resolution.
//!
//! SYSTEM CONTEXT
//! ==============
//! Maps a location to the page it shows for the current session. Back-office
//! routes are exactly the sidebar entries from `auth::nav`, each guarded by
//! the entry's own requirement, so the menu and the guard share one source.
//!
//! LAYOUT
//! ======
//! - storefront pages: always render;
//! - the login route: signed-in visitors bounce to their dashboard;
//! - `/admin/*` and `/user/*`: section guard first, then the matching entry;
//! - anything else: replace with `/`.

pub mod history;


pub use history::{History, Navigator};

use crate::auth::guard::{GuardView, RouteGuard};
use crate::auth::nav::{ADMIN_DASHBOARD_PATH, ADMIN_MENU, NavEntry, USER_DASHBOARD_PATH, USER_MENU, dashboard_path};
use crate::auth::policy::Requirement;
use crate::auth::store::Session;

pub const ROOT_PATH: &str = "/";
pub const DEFAULT_LOGIN_PATH: &str = "/896552147/login";

const STOREFRONT: [(&str, &str); 10] = [
    ("/", "Home"),
    ("/deals", "Deals"),
    ("/categories", "Categories"),
    ("/blogs", "Blogs"),
    ("/brands", "Brands"),
    ("/seasons", "Seasons"),
    ("/about-us", "About Us"),
    ("/privacy-policy", "Privacy Policy"),
    ("/cookie-policy", "Cookie Policy"),
    ("/legal-disclosure", "Legal Disclosure"),
];

/// A back-office area guarded as a whole before any entry is matched.
struct Section {
    prefix: &'static str,
    requirement: Requirement,
    home: &'static str,
    entries: &'static [NavEntry],
}

const SECTIONS: [Section; 2] = [
    Section { prefix: "/admin", requirement: Requirement::Admin, home: ADMIN_DASHBOARD_PATH, entries: &ADMIN_MENU },
    Section {
        prefix: "/user",
        requirement: Requirement::Authenticated,
        home: USER_DASHBOARD_PATH,
        entries: &USER_MENU,
    },
];

/// Static classification of a path, independent of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteMatch {
    Storefront(&'static str),
    BrandDetail,
    Login,
    /// A sidebar entry with the requirement its guard enforces.
    BackOffice { entry: NavEntry, requirement: Requirement },
    /// Section root or unknown section path: guard, then go to `home`.
    SectionHome { requirement: Requirement, home: &'static str },
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Storefront(&'static str),
    BrandDetail,
    Login,
    BackOffice(NavEntry),
}

/// What the application shows after resolving a location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Page(Page),
    Loading,
    /// Navigation was replaced with this path.
    Redirected(String),
    AccessDenied { title: &'static str, message: &'static str },
}

/// Drop query/fragment and any trailing slash (except on the root).
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { ROOT_PATH } else { trimmed }
}

#[derive(Clone, Debug)]
pub struct Router {
    login_path: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PATH)
    }
}

impl Router {
    #[must_use]
    pub fn new(login_path: impl Into<String>) -> Self {
        Self { login_path: login_path.into() }
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Classify `path` without consulting the session.
    #[must_use]
    pub fn match_path(&self, path: &str) -> RouteMatch {
        let path = normalize(path);

        if path == normalize(&self.login_path) {
            return RouteMatch::Login;
        }
        if let Some((_, title)) = STOREFRONT.iter().find(|(p, _)| *p == path) {
            return RouteMatch::Storefront(*title);
        }
        if let Some(id) = path.strip_prefix("/brands/") {
            if !id.is_empty() && !id.contains('/') {
                return RouteMatch::BrandDetail;
            }
        }

        for section in &SECTIONS {
            let in_section = path == section.prefix
                || path.strip_prefix(section.prefix).is_some_and(|rest| rest.starts_with('/'));
            if !in_section {
                continue;
            }
            let entry = section.entries.iter().find(|e| e.path == path);
            return match entry.and_then(|e| e.requirement.map(|r| (*e, r))) {
                Some((entry, requirement)) => RouteMatch::BackOffice { entry, requirement },
                None => RouteMatch::SectionHome { requirement: section.requirement, home: section.home },
            };
        }

        RouteMatch::Unknown
    }

    /// Resolve `path` for `session`, performing any redirect through
    /// `navigator`.
    pub fn resolve(&self, path: &str, session: &Session, navigator: &dyn Navigator) -> Outcome {
        match self.match_path(path) {
            RouteMatch::Storefront(title) => Outcome::Page(Page::Storefront(title)),
            RouteMatch::BrandDetail => Outcome::Page(Page::BrandDetail),
            RouteMatch::Login => self.resolve_login(session, navigator),
            RouteMatch::BackOffice { entry, requirement } => {
                let view = RouteGuard::new(requirement, self.login_path.clone()).render(session, navigator);
                guarded(view, || Outcome::Page(Page::BackOffice(entry)))
            }
            RouteMatch::SectionHome { requirement, home } => {
                let view = RouteGuard::new(requirement, self.login_path.clone()).render(session, navigator);
                guarded(view, || redirect(navigator, home))
            }
            RouteMatch::Unknown => {
                tracing::debug!(path, "no route; redirecting to root");
                redirect(navigator, ROOT_PATH)
            }
        }
    }

    /// Push `path` onto the history and resolve it.
    pub fn visit(&self, path: &str, session: &Session, navigator: &dyn Navigator) -> Outcome {
        navigator.push(path);
        self.resolve(path, session, navigator)
    }

    fn resolve_login(&self, session: &Session, navigator: &dyn Navigator) -> Outcome {
        if session.loading {
            return Outcome::Loading;
        }
        match session.user() {
            Some(user) => redirect(navigator, dashboard_path(user.role)),
            None => Outcome::Page(Page::Login),
        }
    }
}

fn redirect(navigator: &dyn Navigator, to: &str) -> Outcome {
    navigator.replace(to);
    Outcome::Redirected(to.to_owned())
}

fn guarded<F>(view: GuardView, granted: F) -> Outcome
where
    F: FnOnce() -> Outcome,
{
    match view {
        GuardView::Content => granted(),
        GuardView::Loading => Outcome::Loading,
        GuardView::Redirected(to) => Outcome::Redirected(to),
        GuardView::AccessDenied { title, message } => Outcome::AccessDenied { title, message },
    }
}
