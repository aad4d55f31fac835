use std::sync::Arc;

use super::*;
use crate::auth::fixtures::{StaticAuth, admin, data_entry, hydrating, signed_in, signed_out};
use crate::auth::store::SessionStore;
use crate::auth::types::{Credentials, Privilege, Privileges, Role};
use crate::router::History;
use crate::storage::MemoryStore;

const LOGIN: &str = "/896552147/login";

fn guard(requirement: Requirement) -> RouteGuard {
    RouteGuard::new(requirement, LOGIN)
}

// =============================================================
// state projection
// =============================================================

#[test]
fn state_pending_while_hydrating() {
    assert_eq!(guard(Requirement::Admin).state(&hydrating()), GuardState::Pending);
}

#[test]
fn state_maps_each_verdict() {
    let g = guard(Requirement::Admin);
    assert_eq!(g.state(&signed_out()), GuardState::Unauthenticated);
    assert_eq!(g.state(&signed_in(admin())), GuardState::Granted);
    assert_eq!(
        g.state(&signed_in(data_entry(Privileges::all()))),
        GuardState::Forbidden(DenyReason::InsufficientRole { required: Role::Admin })
    );
}

// =============================================================
// render
// =============================================================

#[test]
fn render_pending_shows_loading_without_navigating() {
    let history = History::new("/admin/users");
    let view = guard(Requirement::Admin).render(&hydrating(), &history);
    assert_eq!(view, GuardView::Loading);
    assert_eq!(history.entries(), vec!["/admin/users".to_owned()]);
}

#[test]
fn render_signed_out_admin_route_redirects_to_login_not_denied() {
    let history = History::default();
    history.push("/admin/users");
    let view = guard(Requirement::Admin).render(&signed_out(), &history);
    assert_eq!(view, GuardView::Redirected(LOGIN.to_owned()));
    assert_eq!(history.current_path(), LOGIN);
    assert_eq!(history.back().as_deref(), Some("/"));
}

#[test]
fn render_role_denial_redirects_to_root() {
    let history = History::new("/admin/dashboard");
    let view = guard(Requirement::Admin).render(&signed_in(data_entry(Privileges::all())), &history);
    assert_eq!(view, GuardView::Redirected("/".to_owned()));
    assert_eq!(history.current_path(), "/");
}

#[test]
fn render_privilege_denial_shows_inline_message() {
    let history = History::new("/user/brands");
    let session = signed_in(data_entry(Privileges::default().with(Privilege::Deals)));
    let view = guard(Requirement::Privilege(Privilege::Brands)).render(&session, &history);
    assert_eq!(view, GuardView::AccessDenied { title: ACCESS_DENIED_TITLE, message: ACCESS_DENIED_MESSAGE });
    assert_eq!(history.current_path(), "/user/brands");
}

#[test]
fn render_granted_shows_content() {
    let history = History::new("/user/deals");
    let session = signed_in(data_entry(Privileges::default().with(Privilege::Deals)));
    let view = guard(Requirement::Privilege(Privilege::Deals)).render(&session, &history);
    assert_eq!(view, GuardView::Content);
}

#[test]
fn render_admin_gets_privilege_routes() {
    let history = History::new("/user/blogs");
    let view = guard(Requirement::Privilege(Privilege::Blogs)).render(&signed_in(admin()), &history);
    assert_eq!(view, GuardView::Content);
}

// =============================================================
// GuardWatch
// =============================================================

#[tokio::test]
async fn watch_settles_from_pending_after_initialize() {
    let store = SessionStore::new(Arc::new(MemoryStore::new()));
    let mut watch = GuardWatch::new(guard(Requirement::Authenticated), store.subscribe());
    assert_eq!(watch.state(), GuardState::Pending);

    store.initialize();

    assert_eq!(watch.changed().await, Some(GuardState::Unauthenticated));
}

#[tokio::test]
async fn watch_reevaluates_to_unauthenticated_after_expiry() {
    let store = SessionStore::new(Arc::new(MemoryStore::new()));
    store.initialize();
    store
        .login(&StaticAuth::new("tok", admin()), &Credentials::new("admin@hop4deals.test", "pw"))
        .await
        .unwrap();
    let mut watch = GuardWatch::new(guard(Requirement::Admin), store.subscribe());
    assert_eq!(watch.state(), GuardState::Granted);

    store.expire();

    assert_eq!(watch.changed().await, Some(GuardState::Unauthenticated));
    let history = History::new("/admin/deals");
    assert_eq!(watch.render(&history), GuardView::Redirected(LOGIN.to_owned()));
    assert_eq!(history.current_path(), LOGIN);
}

#[tokio::test]
async fn watch_returns_none_when_store_dropped() {
    let store = SessionStore::new(Arc::new(MemoryStore::new()));
    let mut watch = GuardWatch::new(guard(Requirement::Admin), store.subscribe());
    drop(store);
    assert_eq!(watch.changed().await, None);
}
