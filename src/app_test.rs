use std::path::PathBuf;

use super::*;
use crate::auth::fixtures::{StaticAuth, admin, data_entry};
use crate::auth::{Privilege, Privileges};
use crate::config::HttpTimeouts;
use crate::router::{DEFAULT_LOGIN_PATH, Page};
use crate::storage::MemoryStore;

fn config(store_path: PathBuf) -> Config {
    Config {
        // Nothing listens here; these tests never reach the network.
        api_url: "http://127.0.0.1:9/api".into(),
        store_path,
        login_path: DEFAULT_LOGIN_PATH.into(),
        timeouts: HttpTimeouts::default(),
    }
}

fn memory_app() -> App {
    App::with_storage(&config(PathBuf::from("unused.json")), Arc::new(MemoryStore::new())).unwrap()
}

fn creds() -> Credentials {
    Credentials::new("someone@hop4deals.test", "pw")
}

#[test]
fn guarded_routes_wait_until_started() {
    let app = memory_app();
    assert_eq!(app.visit("/admin/deals"), Outcome::Loading);

    app.start();
    assert_eq!(app.reload(), Outcome::Redirected(DEFAULT_LOGIN_PATH.into()));
    assert_eq!(app.history().current_path(), DEFAULT_LOGIN_PATH);
}

#[tokio::test]
async fn login_then_visit_back_office() {
    let app = memory_app();
    app.start();
    let user = data_entry(Privileges::default().with(Privilege::Deals));
    app.session().login(&StaticAuth::new("tok-9", user), &creds()).await.unwrap();

    assert!(matches!(app.visit("/user/deals"), Outcome::Page(Page::BackOffice(entry)) if entry.path == "/user/deals"));
    assert!(matches!(app.visit("/user/blogs"), Outcome::AccessDenied { .. }));
    assert_eq!(app.visit(DEFAULT_LOGIN_PATH), Outcome::Redirected("/user/dashboard".into()));

    let labels: Vec<_> = app.sidebar().iter().map(|e| e.label).collect();
    assert_eq!(labels, ["Overview", "Deals"]);
    assert_eq!(app.navbar().last().map(|e| e.label), Some("Dashboard"));
}

#[tokio::test]
async fn logout_drops_back_office_access() {
    let app = memory_app();
    app.start();
    app.session().login(&StaticAuth::new("tok-9", admin()), &creds()).await.unwrap();
    assert!(matches!(app.visit("/admin/users"), Outcome::Page(_)));

    app.logout();

    assert_eq!(app.reload(), Outcome::Redirected(DEFAULT_LOGIN_PATH.into()));
    assert!(app.sidebar().is_empty());
}

#[tokio::test]
async fn session_survives_restart_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().join("nested").join("session.json"));

    let first = App::new(&cfg).unwrap();
    first.start();
    first.session().login(&StaticAuth::new("tok-9", admin()), &creds()).await.unwrap();
    drop(first);

    let second = App::new(&cfg).unwrap();
    let session = second.start();
    assert!(session.is_admin());
    assert_eq!(session.token(), Some("tok-9"));
    assert_eq!(second.visit("/admin"), Outcome::Redirected("/admin/dashboard".into()));
}

#[tokio::test]
async fn refresh_failure_keeps_session_when_server_unreachable() {
    let app = memory_app();
    app.start();
    app.session().login(&StaticAuth::new("tok-9", admin()), &creds()).await.unwrap();

    let err = app.refresh().await.unwrap_err();

    assert!(matches!(err, AuthError::Transport(_)));
    assert!(app.session().is_authenticated());
}

#[tokio::test]
async fn corrupt_session_file_does_not_block_login_or_logout() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().join("session.json"));
    std::fs::write(&cfg.store_path, "{not json").unwrap();

    let app = App::new(&cfg).unwrap();
    assert!(!app.start().is_authenticated());

    app.session().login(&StaticAuth::new("tok-9", admin()), &creds()).await.unwrap();
    assert!(App::new(&cfg).unwrap().start().is_admin());

    app.logout();
    assert!(!App::new(&cfg).unwrap().start().is_authenticated());
}
