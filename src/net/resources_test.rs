use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{Method as HttpMethod, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::*;
use crate::auth::{Privilege, Requirement, SessionStore};
use crate::config::{Config, HttpTimeouts};
use crate::router::DEFAULT_LOGIN_PATH;
use crate::storage::MemoryStore;

/// Echo the request line and body back so tests can see what was sent.
async fn echo(method: HttpMethod, uri: Uri, body: Bytes) -> Response {
    if uri.path().ends_with("/forbidden") {
        return (StatusCode::FORBIDDEN, axum::Json(json!({ "message": "Admin only" }))).into_response();
    }
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    axum::Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "body": body,
    }))
    .into_response()
}

async fn spawn_echo() -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, axum::Router::new().fallback(echo)).await.unwrap();
    });
    let config = Config {
        api_url: format!("http://{addr}/api"),
        store_path: PathBuf::from("unused.json"),
        login_path: DEFAULT_LOGIN_PATH.to_owned(),
        timeouts: HttpTimeouts::default(),
    };
    ApiClient::new(&config, SessionStore::new(Arc::new(MemoryStore::new()))).unwrap()
}

#[test]
fn resource_names_parse_case_insensitively() {
    assert_eq!("deals".parse::<Resource>().unwrap(), Resource::Deals);
    assert_eq!(" Seasons ".parse::<Resource>().unwrap(), Resource::Seasons);
    assert_eq!("coupons".parse::<Resource>().unwrap_err(), UnknownResource("coupons".into()));
    for r in Resource::ALL {
        assert_eq!(r.to_string().parse::<Resource>().unwrap(), r);
    }
}

#[test]
fn requirements_follow_back_office_menus() {
    assert_eq!(Resource::Users.requirement(), Requirement::Admin);
    assert_eq!(Resource::Seasons.requirement(), Requirement::Admin);
    assert_eq!(Resource::Blogs.requirement(), Requirement::Privilege(Privilege::Blogs));
    assert_eq!(Resource::Categories.requirement(), Requirement::Privilege(Privilege::Categories));
}

#[test]
fn storefront_collections_are_publicly_readable() {
    for r in [Resource::Categories, Resource::Brands, Resource::Deals, Resource::Blogs, Resource::Seasons] {
        assert_eq!(r.requirement_for(Access::Read), None, "{r}");
        assert_eq!(r.requirement_for(Access::Write), Some(r.requirement()), "{r}");
    }
    assert_eq!(Resource::Users.requirement_for(Access::Read), Some(Requirement::Admin));
    assert_eq!(Resource::Users.requirement_for(Access::Write), Some(Requirement::Admin));
}

#[tokio::test]
async fn crud_verbs_map_to_rest_routes() {
    let api = spawn_echo().await;
    let brands = api.resource(Resource::Brands);

    let listed = brands.list(&[("page".into(), "2".into())]).await.unwrap();
    assert_eq!(listed["method"], "GET");
    assert_eq!(listed["path"], "/api/brands");
    assert_eq!(listed["query"], "page=2");

    let fetched = brands.get("b-7").await.unwrap();
    assert_eq!(fetched["path"], "/api/brands/b-7");

    let created = brands.create(&json!({ "name": "Acme" })).await.unwrap();
    assert_eq!(created["method"], "POST");
    assert_eq!(created["body"]["name"], "Acme");

    let updated = brands.update("b-7", &json!({ "name": "Acme 2" })).await.unwrap();
    assert_eq!(updated["method"], "PUT");
    assert_eq!(updated["path"], "/api/brands/b-7");

    let deleted = brands.delete("b-7").await.unwrap();
    assert_eq!(deleted["method"], "DELETE");
}

#[tokio::test]
async fn server_denial_is_a_status_error() {
    let api = spawn_echo().await;
    let err = api.resource(Resource::Users).get("forbidden").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 403, ref message } if message == "Admin only"));
}
