mod common;

use axum::{Router, http::StatusCode, routing::get};
use axum_test::TestServer;
use linkdrop::api::handlers::find_handler;
use linkdrop::infrastructure::cache::CacheService;
use linkdrop::prelude::{AliasKind, NewLink};

fn find_router(state: linkdrop::state::AppState) -> Router {
    Router::new()
        .route("/api/v2/find/{alias}", get(find_handler))
        .with_state(state)
}

async fn seed_link(app: &common::TestApp, alias: &str, target: &str) {
    app.state
        .resolution_service
        .insert_link(NewLink {
            alias: alias.to_string(),
            kind: AliasKind::Link,
            redirect_to: target.to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_find_existing_link() {
    let app = common::create_test_app().await;
    seed_link(&app, "found0001", "https://example.com/a").await;
    let server = TestServer::new(find_router(app.state.clone())).unwrap();

    let response = server.get("/api/v2/find/found0001").await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], 200);
    assert_eq!(body["message"], "OK");
    assert_eq!(body["alias"], "found0001");
    assert_eq!(body["type"], "LINK");
    assert_eq!(body["redirect_to"], "https://example.com/a");
    assert!(body.get("filename").is_none());
}

#[tokio::test]
async fn test_find_not_found() {
    let app = common::create_test_app().await;
    let server = TestServer::new(find_router(app.state.clone())).unwrap();

    let response = server.get("/api/v2/find/nosuchalias").await;

    response.assert_status_not_found();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], 404);
    assert_eq!(body["message"], "not found");
}

#[tokio::test]
async fn test_find_served_from_cache_when_store_down() {
    let app = common::create_test_app().await;
    seed_link(&app, "cached001", "https://example.com/c").await;
    assert!(common::wait_for_cache(&app.cache, "cached001").await.is_some());

    app.store.set_down(true);
    let server = TestServer::new(find_router(app.state.clone())).unwrap();

    let response = server.get("/api/v2/find/cached001").await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["redirect_to"], "https://example.com/c");
}

#[tokio::test]
async fn test_find_store_down_without_cache_entry() {
    let app = common::create_test_app().await;
    app.store.set_down(true);
    let server = TestServer::new(find_router(app.state.clone())).unwrap();

    let response = server.get("/api/v2/find/uncached1").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], 500);
}

#[tokio::test]
async fn test_find_ignores_corrupt_cache_entry() {
    let app = common::create_test_app().await;
    seed_link(&app, "corrupt01", "https://example.com/d").await;
    assert!(common::wait_for_cache(&app.cache, "corrupt01").await.is_some());
    app.cache
        .set("corrupt01", b"{not json".to_vec())
        .await
        .unwrap();
    let server = TestServer::new(find_router(app.state.clone())).unwrap();

    let response = server.get("/api/v2/find/corrupt01").await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["redirect_to"], "https://example.com/d");
}
