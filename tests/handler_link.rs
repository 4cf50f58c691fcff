mod common;

use axum::{
    Router,
    routing::{get, post},
};
use axum_test::TestServer;
use linkdrop::api::handlers::{create_link_handler, find_handler};
use serde_json::json;

fn link_router(state: linkdrop::state::AppState) -> Router {
    Router::new()
        .route("/api/v2/link", post(create_link_handler))
        .route("/api/v2/find/{alias}", get(find_handler))
        .with_state(state)
}

#[tokio::test]
async fn test_create_link_success() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();

    let response = server
        .post("/api/v2/link")
        .json(&json!({
            "alias": "abcde12345",
            "type": "LINK",
            "redirect_to": "https://example.com/page"
        }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], 200);
    assert_eq!(body["message"], "OK");
    assert_eq!(body["alias"], "abcde12345");
    assert_eq!(body["type"], "LINK");
    assert_eq!(body["redirect_to"], "https://example.com/page");
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_create_link_then_find() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();

    server
        .post("/api/v2/link")
        .json(&json!({
            "alias": "lookup1",
            "type": "LINK",
            "redirect_to": "http://example.org"
        }))
        .await
        .assert_status_ok();

    let response = server.get("/api/v2/find/lookup1").await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["redirect_to"], "http://example.org");
    assert_eq!(body["type"], "LINK");
}

#[tokio::test]
async fn test_create_link_duplicate_alias() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();
    let payload = json!({
        "alias": "taken01",
        "type": "LINK",
        "redirect_to": "https://example.com"
    });

    server.post("/api/v2/link").json(&payload).await.assert_status_ok();

    let response = server.post("/api/v2/link").json(&payload).await;
    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], 400);
    assert_eq!(body["message"], "alias already taken");
}

#[tokio::test]
async fn test_create_link_alias_too_short() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();

    let response = server
        .post("/api/v2/link")
        .json(&json!({
            "alias": "abc",
            "type": "LINK",
            "redirect_to": "https://example.com"
        }))
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], 400);
    assert!(body["message"].as_str().unwrap().contains("alias"));
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn test_create_link_alias_not_alphanumeric() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();

    let response = server
        .post("/api/v2/link")
        .json(&json!({
            "alias": "bad-alias!",
            "type": "LINK",
            "redirect_to": "https://example.com"
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_create_link_invalid_redirect() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();

    for target in ["not a url", "ftp://example.com/file", "javascript:alert(1)"] {
        let response = server
            .post("/api/v2/link")
            .json(&json!({
                "alias": "target01",
                "type": "LINK",
                "redirect_to": target
            }))
            .await;

        response.assert_status_bad_request();
    }
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn test_create_link_wrong_kind() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();

    let response = server
        .post("/api/v2/link")
        .json(&json!({
            "alias": "kind0001",
            "type": "FILE",
            "redirect_to": "https://example.com"
        }))
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["message"], "type must be LINK");
}

#[tokio::test]
async fn test_create_link_unknown_field() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();

    let response = server
        .post("/api/v2/link")
        .json(&json!({
            "alias": "extra0001",
            "type": "LINK",
            "redirect_to": "https://example.com",
            "expires_at": "2030-01-01"
        }))
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_create_link_malformed_json() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();

    let response = server
        .post("/api/v2/link")
        .text("{\"alias\": ")
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_create_link_store_down() {
    let app = common::create_test_app().await;
    app.store.set_down(true);
    let server = TestServer::new(link_router(app.state.clone())).unwrap();

    let response = server
        .post("/api/v2/link")
        .json(&json!({
            "alias": "down00001",
            "type": "LINK",
            "redirect_to": "https://example.com"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], 500);
    assert_eq!(body["message"], linkdrop::error::CANT_PROCESS_REQUEST);
}

#[tokio::test]
async fn test_create_link_too_large_to_cache() {
    let app = common::create_test_app().await;
    let server = TestServer::new(link_router(app.state.clone())).unwrap();
    let long_url = format!("https://example.com/{}", "p".repeat(2000));

    server
        .post("/api/v2/link")
        .json(&json!({
            "alias": "longlink01",
            "type": "LINK",
            "redirect_to": long_url
        }))
        .await
        .assert_status_ok();

    assert!(common::wait_for_cache(&app.cache, "longlink01").await.is_none());

    let response = server.get("/api/v2/find/longlink01").await;
    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["redirect_to"], long_url);
}
