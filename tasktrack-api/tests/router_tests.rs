//! Router tests that never reach the database
//!
//! Every request here is rejected before a query runs, so the router is built
//! on a lazily-connected pool and no PostgreSQL server is needed.

mod common;

use axum::body::Body;
use axum::http::{header::CACHE_CONTROL, Request, StatusCode};
use common::{offline_app, send, send_request};
use serde_json::json;

#[tokio::test]
async fn test_tasks_require_access_token() {
    let app = offline_app();

    let response = send(&app, "GET", "/v1/tasks", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["statusCode"], 401);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.messages(), vec!["Access token cannot be blank"]);
    assert_eq!(response.headers.get(CACHE_CONTROL).unwrap(), "no-cache, no-store");
}

#[tokio::test]
async fn test_create_without_token_is_rejected_before_body_checks() {
    let app = offline_app();

    let response = send(
        &app,
        "POST",
        "/v1/tasks",
        None,
        Some(json!({ "title": "Buy milk", "completed": "N" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.messages(), vec!["Access token cannot be blank"]);
}

#[tokio::test]
async fn test_blank_bearer_token_is_rejected() {
    let app = offline_app();

    let response = send(&app, "GET", "/v1/tasks?taskid=1", Some("Bearer "), None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.messages(), vec!["Access token cannot be blank"]);
}

#[tokio::test]
async fn test_users_only_accepts_post() {
    let app = offline_app();

    for method in ["GET", "PUT", "PATCH", "DELETE"] {
        let response = send(&app, method, "/v1/users", None, None).await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(response.messages(), vec!["Request method not allowed"]);
    }
}

#[tokio::test]
async fn test_users_requires_json_content_type() {
    let app = offline_app();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/users")
        .header("content-type", "text/plain")
        .body(Body::from("fullname=Jane"))
        .unwrap();
    let response = send_request(&app, request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.messages(), vec!["Content type header not set to JSON"]);
}

#[tokio::test]
async fn test_users_rejects_invalid_json() {
    let app = offline_app();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send_request(&app, request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.messages(), vec!["Request body is not valid JSON"]);
}

#[tokio::test]
async fn test_users_lists_every_missing_field() {
    let app = offline_app();

    let response = send(&app, "POST", "/v1/users", None, Some(json!({}))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.messages(),
        vec![
            "Full name is required",
            "Username is required",
            "Password is required"
        ]
    );
    assert!(response.body.get("data").is_none());
}

#[tokio::test]
async fn test_users_lists_every_length_violation() {
    let app = offline_app();

    let response = send(
        &app,
        "POST",
        "/v1/users",
        None,
        Some(json!({
            "fullname": "",
            "username": "u".repeat(256),
            "password": "secret"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.messages(),
        vec![
            "Full name cannot be blank",
            "Username cannot be greater than 255 characters"
        ]
    );
}

#[tokio::test]
async fn test_users_rejects_whitespace_only_names() {
    let app = offline_app();

    let response = send(
        &app,
        "POST",
        "/v1/users",
        None,
        Some(json!({
            "fullname": "   ",
            "username": "\t ",
            "password": "secret"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.messages(),
        vec!["Full name cannot be blank", "Username cannot be blank"]
    );
}

#[tokio::test]
async fn test_sessions_collection_only_accepts_post() {
    let app = offline_app();

    let response = send(&app, "GET", "/v1/sessions", None, None).await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_login_lists_missing_fields() {
    let app = offline_app();

    let response = send(
        &app,
        "POST",
        "/v1/sessions",
        None,
        Some(json!({ "username": "jane" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.messages(), vec!["Password is required"]);
}

#[tokio::test]
async fn test_logout_checks_method_id_and_token() {
    let app = offline_app();

    let response = send(&app, "GET", "/v1/sessions/1", Some("token"), None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);

    let response = send(&app, "DELETE", "/v1/sessions/abc", Some("token"), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.messages(),
        vec!["Session ID cannot be blank and must be numeric"]
    );

    let response = send(&app, "DELETE", "/v1/sessions/1", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.messages(), vec!["Access token cannot be blank"]);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = offline_app();

    let response = send(&app, "GET", "/v1/projects", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.messages(), vec!["Endpoint not found"]);
}
