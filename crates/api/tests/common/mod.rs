//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the full application router (same middleware stack as production)
//! and provides request/response helpers on top of `tower::ServiceExt`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use encore_api::auth::jwt::JwtConfig;
use encore_api::config::ServerConfig;
use encore_api::router::build_app_router;
use encore_api::state::AppState;

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 30,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Mirrors the router construction in `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request must build");
    app.clone().oneshot(request).await.expect("request must not fail")
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request must build");
    app.clone().oneshot(request).await.expect("request must not fail")
}

/// Send a JSON POST request without authentication.
pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request must build");
    app.clone().oneshot(request).await.expect("request must not fail")
}

/// Send a JSON POST request with a Bearer token.
pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request must build");
    app.clone().oneshot(request).await.expect("request must not fail")
}

/// Send a DELETE request with a Bearer token.
pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request must build");
    app.clone().oneshot(request).await.expect("request must not fail")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body must be valid JSON")
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body must collect")
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Register an account through the API and return the created user JSON.
pub async fn register_user(
    app: &Router,
    username: &str,
    role: &str,
    scan_duty: &str,
) -> serde_json::Value {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@test.com"),
        "password": TEST_PASSWORD,
        "role": role,
        "scan_duty": scan_duty,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration must succeed");
    body_json(response).await
}

/// Log in and return the full auth response JSON (tokens + user info).
pub async fn login(app: &Router, username: &str) -> serde_json::Value {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login must succeed");
    body_json(response).await
}

/// Register + login in one step. Returns `(access_token, user_id)`.
pub async fn auth_token(
    app: &Router,
    username: &str,
    role: &str,
    scan_duty: &str,
) -> (String, i64) {
    let user = register_user(app, username, role, scan_duty).await;
    let user_id = user["id"].as_i64().expect("user id must be a number");
    let auth = login(app, username).await;
    let token = auth["access_token"]
        .as_str()
        .expect("access_token must be a string")
        .to_string();
    (token, user_id)
}

/// Create a concert through the API (requires an admin token) and return its id.
pub async fn create_concert(app: &Router, admin_token: &str, name: &str) -> i64 {
    let body = serde_json::json!({
        "name": name,
        "date": "2026-11-20T20:00:00Z",
        "venue": "Test Arena",
        "description": null,
    });
    let response = post_json_auth(app, "/api/v1/concerts", body, admin_token).await;
    assert_eq!(response.status(), StatusCode::CREATED, "concert creation must succeed");
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("concert id must be a number")
}
