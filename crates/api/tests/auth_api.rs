//! HTTP-level integration tests for registration, login, token refresh,
//! logout, and RBAC enforcement.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, TEST_PASSWORD};
use sqlx::PgPool;

use encore_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn register_defaults_to_viewer_and_sales(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "plainuser",
        "email": "plainuser@test.com",
        "password": TEST_PASSWORD,
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["username"], "plainuser");
    assert_eq!(json["role"], "viewer");
    assert_eq!(json["scan_duty"], "sales");
    assert_eq!(json["is_active"], true);
    assert!(json.get("password_hash").is_none(), "hash must never leak");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_duplicate_username_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::register_user(&app, "taken", "viewer", "sales").await;

    let body = serde_json::json!({
        "username": "taken",
        "email": "fresh@test.com",
        "password": TEST_PASSWORD,
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_duplicate_email_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::register_user(&app, "original", "viewer", "sales").await;

    let body = serde_json::json!({
        "username": "different",
        "email": "original@test.com",
        "password": TEST_PASSWORD,
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_malformed_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "bademail",
        "email": "not-an-email",
        "password": TEST_PASSWORD,
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "shortpw",
        "email": "shortpw@test.com",
        "password": "short",
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_unknown_role(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "roleless",
        "email": "roleless@test.com",
        "password": TEST_PASSWORD,
        "role": "superuser",
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_token_pair(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = common::register_user(&app, "loginuser", "scanner", "sales").await;

    let json = common::login(&app, "loginuser").await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["id"], user["id"]);
    assert_eq!(json["user"]["role"], "scanner");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_password_and_unknown_user_are_indistinguishable(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::register_user(&app, "knownuser", "viewer", "sales").await;

    let wrong_pw = post_json(
        &app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "knownuser", "password": "incorrect_password" }),
    )
    .await;
    assert_eq!(wrong_pw.status(), StatusCode::UNAUTHORIZED);
    let wrong_pw_body = body_json(wrong_pw).await;

    let unknown = post_json(
        &app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "ghost", "password": "incorrect_password" }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = body_json(unknown).await;

    assert_eq!(wrong_pw_body, unknown_body, "the two failures must look identical");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivated_account_cannot_login(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let user = common::register_user(&app, "inactive", "viewer", "sales").await;
    UserRepo::deactivate(&pool, user["id"].as_i64().unwrap())
        .await
        .expect("deactivation should succeed");

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "inactive", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Refresh + logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_the_refresh_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::register_user(&app, "refresher", "viewer", "sales").await;
    let auth = common::login(&app, "refresher").await;
    let old_token = auth["refresh_token"].as_str().unwrap();

    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": old_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"].as_str().unwrap(), old_token);

    // The rotated-out token is dead.
    let replay = post_json(
        &app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": old_token }),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_with_garbage_token_fails(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": "not-a-real-token" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_all_sessions(pool: PgPool) {
    let app = common::build_test_app(pool);
    common::register_user(&app, "leaver", "viewer", "sales").await;
    let auth = common::login(&app, "leaver").await;
    let access_token = auth["access_token"].as_str().unwrap();
    let refresh_token = auth["refresh_token"].as_str().unwrap();

    let response =
        common::post_json_auth(&app, "/api/v1/auth/logout", serde_json::json!({}), access_token)
            .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let replay = post_json(
        &app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Token enforcement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_and_malformed_tokens_are_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);

    let missing = common::get(&app, "/api/v1/transfers/pending").await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let malformed = common::get_auth(&app, "/api/v1/transfers/pending", "garbage").await;
    assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);
}
