//! HTTP-level integration tests for the two-stage scan workflow and the
//! attendance statistics endpoint.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, post_json_auth};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn batch_tickets(app: &Router, admin: &str, concert_id: i64, quantity: i64) -> Vec<i64> {
    let response = post_json_auth(
        app,
        &format!("/api/v1/tickets/batch/create/{concert_id}"),
        serde_json::json!({ "quantity": quantity }),
        admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    let list = common::get(app, &format!("/api/v1/tickets/concert/{concert_id}")).await;
    let tickets = body_json(list).await;
    assert_eq!(
        tickets["data"].as_array().unwrap().len() as i64,
        json["data"]["created_count"].as_i64().unwrap()
    );
    tickets["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect()
}

async fn scan(app: &Router, token: &str, ticket_id: i64, scan_type: &str) -> StatusCode {
    let response = post_json_auth(
        app,
        "/api/v1/scans",
        serde_json::json!({ "ticket_id": ticket_id, "scan_type": scan_type }),
        token,
    )
    .await;
    response.status()
}

async fn ticket_status(app: &Router, ticket_id: i64) -> String {
    let response = common::get(app, &format!("/api/v1/tickets/{ticket_id}")).await;
    let json = body_json(response).await;
    json["data"]["status"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// The two-stage workflow
// ---------------------------------------------------------------------------

/// The end-to-end scenario: sale confirmation, verification, and the
/// re-verification conflict.
#[sqlx::test(migrations = "../db/migrations")]
async fn two_stage_scan_workflow(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = common::auth_token(&app, "admin1", "admin", "sales").await;
    let (seller, _) = common::auth_token(&app, "seller1", "scanner", "sales").await;
    let (verifier, _) = common::auth_token(&app, "verifier1", "scanner", "verification").await;

    let concert_id = common::create_concert(&app, &admin, "Two Stage").await;
    let tickets = batch_tickets(&app, &admin, concert_id, 3).await;
    let ticket = tickets[0];

    // Stage 1: sales-duty sale confirmation.
    assert_eq!(scan(&app, &seller, ticket, "sale_confirmation").await, StatusCode::CREATED);
    assert_eq!(ticket_status(&app, ticket).await, "sold_confirmed");

    // Stage 2: verification.
    assert_eq!(scan(&app, &verifier, ticket, "attendance").await, StatusCode::CREATED);
    assert_eq!(ticket_status(&app, ticket).await, "verified");

    // Re-verification conflicts and the status holds.
    assert_eq!(scan(&app, &verifier, ticket, "attendance").await, StatusCode::CONFLICT);
    assert_eq!(ticket_status(&app, ticket).await, "verified");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sales_rescans_are_unrestricted(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = common::auth_token(&app, "admin1", "admin", "sales").await;
    let (seller, _) = common::auth_token(&app, "seller1", "scanner", "sales").await;

    let concert_id = common::create_concert(&app, &admin, "Rescans").await;
    let tickets = batch_tickets(&app, &admin, concert_id, 1).await;

    for _ in 0..3 {
        assert_eq!(
            scan(&app, &seller, tickets[0], "sale_confirmation").await,
            StatusCode::CREATED
        );
    }
    assert_eq!(ticket_status(&app, tickets[0]).await, "sold_confirmed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sales_entry_check_records_without_status_change(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = common::auth_token(&app, "admin1", "admin", "sales").await;
    let (seller, _) = common::auth_token(&app, "seller1", "scanner", "sales").await;

    let concert_id = common::create_concert(&app, &admin, "Entry Only").await;
    let tickets = batch_tickets(&app, &admin, concert_id, 1).await;
    let ticket = tickets[0];

    assert_eq!(scan(&app, &seller, ticket, "sale_confirmation").await, StatusCode::CREATED);
    assert_eq!(scan(&app, &seller, ticket, "entry_check").await, StatusCode::CREATED);

    // Status unchanged by the entry scan, but the audit row exists and the
    // aggregator counts the ticket as attended.
    assert_eq!(ticket_status(&app, ticket).await, "sold_confirmed");

    let history = common::get(&app, &format!("/api/v1/scans/ticket/{ticket}")).await;
    let json = body_json(history).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let stats = common::get_auth(
        &app,
        &format!("/api/v1/scans/concert/{concert_id}/attendance"),
        &seller,
    )
    .await;
    let json = body_json(stats).await;
    assert_eq!(json["data"]["total_attended"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn viewer_cannot_record_scans(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = common::auth_token(&app, "admin1", "admin", "sales").await;
    let (viewer, _) = common::auth_token(&app, "viewer1", "viewer", "sales").await;

    let concert_id = common::create_concert(&app, &admin, "No Viewers").await;
    let tickets = batch_tickets(&app, &admin, concert_id, 1).await;

    assert_eq!(
        scan(&app, &viewer, tickets[0], "sale_confirmation").await,
        StatusCode::FORBIDDEN
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_scan_type_and_ticket_are_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = common::auth_token(&app, "admin1", "admin", "sales").await;
    let (seller, _) = common::auth_token(&app, "seller1", "scanner", "sales").await;

    let concert_id = common::create_concert(&app, &admin, "Bad Input").await;
    let tickets = batch_tickets(&app, &admin, concert_id, 1).await;

    assert_eq!(
        scan(&app, &seller, tickets[0], "teleport").await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        scan(&app, &seller, 99999, "sale_confirmation").await,
        StatusCode::NOT_FOUND
    );
}

// ---------------------------------------------------------------------------
// Attendance statistics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn attendance_rate_is_rounded_to_one_decimal(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = common::auth_token(&app, "admin1", "admin", "sales").await;
    let (seller, _) = common::auth_token(&app, "seller1", "scanner", "sales").await;
    let (verifier, _) = common::auth_token(&app, "verifier1", "scanner", "verification").await;

    let concert_id = common::create_concert(&app, &admin, "Rates").await;
    let tickets = batch_tickets(&app, &admin, concert_id, 2).await;

    // Two sold tickets, one attended: 50.0%.
    scan(&app, &seller, tickets[0], "sale_confirmation").await;
    scan(&app, &seller, tickets[1], "sale_confirmation").await;
    scan(&app, &verifier, tickets[0], "attendance").await;

    let response = common::get_auth(
        &app,
        &format!("/api/v1/scans/concert/{concert_id}/attendance"),
        &seller,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_sold"], 2);
    assert_eq!(json["data"]["total_attended"], 1);
    assert_eq!(json["data"]["attendance_rate"], "50.0%");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn attendance_rate_is_zero_percent_without_sales(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = common::auth_token(&app, "admin1", "admin", "sales").await;

    let concert_id = common::create_concert(&app, &admin, "Quiet Night").await;
    batch_tickets(&app, &admin, concert_id, 2).await;

    let response = common::get_auth(
        &app,
        &format!("/api/v1/scans/concert/{concert_id}/attendance"),
        &admin,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_sold"], 0);
    assert_eq!(json["data"]["attendance_rate"], "0%");
}
