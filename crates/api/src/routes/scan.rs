//! Route definitions for the `/scans` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::scan;
use crate::state::AppState;

/// Routes mounted at `/scans`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(scan::create))
        .route("/ticket/{ticket_id}", get(scan::list_for_ticket))
        .route(
            "/concert/{concert_id}/attendance",
            get(scan::concert_attendance),
        )
}
