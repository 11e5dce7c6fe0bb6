//! Route definitions for the `/transfers` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::transfer;
use crate::state::AppState;

/// Routes mounted at `/transfers`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/initiate", post(transfer::initiate))
        .route("/pending", get(transfer::list_pending))
        .route("/{id}", get(transfer::get_by_id))
        .route("/{id}/accept", post(transfer::accept))
        .route("/{id}/reject", post(transfer::reject))
}
