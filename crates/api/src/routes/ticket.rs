//! Route definitions for the `/tickets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ticket;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// The static prefixes (`create`, `batch`, `number`, `concert`) never clash
/// with the `/{id}` routes; the router gives static segments precedence.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/{concert_id}", post(ticket::create))
        .route("/batch/create/{concert_id}", post(ticket::batch_create))
        .route("/number/{ticket_number}", get(ticket::get_by_number))
        .route("/concert/{concert_id}", get(ticket::list_by_concert))
        .route(
            "/concert/{concert_id}/qr-codes/download",
            get(ticket::download_concert_qr_codes),
        )
        .route("/{id}", get(ticket::get_by_id).delete(ticket::delete))
        .route("/{id}/qr-code", get(ticket::get_qr_code))
        .route("/{id}/download-qr", get(ticket::download_qr))
        .route("/{id}/mark-sold", post(ticket::mark_sold))
}
