//! Route definitions for the `/concerts` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::concert;
use crate::state::AppState;

/// Routes mounted at `/concerts`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(concert::list).post(concert::create))
        .route(
            "/{id}",
            get(concert::get_by_id)
                .put(concert::update)
                .delete(concert::delete),
        )
}
