//! Handlers for the `/concerts` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use encore_core::error::CoreError;
use encore_core::types::DbId;
use encore_db::models::concert::{CreateConcert, UpdateConcert};
use encore_db::repositories::ConcertRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/concerts
///
/// Create a new concert. Admin only.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateConcert>,
) -> AppResult<impl IntoResponse> {
    let concert = ConcertRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = admin.user_id, concert_id = concert.id, "Concert created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: concert })))
}

/// GET /api/v1/concerts
///
/// List all concerts, soonest first.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let concerts = ConcertRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: concerts }))
}

/// GET /api/v1/concerts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let concert = ConcertRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Concert", id)))?;
    Ok(Json(DataResponse { data: concert }))
}

/// PUT /api/v1/concerts/{id}
///
/// Update concert details. Admin only.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateConcert>,
) -> AppResult<impl IntoResponse> {
    let concert = ConcertRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Concert", id)))?;

    tracing::info!(user_id = admin.user_id, concert_id = id, "Concert updated");

    Ok(Json(DataResponse { data: concert }))
}

/// DELETE /api/v1/concerts/{id}
///
/// Delete a concert and, by cascade, all of its tickets and their scans.
/// Admin only.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = ConcertRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found("Concert", id)));
    }

    tracing::info!(user_id = admin.user_id, concert_id = id, "Concert deleted");

    Ok(StatusCode::NO_CONTENT)
}
