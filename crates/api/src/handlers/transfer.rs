//! Handlers for the `/transfers` resource: peer-to-peer ticket ownership
//! handoff.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use encore_core::error::CoreError;
use encore_core::transfer::{ensure_pending, ensure_recipient, ensure_transferable,
    TransferStatus};
use encore_core::types::DbId;
use encore_db::models::transfer::{CreateTransfer, Transfer};
use encore_db::repositories::{TicketRepo, TransferRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::ticket::parse_status;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /transfers/initiate`.
#[derive(Debug, Deserialize)]
pub struct InitiateTransferRequest {
    pub ticket_id: DbId,
    pub to_user_id: DbId,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/transfers/initiate
///
/// Create a pending transfer for a sold ticket and park the ticket in
/// `transfer_pending`. A ticket can carry at most one pending transfer.
pub async fn initiate(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<InitiateTransferRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket = TicketRepo::find_by_id(&state.pool, input.ticket_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found(
            "Ticket",
            input.ticket_id,
        )))?;

    ensure_transferable(parse_status(&ticket)?).map_err(AppError::Core)?;

    UserRepo::find_by_id(&state.pool, input.to_user_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found(
            "User",
            input.to_user_id,
        )))?;

    if TransferRepo::find_pending_for_ticket(&state.pool, input.ticket_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "A pending transfer already exists for this ticket".into(),
        )));
    }

    let create = CreateTransfer {
        ticket_id: input.ticket_id,
        from_user_id: user.user_id,
        to_user_id: input.to_user_id,
        notes: input.notes,
    };

    let transfer = TransferRepo::initiate(&state.pool, &create)
        .await?
        .ok_or_else(|| {
            // The ticket left `sold` between the precondition check and the CAS.
            AppError::Core(CoreError::Conflict(
                "Ticket is no longer available for transfer".into(),
            ))
        })?;

    tracing::info!(
        user_id = user.user_id,
        ticket_id = input.ticket_id,
        transfer_id = transfer.id,
        to_user_id = input.to_user_id,
        "Transfer initiated"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: transfer })))
}

/// POST /api/v1/transfers/{id}/accept
///
/// Accept a pending transfer. Recipient only. The ticket's holder becomes
/// the recipient and its status returns to `sold`.
pub async fn accept(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let transfer = guard_response(&state, id, &user).await?;

    let accepted = TransferRepo::accept(&state.pool, transfer.id, user.user_id)
        .await?
        .ok_or_else(processed_conflict)?;

    tracing::info!(
        user_id = user.user_id,
        transfer_id = id,
        ticket_id = accepted.ticket_id,
        "Transfer accepted"
    );

    Ok(Json(DataResponse { data: accepted }))
}

/// POST /api/v1/transfers/{id}/reject
///
/// Reject a pending transfer. Recipient only. The ticket returns to `sold`
/// with its holder unchanged.
pub async fn reject(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let transfer = guard_response(&state, id, &user).await?;

    let rejected = TransferRepo::reject(&state.pool, transfer.id)
        .await?
        .ok_or_else(processed_conflict)?;

    tracing::info!(
        user_id = user.user_id,
        transfer_id = id,
        ticket_id = rejected.ticket_id,
        "Transfer rejected"
    );

    Ok(Json(DataResponse { data: rejected }))
}

/// GET /api/v1/transfers/pending
///
/// List pending transfers addressed to the authenticated user.
pub async fn list_pending(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let transfers = TransferRepo::list_pending_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: transfers }))
}

/// GET /api/v1/transfers/{id}
///
/// Point lookup; any authenticated user may read.
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let transfer = TransferRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Transfer", id)))?;
    Ok(Json(DataResponse { data: transfer }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Shared accept/reject precondition: the transfer exists, the caller is the
/// designated recipient, and the transfer is still pending.
async fn guard_response(
    state: &AppState,
    id: DbId,
    user: &crate::middleware::auth::AuthUser,
) -> Result<Transfer, AppError> {
    let transfer = TransferRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Transfer", id)))?;

    ensure_recipient(transfer.to_user_id, user.user_id).map_err(AppError::Core)?;

    let status = TransferStatus::parse(&transfer.status).ok_or_else(|| {
        AppError::Core(CoreError::Internal(format!(
            "Transfer {} has unknown status '{}'",
            transfer.id, transfer.status
        )))
    })?;
    ensure_pending(status).map_err(AppError::Core)?;

    Ok(transfer)
}

/// Conflict raised when the pending CAS is lost to a concurrent request.
fn processed_conflict() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Transfer has already been processed".into(),
    ))
}
