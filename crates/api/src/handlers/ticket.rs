//! Handlers for the `/tickets` resource: issuance (single and batch), point
//! lookups, QR blob access, the mark-sold transition, and deletion.

use std::io::Write as _;

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use encore_core::error::CoreError;
use encore_core::qr;
use encore_core::ticket::{
    can_mark_sold, generate_ticket_number, validate_batch_quantity, TicketStatus,
};
use encore_core::types::DbId;
use encore_db::models::ticket::{CreateTicket, MarkSold, Ticket};
use encore_db::repositories::{ConcertRepo, TicketRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /tickets/batch/create/{concert_id}`.
#[derive(Debug, Deserialize)]
pub struct BatchCreateRequest {
    pub quantity: i64,
}

/// Response for a batch-issue request.
#[derive(Debug, Serialize)]
pub struct BatchCreateResponse {
    pub created_count: usize,
    pub concert_id: DbId,
    pub ticket_numbers: Vec<String>,
}

/// Response for `GET /tickets/{id}/qr-code`.
#[derive(Debug, Serialize)]
pub struct TicketQrResponse {
    pub ticket_id: DbId,
    pub ticket_number: String,
    pub qr_code: String,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets/create/{concert_id}
///
/// Issue a single ticket with a fresh ticket number and QR blob. Admin only.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(concert_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_concert_exists(&state, concert_id).await?;

    let input = new_ticket_input(concert_id)?;
    let ticket = TicketRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = admin.user_id,
        ticket_id = ticket.id,
        concert_id,
        "Ticket issued"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// POST /api/v1/tickets/batch/create/{concert_id}
///
/// Issue between 1 and 5000 tickets atomically. Admin only.
pub async fn batch_create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(concert_id): Path<DbId>,
    Json(input): Json<BatchCreateRequest>,
) -> AppResult<impl IntoResponse> {
    validate_batch_quantity(input.quantity).map_err(AppError::Core)?;
    ensure_concert_exists(&state, concert_id).await?;

    let inputs: Vec<CreateTicket> = (0..input.quantity)
        .map(|_| new_ticket_input(concert_id))
        .collect::<Result<_, _>>()?;

    let tickets = TicketRepo::create_batch(&state.pool, &inputs).await?;
    let ticket_numbers: Vec<String> = tickets.iter().map(|t| t.ticket_number.clone()).collect();

    tracing::info!(
        user_id = admin.user_id,
        concert_id,
        count = tickets.len(),
        "Ticket batch issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BatchCreateResponse {
                created_count: tickets.len(),
                concert_id,
                ticket_numbers,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/tickets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ticket = find_ticket(&state, id).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// GET /api/v1/tickets/number/{ticket_number}
///
/// Lookup by ticket number, the identifier QR scanners read.
pub async fn get_by_number(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
) -> AppResult<impl IntoResponse> {
    let ticket = TicketRepo::find_by_number(&state.pool, &ticket_number)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Ticket", &ticket_number)))?;
    Ok(Json(DataResponse { data: ticket }))
}

/// GET /api/v1/tickets/concert/{concert_id}
pub async fn list_by_concert(
    State(state): State<AppState>,
    Path(concert_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_concert_exists(&state, concert_id).await?;
    let tickets = TicketRepo::list_by_concert(&state.pool, concert_id).await?;
    Ok(Json(DataResponse { data: tickets }))
}

/// GET /api/v1/tickets/{id}/qr-code
///
/// Return the stored QR blob alongside the ticket identity.
pub async fn get_qr_code(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ticket = find_ticket(&state, id).await?;
    Ok(Json(DataResponse {
        data: TicketQrResponse {
            ticket_id: ticket.id,
            ticket_number: ticket.ticket_number,
            qr_code: ticket.qr_code_data,
            status: ticket.status,
        },
    }))
}

/// GET /api/v1/tickets/{id}/download-qr
///
/// Download the QR image as a PNG attachment.
pub async fn download_qr(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ticket = find_ticket(&state, id).await?;
    let png = qr::decode_qr_blob(&ticket.qr_code_data).map_err(AppError::Core)?;

    Ok((
        [
            (CONTENT_TYPE, "image/png".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=QR_{}.png", ticket.ticket_number),
            ),
        ],
        png,
    ))
}

/// GET /api/v1/tickets/concert/{concert_id}/qr-codes/download
///
/// Download all QR images for a concert as a ZIP archive. Requires
/// authentication.
pub async fn download_concert_qr_codes(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(concert_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let concert = ConcertRepo::find_by_id(&state.pool, concert_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Concert", concert_id)))?;

    let tickets = TicketRepo::list_by_concert(&state.pool, concert_id).await?;
    if tickets.is_empty() {
        return Err(AppError::Core(CoreError::not_found(
            "Tickets for concert",
            concert_id,
        )));
    }

    let archive = build_qr_archive(&tickets)?;

    Ok((
        [
            (CONTENT_TYPE, "application/zip".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=qr-codes-{}.zip", concert.name),
            ),
        ],
        archive,
    ))
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets/{id}/mark-sold
///
/// CAS `created -> sold`: attach buyer details and stamp the sale. Admin
/// only. Re-selling a ticket that has already left `created` is a conflict.
pub async fn mark_sold(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MarkSold>,
) -> AppResult<impl IntoResponse> {
    let ticket = find_ticket(&state, id).await?;
    can_mark_sold(parse_status(&ticket)?).map_err(AppError::Core)?;

    let sold = TicketRepo::mark_sold(&state.pool, id, &input, admin.user_id)
        .await?
        .ok_or_else(|| {
            // The precondition held a moment ago; another request won the CAS.
            AppError::Core(CoreError::Conflict(
                "Ticket was sold by a concurrent request".into(),
            ))
        })?;

    tracing::info!(user_id = admin.user_id, ticket_id = id, "Ticket marked sold");

    Ok(Json(DataResponse { data: sold }))
}

/// DELETE /api/v1/tickets/{id}
///
/// Hard-delete a ticket; its scans cascade. Admin only.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = TicketRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found("Ticket", id)));
    }

    tracing::info!(user_id = admin.user_id, ticket_id = id, "Ticket deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the insert DTO for one fresh ticket.
fn new_ticket_input(concert_id: DbId) -> Result<CreateTicket, AppError> {
    let ticket_number = generate_ticket_number();
    let qr_code_data = qr::encode_qr_blob(&ticket_number, concert_id).map_err(AppError::Core)?;
    Ok(CreateTicket {
        concert_id,
        ticket_number,
        qr_code_data,
    })
}

/// Fetch a ticket or fail with 404.
async fn find_ticket(state: &AppState, id: DbId) -> Result<Ticket, AppError> {
    TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Ticket", id)))
}

/// Fail with 404 when the concert does not exist.
async fn ensure_concert_exists(state: &AppState, concert_id: DbId) -> Result<(), AppError> {
    ConcertRepo::find_by_id(&state.pool, concert_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::not_found("Concert", concert_id)))
}

/// Parse the stored status column, treating unknown values as corruption.
pub(crate) fn parse_status(ticket: &Ticket) -> Result<TicketStatus, AppError> {
    TicketStatus::parse(&ticket.status).ok_or_else(|| {
        AppError::Core(CoreError::Internal(format!(
            "Ticket {} has unknown status '{}'",
            ticket.id, ticket.status
        )))
    })
}

/// Bundle each ticket's decoded QR PNG into an in-memory ZIP archive.
fn build_qr_archive(tickets: &[Ticket]) -> Result<Vec<u8>, AppError> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut archive = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for ticket in tickets {
            let png = qr::decode_qr_blob(&ticket.qr_code_data).map_err(AppError::Core)?;
            archive
                .start_file(format!("QR_{}.png", ticket.ticket_number), options)
                .map_err(|e| AppError::InternalError(format!("ZIP write error: {e}")))?;
            archive
                .write_all(&png)
                .map_err(|e| AppError::InternalError(format!("ZIP write error: {e}")))?;
        }
        archive
            .finish()
            .map_err(|e| AppError::InternalError(format!("ZIP write error: {e}")))?;
    }
    Ok(cursor.into_inner())
}
