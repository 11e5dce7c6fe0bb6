//! Handlers for the `/scans` resource: the two-stage scan workflow and the
//! per-concert attendance statistics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use encore_core::attendance::format_attendance_rate;
use encore_core::error::CoreError;
use encore_core::scan::{scan_effect, ScanDuty, ScanEffect, ScanType};
use encore_core::types::DbId;
use encore_db::models::scan::CreateScan;
use encore_db::repositories::{ConcertRepo, ScanRepo, TicketRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::ticket::parse_status;
use crate::middleware::rbac::{RequireAuth, RequireScanner};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /scans`.
#[derive(Debug, Deserialize)]
pub struct CreateScanRequest {
    pub ticket_id: DbId,
    pub scan_type: String,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Response for `GET /scans/concert/{concert_id}/attendance`.
#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub concert_id: DbId,
    pub total_sold: i64,
    pub total_attended: i64,
    /// `attended / sold` as a percentage with one decimal, or `"0%"` when
    /// nothing has been sold.
    pub attendance_rate: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/scans
///
/// Record a ticket scan. Scanner or admin only. The effect on the ticket
/// status depends on the principal's scan duty and the declared scan type;
/// the scan row itself is always appended.
pub async fn create(
    RequireScanner(scanner): RequireScanner,
    State(state): State<AppState>,
    Json(input): Json<CreateScanRequest>,
) -> AppResult<impl IntoResponse> {
    let scan_type = ScanType::parse(&input.scan_type).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown scan type '{}'",
            input.scan_type
        )))
    })?;

    let ticket = TicketRepo::find_by_id(&state.pool, input.ticket_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found(
            "Ticket",
            input.ticket_id,
        )))?;

    // The scan duty lives on the user row, not in the token claims.
    let user = UserRepo::find_by_id(&state.pool, scanner.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    let duty = ScanDuty::parse(&user.scan_duty).ok_or_else(|| {
        AppError::Core(CoreError::Internal(format!(
            "User {} has unknown scan duty '{}'",
            user.id, user.scan_duty
        )))
    })?;

    // Precondition check before any mutation; the repository CAS backs it
    // up at commit time.
    let effect = scan_effect(duty, scan_type, parse_status(&ticket)?).map_err(AppError::Core)?;

    let create = CreateScan {
        ticket_id: input.ticket_id,
        scan_type: scan_type.as_str().to_string(),
        scanned_by_user_id: Some(scanner.user_id),
        location: input.location,
        notes: input.notes,
    };

    let scan = match effect {
        ScanEffect::Verify => ScanRepo::record_verification(&state.pool, &create, scanner.user_id)
            .await?
            .ok_or_else(|| {
                // Lost the CAS race to another verification scan.
                AppError::Core(CoreError::Conflict(
                    "Ticket already verified - cannot rescan".into(),
                ))
            })?,
        ScanEffect::ConfirmSale => ScanRepo::record_sale_confirmation(&state.pool, &create).await?,
        ScanEffect::RecordOnly => ScanRepo::record_audit_only(&state.pool, &create).await?,
    };

    tracing::info!(
        user_id = scanner.user_id,
        ticket_id = input.ticket_id,
        scan_type = %scan_type,
        duty = %duty,
        "Scan recorded"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: scan })))
}

/// GET /api/v1/scans/ticket/{ticket_id}
///
/// List all scans for a ticket in chronological order.
pub async fn list_for_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Ticket", ticket_id)))?;

    let scans = ScanRepo::list_for_ticket(&state.pool, ticket_id).await?;
    Ok(Json(DataResponse { data: scans }))
}

/// GET /api/v1/scans/concert/{concert_id}/attendance
///
/// Aggregated attendance statistics for a concert. Any authenticated user.
pub async fn concert_attendance(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(concert_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ConcertRepo::find_by_id(&state.pool, concert_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Concert", concert_id)))?;

    let counts = ScanRepo::attendance_counts(&state.pool, concert_id).await?;

    Ok(Json(DataResponse {
        data: AttendanceResponse {
            concert_id,
            total_sold: counts.total_sold,
            total_attended: counts.total_attended,
            attendance_rate: format_attendance_rate(counts.total_sold, counts.total_attended),
        },
    }))
}
