//! Scan audit-event model and DTOs.
//!
//! Scans are append-only: rows are never updated after insert and form the
//! audit trail from which the ticket status is derived.

use encore_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A scan row from the `scans` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scan {
    pub id: DbId,
    pub ticket_id: DbId,
    pub scan_type: String,
    pub scanned_at: Timestamp,
    pub scanned_by_user_id: Option<DbId>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// DTO for appending a new scan.
#[derive(Debug, Clone)]
pub struct CreateScan {
    pub ticket_id: DbId,
    pub scan_type: String,
    pub scanned_by_user_id: Option<DbId>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Raw per-concert attendance counts, before rate formatting.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceCounts {
    pub total_sold: i64,
    pub total_attended: i64,
}
