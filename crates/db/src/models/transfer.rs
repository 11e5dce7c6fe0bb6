//! Transfer entity model and DTOs.

use encore_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A transfer row from the `transfers` table.
///
/// Processed transfers are retained as audit history; they are removed only
/// when their ticket is deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transfer {
    pub id: DbId,
    pub ticket_id: DbId,
    pub from_user_id: DbId,
    pub to_user_id: DbId,
    pub status: String,
    pub notes: Option<String>,
    pub initiated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new transfer request.
#[derive(Debug, Clone)]
pub struct CreateTransfer {
    pub ticket_id: DbId,
    pub from_user_id: DbId,
    pub to_user_id: DbId,
    pub notes: Option<String>,
}
