//! Ticket entity model and DTOs.

use encore_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A ticket row from the `tickets` table.
///
/// `status` holds one of the values in
/// [`encore_core::ticket::TicketStatus::ALL`]; the CHECK constraint on the
/// column and the CAS updates in the repository keep it in that set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub concert_id: DbId,
    pub ticket_number: String,
    /// Opaque base64-encoded PNG blob; see `encore_core::qr`.
    pub qr_code_data: String,
    pub status: String,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub price_cents: Option<i32>,
    pub sold_at: Option<Timestamp>,
    pub sold_by_user_id: Option<DbId>,
    pub verified_at: Option<Timestamp>,
    pub verified_by_user_id: Option<DbId>,
    pub current_holder_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new ticket (single or batch).
#[derive(Debug, Clone)]
pub struct CreateTicket {
    pub concert_id: DbId,
    pub ticket_number: String,
    pub qr_code_data: String,
}

/// Buyer details attached when a ticket is marked sold.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkSold {
    pub buyer_name: String,
    pub buyer_email: String,
    pub price_cents: i32,
}
