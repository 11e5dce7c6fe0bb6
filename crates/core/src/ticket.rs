//! Ticket status lifecycle, batch-issue bounds, and ticket-number generation.
//!
//! The ticket status field is the denormalized projection at the center of
//! the scan and transfer workflows. The canonical lifecycle:
//!
//! ```text
//! created --(mark-sold)--> sold --(sale_confirmation scan)--> sold_confirmed
//!                            |                                      |
//!                            |                             (verification scan)
//!                       (initiate transfer)                         v
//!                            v                                  verified
//!                      transfer_pending --(accept/reject)--> sold
//! ```
//!
//! `verified` is terminal for the scan workflow: no scan may move a ticket
//! out of it, and a verification scan of an already-verified ticket is a
//! conflict.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum number of tickets in a single batch-issue request.
pub const MIN_BATCH_QUANTITY: i64 = 1;

/// Maximum number of tickets in a single batch-issue request.
pub const MAX_BATCH_QUANTITY: i64 = 5000;

/// Length of a generated ticket number.
pub const TICKET_NUMBER_LENGTH: usize = 12;

// ---------------------------------------------------------------------------
// Ticket status
// ---------------------------------------------------------------------------

/// Status of a ticket through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Issued but not yet sold.
    Created,
    /// Sold by an admin; buyer details attached.
    Sold,
    /// Sale confirmed by a sales-duty scan (stage 1).
    SoldConfirmed,
    /// Attendance verified at the venue (stage 2, terminal for scans).
    Verified,
    /// An ownership transfer is in flight.
    TransferPending,
}

impl TicketStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Sold => "sold",
            Self::SoldConfirmed => "sold_confirmed",
            Self::Verified => "verified",
            Self::TransferPending => "transfer_pending",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "sold" => Some(Self::Sold),
            "sold_confirmed" => Some(Self::SoldConfirmed),
            "verified" => Some(Self::Verified),
            "transfer_pending" => Some(Self::TransferPending),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &[
        "created",
        "sold",
        "sold_confirmed",
        "verified",
        "transfer_pending",
    ];
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a batch-issue quantity is within `[1, 5000]` inclusive.
pub fn validate_batch_quantity(quantity: i64) -> Result<(), CoreError> {
    if !(MIN_BATCH_QUANTITY..=MAX_BATCH_QUANTITY).contains(&quantity) {
        return Err(CoreError::Validation(format!(
            "Quantity must be between {MIN_BATCH_QUANTITY} and {MAX_BATCH_QUANTITY}, \
             got {quantity}"
        )));
    }
    Ok(())
}

/// Validate that a ticket can be marked sold.
///
/// Only freshly issued tickets are sellable; re-selling a ticket that has
/// already left the `created` state is a conflict.
pub fn can_mark_sold(status: TicketStatus) -> Result<(), CoreError> {
    if status != TicketStatus::Created {
        return Err(CoreError::Conflict(format!(
            "Ticket cannot be sold from status '{status}'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ticket numbers
// ---------------------------------------------------------------------------

/// Generate a fresh 12-character uppercase ticket number.
///
/// Derived from a v4 UUID, so collisions across a 5000-ticket batch are
/// practically impossible; the `uq_tickets_ticket_number` constraint is the
/// final arbiter.
pub fn generate_ticket_number() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    hex[..TICKET_NUMBER_LENGTH].to_ascii_uppercase()
}
