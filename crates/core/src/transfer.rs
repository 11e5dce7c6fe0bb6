//! Transfer status machine and the guards for initiate/accept/reject.
//!
//! A transfer is a secondary state machine layered on top of the ticket
//! status: `pending -> accepted | rejected`, both terminal. While a transfer
//! is pending the ticket is parked in `transfer_pending`; accepting or
//! rejecting returns it to `sold` (with or without a holder change).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ticket::TicketStatus;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Transfer status
// ---------------------------------------------------------------------------

/// Status of a peer-to-peer transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Awaiting the recipient's decision.
    Pending,
    /// Accepted; ownership moved to the recipient.
    Accepted,
    /// Rejected; the ticket stays with its original holder.
    Rejected,
}

impl TransferStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["pending", "accepted", "rejected"];
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Validate that a ticket is eligible for transfer initiation.
pub fn ensure_transferable(status: TicketStatus) -> Result<(), CoreError> {
    if status != TicketStatus::Sold {
        return Err(CoreError::Validation(
            "Only sold tickets can be transferred".to_string(),
        ));
    }
    Ok(())
}

/// Validate that the acting principal is the designated recipient.
pub fn ensure_recipient(transfer_to: DbId, principal: DbId) -> Result<(), CoreError> {
    if transfer_to != principal {
        return Err(CoreError::Forbidden(
            "Only the designated recipient can respond to this transfer".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a transfer is still pending.
///
/// Accept and reject are only reachable from `pending`; re-invoking either
/// on a processed transfer is a conflict and must leave the record unchanged.
pub fn ensure_pending(status: TransferStatus) -> Result<(), CoreError> {
    if status != TransferStatus::Pending {
        return Err(CoreError::Conflict(
            "Transfer has already been processed".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sold_tickets_are_transferable() {
        assert!(ensure_transferable(TicketStatus::Sold).is_ok());
        for status in [
            TicketStatus::Created,
            TicketStatus::SoldConfirmed,
            TicketStatus::Verified,
            TicketStatus::TransferPending,
        ] {
            let err = ensure_transferable(status).unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
    }

    #[test]
    fn recipient_check_rejects_other_principals() {
        assert!(ensure_recipient(7, 7).is_ok());
        let err = ensure_recipient(7, 8).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn processed_transfers_cannot_be_reprocessed() {
        assert!(ensure_pending(TransferStatus::Pending).is_ok());
        for status in [TransferStatus::Accepted, TransferStatus::Rejected] {
            let err = ensure_pending(status).unwrap_err();
            assert!(matches!(err, CoreError::Conflict(_)));
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for name in TransferStatus::ALL {
            let status = TransferStatus::parse(name).expect("listed value must parse");
            assert_eq!(status.as_str(), *name);
        }
        assert_eq!(TransferStatus::parse("completed"), None);
    }
}
