//! Scan types, principal scan duties, and the scan-to-status transition rules.
//!
//! A scan is an immutable audit event; the ticket status is a derived
//! projection. What a scan does to the status depends on the scanning
//! principal's *duty* (an explicit account attribute, assigned at
//! provisioning) and the declared scan type:
//!
//! - Verification duty: drives the ticket to `verified`. Re-verifying an
//!   already-verified ticket is the system's single hard invariant and
//!   fails with a conflict before anything is mutated.
//! - Sales duty: `sale_confirmation` confirms the sale; `entry_check` and
//!   `attendance` are recorded for the audit trail only. Sales scans may
//!   repeat without restriction and never move a `verified` or
//!   `transfer_pending` ticket.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ticket::TicketStatus;

// ---------------------------------------------------------------------------
// Scan type
// ---------------------------------------------------------------------------

/// Declared type of a scan event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    /// Stage 1: seller confirms the sale.
    SaleConfirmation,
    /// Stage 2: entry gate check.
    EntryCheck,
    /// Stage 2: attendance record.
    Attendance,
}

impl ScanType {
    /// Return the scan type name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaleConfirmation => "sale_confirmation",
            Self::EntryCheck => "entry_check",
            Self::Attendance => "attendance",
        }
    }

    /// Parse a scan type string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sale_confirmation" => Some(Self::SaleConfirmation),
            "entry_check" => Some(Self::EntryCheck),
            "attendance" => Some(Self::Attendance),
            _ => None,
        }
    }

    /// All valid scan type values.
    pub const ALL: &'static [&'static str] = &["sale_confirmation", "entry_check", "attendance"];

    /// Whether scans of this type count toward attendance statistics.
    pub fn counts_as_attendance(&self) -> bool {
        matches!(self, Self::EntryCheck | Self::Attendance)
    }
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Scan duty
// ---------------------------------------------------------------------------

/// Business classification of a scanning principal, distinct from the
/// authorization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDuty {
    /// Confirms sales before entry (stage 1).
    Sales,
    /// Performs the terminal attendance check at the venue (stage 2).
    Verification,
}

impl ScanDuty {
    /// Return the duty name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Verification => "verification",
        }
    }

    /// Parse a duty string. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sales" => Some(Self::Sales),
            "verification" => Some(Self::Verification),
            _ => None,
        }
    }

    /// All valid duty values.
    pub const ALL: &'static [&'static str] = &["sales", "verification"];
}

impl std::fmt::Display for ScanDuty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transition rules
// ---------------------------------------------------------------------------

/// What a scan does to the ticket status, decided before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEffect {
    /// Set status to `verified` and stamp the verifying principal.
    Verify,
    /// Set status to `sold_confirmed` (when the current status permits).
    ConfirmSale,
    /// Append the audit row only; the status value is untouched.
    RecordOnly,
}

/// Statuses from which a sale-confirmation scan may move a ticket to
/// `sold_confirmed`. `verified` is terminal and `transfer_pending` is a
/// marker the transfer coordinator owns.
pub const SALE_CONFIRMABLE: &[TicketStatus] = &[
    TicketStatus::Created,
    TicketStatus::Sold,
    TicketStatus::SoldConfirmed,
];

/// Decide the status effect of a scan.
///
/// Fails with [`CoreError::Conflict`] when a verification-duty principal
/// scans a ticket that is already `verified`; the precondition must hold
/// before any row is written.
pub fn scan_effect(
    duty: ScanDuty,
    scan_type: ScanType,
    current: TicketStatus,
) -> Result<ScanEffect, CoreError> {
    match duty {
        ScanDuty::Verification => {
            if current == TicketStatus::Verified {
                return Err(CoreError::Conflict(
                    "Ticket already verified - cannot rescan".to_string(),
                ));
            }
            Ok(ScanEffect::Verify)
        }
        ScanDuty::Sales => match scan_type {
            ScanType::SaleConfirmation => Ok(ScanEffect::ConfirmSale),
            ScanType::EntryCheck | ScanType::Attendance => Ok(ScanEffect::RecordOnly),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- verification duty ---------------------------------------------------

    #[test]
    fn verification_scan_verifies_unverified_tickets() {
        for status in [
            TicketStatus::Created,
            TicketStatus::Sold,
            TicketStatus::SoldConfirmed,
            TicketStatus::TransferPending,
        ] {
            let effect = scan_effect(ScanDuty::Verification, ScanType::Attendance, status)
                .expect("unverified ticket must be verifiable");
            assert_eq!(effect, ScanEffect::Verify);
        }
    }

    #[test]
    fn verification_rescan_conflicts() {
        let err = scan_effect(
            ScanDuty::Verification,
            ScanType::Attendance,
            TicketStatus::Verified,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn verification_ignores_declared_scan_type() {
        // The duty decides the effect; the declared type is audit metadata.
        for scan_type in [
            ScanType::SaleConfirmation,
            ScanType::EntryCheck,
            ScanType::Attendance,
        ] {
            let effect =
                scan_effect(ScanDuty::Verification, scan_type, TicketStatus::Sold).unwrap();
            assert_eq!(effect, ScanEffect::Verify);
        }
    }

    // -- sales duty ----------------------------------------------------------

    #[test]
    fn sales_sale_confirmation_confirms() {
        let effect = scan_effect(
            ScanDuty::Sales,
            ScanType::SaleConfirmation,
            TicketStatus::Sold,
        )
        .unwrap();
        assert_eq!(effect, ScanEffect::ConfirmSale);
    }

    #[test]
    fn sales_entry_and_attendance_record_only() {
        for scan_type in [ScanType::EntryCheck, ScanType::Attendance] {
            let effect = scan_effect(ScanDuty::Sales, scan_type, TicketStatus::SoldConfirmed)
                .expect("sales scans are unrestricted");
            assert_eq!(effect, ScanEffect::RecordOnly);
        }
    }

    #[test]
    fn sales_may_rescan_verified_tickets() {
        // The scan is recorded; the terminal status is simply not disturbed.
        let effect = scan_effect(
            ScanDuty::Sales,
            ScanType::SaleConfirmation,
            TicketStatus::Verified,
        )
        .unwrap();
        assert_eq!(effect, ScanEffect::ConfirmSale);
        assert!(!SALE_CONFIRMABLE.contains(&TicketStatus::Verified));
    }

    #[test]
    fn transfer_pending_is_not_sale_confirmable() {
        assert!(!SALE_CONFIRMABLE.contains(&TicketStatus::TransferPending));
    }

    // -- attendance classification -------------------------------------------

    #[test]
    fn attendance_types_are_classified() {
        assert!(ScanType::EntryCheck.counts_as_attendance());
        assert!(ScanType::Attendance.counts_as_attendance());
        assert!(!ScanType::SaleConfirmation.counts_as_attendance());
    }
}
