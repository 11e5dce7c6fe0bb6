//! Pure domain logic for the Encore concert-ticketing platform.
//!
//! This crate has no database, async, or HTTP dependencies. It provides:
//!
//! - Status enumerations with string conversions ([`ticket`], [`scan`],
//!   [`transfer`])
//! - Lifecycle transition rules for the two-stage scan workflow and
//!   peer-to-peer transfers
//! - Attendance-rate computation ([`attendance`])
//! - Ticket-number generation and QR blob synthesis ([`qr`])

pub mod attendance;
pub mod error;
pub mod qr;
pub mod roles;
pub mod scan;
pub mod ticket;
pub mod transfer;
pub mod types;
