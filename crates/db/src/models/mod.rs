//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - Request/response shapes that belong to the entity rather than a handler

pub mod concert;
pub mod role;
pub mod scan;
pub mod session;
pub mod ticket;
pub mod transfer;
pub mod user;
