//! Request handlers, one module per resource.

pub mod auth;
pub mod concert;
pub mod scan;
pub mod ticket;
pub mod transfer;
