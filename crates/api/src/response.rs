//! Shared response envelope types for API handlers.
//!
//! Resource endpoints use a `{ "data": ... }` envelope; use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!` for compile-time type safety and
//! consistent serialization. Auth endpoints return their token payloads
//! unwrapped.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
