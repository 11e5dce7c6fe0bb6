//! Concert entity model and DTOs.

use encore_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A concert row from the `concerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Concert {
    pub id: DbId,
    pub name: String,
    pub date: Timestamp,
    pub venue: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new concert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConcert {
    pub name: String,
    pub date: Timestamp,
    pub venue: String,
    pub description: Option<String>,
}

/// DTO for updating an existing concert. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConcert {
    pub name: Option<String>,
    pub date: Option<Timestamp>,
    pub venue: Option<String>,
    pub description: Option<String>,
}
