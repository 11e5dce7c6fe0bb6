//! Repository for the `concerts` table.

use encore_core::types::DbId;
use sqlx::PgPool;

use crate::models::concert::{Concert, CreateConcert, UpdateConcert};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, date, venue, description, created_at";

/// Provides CRUD operations for concerts.
pub struct ConcertRepo;

impl ConcertRepo {
    /// Insert a new concert, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateConcert) -> Result<Concert, sqlx::Error> {
        let query = format!(
            "INSERT INTO concerts (name, date, venue, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Concert>(&query)
            .bind(&input.name)
            .bind(input.date)
            .bind(&input.venue)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a concert by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Concert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM concerts WHERE id = $1");
        sqlx::query_as::<_, Concert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all concerts ordered by date ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Concert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM concerts ORDER BY date ASC");
        sqlx::query_as::<_, Concert>(&query).fetch_all(pool).await
    }

    /// Update a concert. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateConcert,
    ) -> Result<Option<Concert>, sqlx::Error> {
        let query = format!(
            "UPDATE concerts SET
                name = COALESCE($2, name),
                date = COALESCE($3, date),
                venue = COALESCE($4, venue),
                description = COALESCE($5, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Concert>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.date)
            .bind(&input.venue)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a concert. Tickets and their scans are removed by the
    /// ON DELETE CASCADE foreign keys. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM concerts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
