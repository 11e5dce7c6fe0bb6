//! Repository for the `tickets` table.
//!
//! Status transitions are compare-and-swap updates: every `UPDATE` carries
//! the expected prior status in its `WHERE` clause and the caller inspects
//! whether a row came back. A lost CAS means another request moved the
//! ticket first and surfaces as a conflict at the API layer.

use encore_core::ticket::TicketStatus;
use encore_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket::{CreateTicket, MarkSold, Ticket};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, concert_id, ticket_number, qr_code_data, status, buyer_name, \
                       buyer_email, price_cents, sold_at, sold_by_user_id, verified_at, \
                       verified_by_user_id, current_holder_id, created_at, updated_at";

/// Provides CRUD operations and status CAS transitions for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a single ticket in status `created`, returning the row.
    pub async fn create(pool: &PgPool, input: &CreateTicket) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (concert_id, ticket_number, qr_code_data)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(input.concert_id)
            .bind(&input.ticket_number)
            .bind(&input.qr_code_data)
            .fetch_one(pool)
            .await
    }

    /// Insert a batch of tickets atomically, returning the created rows in
    /// insertion order. Either every ticket is created or none is.
    pub async fn create_batch(
        pool: &PgPool,
        inputs: &[CreateTicket],
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (concert_id, ticket_number, qr_code_data)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut tickets = Vec::with_capacity(inputs.len());
        for input in inputs {
            let ticket = sqlx::query_as::<_, Ticket>(&query)
                .bind(input.concert_id)
                .bind(&input.ticket_number)
                .bind(&input.qr_code_data)
                .fetch_one(&mut *tx)
                .await?;
            tickets.push(ticket);
        }
        tx.commit().await?;

        tracing::debug!(count = tickets.len(), "Ticket batch committed");
        Ok(tickets)
    }

    /// Find a ticket by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a ticket by its unique ticket number (QR scanner lookups).
    pub async fn find_by_number(
        pool: &PgPool,
        ticket_number: &str,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE ticket_number = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_number)
            .fetch_optional(pool)
            .await
    }

    /// List all tickets for a concert, oldest first.
    pub async fn list_by_concert(
        pool: &PgPool,
        concert_id: DbId,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM tickets WHERE concert_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(concert_id)
            .fetch_all(pool)
            .await
    }

    /// CAS `created -> sold`: attach buyer details, stamp the sale, and set
    /// the acting admin as the current holder.
    ///
    /// Returns `None` when the ticket has already left `created` (or does
    /// not exist); the caller maps that to a conflict.
    pub async fn mark_sold(
        pool: &PgPool,
        id: DbId,
        input: &MarkSold,
        sold_by: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                status = $2,
                buyer_name = $3,
                buyer_email = $4,
                price_cents = $5,
                sold_at = NOW(),
                sold_by_user_id = $6,
                current_holder_id = $6,
                updated_at = NOW()
             WHERE id = $1 AND status = $7
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(TicketStatus::Sold.as_str())
            .bind(&input.buyer_name)
            .bind(&input.buyer_email)
            .bind(input.price_cents)
            .bind(sold_by)
            .bind(TicketStatus::Created.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a ticket; its scans are removed by cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
