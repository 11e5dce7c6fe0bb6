//! Repository for the `transfers` table.
//!
//! Initiate, accept, and reject each run in one transaction pairing the
//! transfer-side CAS with the ticket-side CAS, so the two state machines
//! can never drift apart under concurrent requests.

use encore_core::ticket::TicketStatus;
use encore_core::transfer::TransferStatus;
use encore_core::types::DbId;
use sqlx::PgPool;

use crate::models::transfer::{CreateTransfer, Transfer};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ticket_id, from_user_id, to_user_id, status, notes, \
                       initiated_at, completed_at, created_at, updated_at";

/// Provides operations for peer-to-peer ticket transfers.
pub struct TransferRepo;

impl TransferRepo {
    /// Create a pending transfer and park the ticket in `transfer_pending`.
    ///
    /// The ticket-side CAS requires status `sold`; if another request moved
    /// the ticket first (or a pending transfer already holds it), nothing is
    /// written and `None` is returned. The partial unique index
    /// `uq_transfers_pending_ticket` backs the one-pending-per-ticket rule
    /// at the schema level.
    pub async fn initiate(
        pool: &PgPool,
        input: &CreateTransfer,
    ) -> Result<Option<Transfer>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE tickets SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = $3",
        )
        .bind(input.ticket_id)
        .bind(TicketStatus::TransferPending.as_str())
        .bind(TicketStatus::Sold.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO transfers (ticket_id, from_user_id, to_user_id, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let transfer = sqlx::query_as::<_, Transfer>(&query)
            .bind(input.ticket_id)
            .bind(input.from_user_id)
            .bind(input.to_user_id)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(transfer))
    }

    /// CAS `pending -> accepted`: stamp completion, hand the ticket to the
    /// recipient, and return it to `sold`.
    ///
    /// Returns `None` when the transfer is no longer pending.
    pub async fn accept(
        pool: &PgPool,
        id: DbId,
        recipient_id: DbId,
    ) -> Result<Option<Transfer>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE transfers SET status = $2, completed_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let transfer = sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .bind(TransferStatus::Accepted.as_str())
            .bind(TransferStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(transfer) = transfer else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE tickets SET current_holder_id = $2, status = $3, updated_at = NOW()
             WHERE id = $1 AND status = $4",
        )
        .bind(transfer.ticket_id)
        .bind(recipient_id)
        .bind(TicketStatus::Sold.as_str())
        .bind(TicketStatus::TransferPending.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(transfer))
    }

    /// CAS `pending -> rejected`: the ticket returns to `sold` with its
    /// holder untouched.
    ///
    /// Returns `None` when the transfer is no longer pending.
    pub async fn reject(pool: &PgPool, id: DbId) -> Result<Option<Transfer>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE transfers SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let transfer = sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .bind(TransferStatus::Rejected.as_str())
            .bind(TransferStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(transfer) = transfer else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE tickets SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = $3",
        )
        .bind(transfer.ticket_id)
        .bind(TicketStatus::Sold.as_str())
        .bind(TicketStatus::TransferPending.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(transfer))
    }

    /// Find a transfer by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transfer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transfers WHERE id = $1");
        sqlx::query_as::<_, Transfer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the pending transfer for a ticket, if one exists.
    pub async fn find_pending_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Option<Transfer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transfers WHERE ticket_id = $1 AND status = $2"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(ticket_id)
            .bind(TransferStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    /// List pending transfers addressed to a user, oldest first.
    pub async fn list_pending_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Transfer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transfers
             WHERE to_user_id = $1 AND status = $2
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(user_id)
            .bind(TransferStatus::Pending.as_str())
            .fetch_all(pool)
            .await
    }
}
