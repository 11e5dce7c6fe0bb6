//! Repository for the `scans` table and the attendance aggregation.
//!
//! Each `record_*` method appends the audit row and applies the ticket-side
//! effect in one transaction, so a scan can never be recorded with a
//! half-applied status transition.

use encore_core::scan::ScanType;
use encore_core::ticket::TicketStatus;
use encore_core::types::DbId;
use sqlx::PgPool;

use crate::models::scan::{AttendanceCounts, CreateScan, Scan};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, ticket_id, scan_type, scanned_at, scanned_by_user_id, location, notes";

/// Provides append and read operations for scans.
pub struct ScanRepo;

impl ScanRepo {
    /// Record a verification-duty scan: CAS the ticket to `verified` and
    /// stamp the verifying principal, then append the audit row.
    ///
    /// Returns `None` without writing anything when the ticket is already
    /// `verified` -- the no-re-verification invariant, enforced at commit
    /// time even if the precondition check raced.
    pub async fn record_verification(
        pool: &PgPool,
        input: &CreateScan,
        verified_by: DbId,
    ) -> Result<Option<Scan>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE tickets SET
                status = $2,
                verified_by_user_id = $3,
                verified_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND status <> $2",
        )
        .bind(input.ticket_id)
        .bind(TicketStatus::Verified.as_str())
        .bind(verified_by)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let scan = Self::insert(&mut tx, input).await?;
        tx.commit().await?;
        Ok(Some(scan))
    }

    /// Record a sales-duty sale-confirmation scan.
    ///
    /// The status CAS only fires from the sale-confirmable statuses; a
    /// rescan of a `verified` or `transfer_pending` ticket still appends
    /// the audit row and refreshes `updated_at` without touching the status.
    pub async fn record_sale_confirmation(
        pool: &PgPool,
        input: &CreateScan,
    ) -> Result<Scan, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE tickets SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = ANY($3)",
        )
        .bind(input.ticket_id)
        .bind(TicketStatus::SoldConfirmed.as_str())
        .bind(
            encore_core::scan::SALE_CONFIRMABLE
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
        )
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Every scan refreshes the ticket's clock, changed status or not.
            sqlx::query("UPDATE tickets SET updated_at = NOW() WHERE id = $1")
                .bind(input.ticket_id)
                .execute(&mut *tx)
                .await?;
        }

        let scan = Self::insert(&mut tx, input).await?;
        tx.commit().await?;
        Ok(scan)
    }

    /// Record an audit-only scan (sales-duty entry check or attendance):
    /// append the row and refresh `updated_at` without a status change.
    pub async fn record_audit_only(pool: &PgPool, input: &CreateScan) -> Result<Scan, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE tickets SET updated_at = NOW() WHERE id = $1")
            .bind(input.ticket_id)
            .execute(&mut *tx)
            .await?;

        let scan = Self::insert(&mut tx, input).await?;
        tx.commit().await?;
        Ok(scan)
    }

    /// List all scans for a ticket in insertion order.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<Scan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scans WHERE ticket_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Scan>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Per-concert attendance counts: tickets in a sold-or-later status, and
    /// distinct tickets with at least one attendance-stage scan.
    pub async fn attendance_counts(
        pool: &PgPool,
        concert_id: DbId,
    ) -> Result<AttendanceCounts, sqlx::Error> {
        let (total_sold,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tickets WHERE concert_id = $1 AND status = ANY($2)",
        )
        .bind(concert_id)
        .bind(vec![
            TicketStatus::SoldConfirmed.as_str(),
            TicketStatus::Verified.as_str(),
        ])
        .fetch_one(pool)
        .await?;

        let (total_attended,): (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT s.ticket_id)
             FROM scans s
             JOIN tickets t ON t.id = s.ticket_id
             WHERE t.concert_id = $1 AND s.scan_type = ANY($2)",
        )
        .bind(concert_id)
        .bind(vec![
            ScanType::EntryCheck.as_str(),
            ScanType::Attendance.as_str(),
        ])
        .fetch_one(pool)
        .await?;

        Ok(AttendanceCounts {
            total_sold,
            total_attended,
        })
    }

    /// Append the scan row inside an open transaction.
    async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateScan,
    ) -> Result<Scan, sqlx::Error> {
        let query = format!(
            "INSERT INTO scans (ticket_id, scan_type, scanned_by_user_id, location, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(input.ticket_id)
            .bind(&input.scan_type)
            .bind(input.scanned_by_user_id)
            .bind(&input.location)
            .bind(&input.notes)
            .fetch_one(&mut **tx)
            .await
    }
}
