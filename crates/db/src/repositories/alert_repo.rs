//! Repository for the `alerts` table.

use epiwatch_core::alert::NewAlert;
use epiwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::AlertRow;

/// Column list for `alerts` queries.
const COLUMNS: &str = "id, outbreak_id, alert_type, message, is_read, created_at";

/// Provides query operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert an unread alert.
    pub async fn create(pool: &PgPool, dto: &NewAlert) -> Result<AlertRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts (outbreak_id, alert_type, message) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRow>(&query)
            .bind(dto.outbreak_id)
            .bind(dto.alert_type.as_str())
            .bind(&dto.message)
            .fetch_one(pool)
            .await
    }

    /// List alerts newest first.
    ///
    /// When `unread_only` is `true`, only alerts with `is_read = false` are
    /// returned.
    pub async fn list(
        pool: &PgPool,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertRow>, sqlx::Error> {
        let filter = if unread_only {
            "WHERE is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM alerts {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, AlertRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single alert as read. Returns `false` if no alert has this id.
    pub async fn mark_read(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE alerts SET is_read = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every unread alert as read, returning how many were marked.
    pub async fn mark_all_read(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE alerts SET is_read = true WHERE is_read = false")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Number of unread alerts.
    pub async fn unread_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE is_read = false")
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0))
    }

    /// Whether an alert of `alert_type` references `outbreak_id`.
    pub async fn exists_for_outbreak(
        pool: &PgPool,
        outbreak_id: DbId,
        alert_type: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM alerts WHERE outbreak_id = $1 AND alert_type = $2)",
        )
        .bind(outbreak_id)
        .bind(alert_type)
        .fetch_one(pool)
        .await
    }
}
