//! Repository for the `outbreaks` table.

use epiwatch_core::outbreak::{NewOutbreak, OutbreakUpdate};
use epiwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::outbreak::OutbreakRow;

/// Column list for `outbreaks` queries.
const COLUMNS: &str = "\
    id, disease_name, disease_category, location, case_count, severity, \
    status, detected_date, updated_at";

/// Provides query operations for outbreaks.
pub struct OutbreakRepo;

impl OutbreakRepo {
    /// Find the active outbreak for a (disease, location) key.
    pub async fn find_active(
        pool: &PgPool,
        disease_name: &str,
        location: &str,
    ) -> Result<Option<OutbreakRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM outbreaks \
             WHERE disease_name = $1 AND location = $2 AND status = 'active'"
        );
        sqlx::query_as::<_, OutbreakRow>(&query)
            .bind(disease_name)
            .bind(location)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new active outbreak.
    ///
    /// Fails with a unique violation on `uq_outbreaks_active_key` if an active
    /// outbreak already exists for the key.
    pub async fn create(pool: &PgPool, dto: &NewOutbreak) -> Result<OutbreakRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO outbreaks \
                (disease_name, disease_category, location, case_count, severity, status, detected_date) \
             VALUES ($1, $2, $3, $4, $5, 'active', $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutbreakRow>(&query)
            .bind(&dto.disease_name)
            .bind(&dto.disease_category)
            .bind(&dto.location)
            .bind(dto.case_count)
            .bind(dto.severity.as_str())
            .bind(dto.detected_date)
            .fetch_one(pool)
            .await
    }

    /// Rewrite case count and severity. Returns `true` if a row was updated.
    pub async fn update_counts(
        pool: &PgPool,
        id: DbId,
        update: &OutbreakUpdate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE outbreaks \
             SET case_count = $2, severity = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(update.case_count)
        .bind(update.severity.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List outbreaks newest-detected first, optionally filtered by status.
    pub async fn list(pool: &PgPool, status: Option<&str>) -> Result<Vec<OutbreakRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM outbreaks \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY detected_date DESC, id DESC"
        );
        sqlx::query_as::<_, OutbreakRow>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Get a single outbreak by ID.
    pub async fn get_by_id(pool: &PgPool, id: DbId) -> Result<Option<OutbreakRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM outbreaks WHERE id = $1");
        sqlx::query_as::<_, OutbreakRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set the status of an outbreak, returning the updated row.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<OutbreakRow>, sqlx::Error> {
        let query = format!(
            "UPDATE outbreaks SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutbreakRow>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
