//! Repository for the `disease_cases` table.

use chrono::NaiveDate;
use epiwatch_core::case::PreparedCase;
use sqlx::PgPool;

use crate::models::case::CaseRow;

/// Column list for `disease_cases` queries.
const COLUMNS: &str = "\
    id, disease_name, disease_category, location, onset_date, report_date, \
    status, patient_age, patient_gender, symptoms, latitude, longitude, \
    notes, created_at";

/// Column list for INSERT (excludes auto-generated columns).
const INSERT_COLUMNS: &str = "\
    disease_name, disease_category, location, onset_date, report_date, \
    status, patient_age, patient_gender, symptoms, latitude, longitude, notes";

/// Provides query operations for case records.
pub struct CaseRepo;

impl CaseRepo {
    /// All cases with onset on or after `onset_from`, most recent onset first.
    pub async fn list_since(pool: &PgPool, onset_from: NaiveDate) -> Result<Vec<CaseRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM disease_cases \
             WHERE onset_date >= $1 \
             ORDER BY onset_date DESC, id DESC"
        );
        sqlx::query_as::<_, CaseRow>(&query)
            .bind(onset_from)
            .fetch_all(pool)
            .await
    }

    /// Insert a batch of cases in a single transaction.
    pub async fn create_many(pool: &PgPool, cases: &[PreparedCase]) -> Result<Vec<CaseRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO disease_cases ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut rows = Vec::with_capacity(cases.len());
        for case in cases {
            let row = sqlx::query_as::<_, CaseRow>(&query)
                .bind(&case.disease_name)
                .bind(&case.disease_category)
                .bind(&case.location)
                .bind(case.onset_date)
                .bind(case.report_date)
                .bind(case.status.as_str())
                .bind(case.patient_age)
                .bind(&case.patient_gender)
                .bind(&case.symptoms)
                .bind(case.latitude)
                .bind(case.longitude)
                .bind(&case.notes)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    /// List cases, newest report first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
    ) -> Result<Vec<CaseRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM disease_cases \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY report_date DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, CaseRow>(&query)
            .bind(status)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count cases grouped by status.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT status, COUNT(*) FROM disease_cases \
             GROUP BY status",
        )
        .fetch_all(pool)
        .await
    }
}
