//! Database operations for `search_runs`.
//!
//! One row per search invocation. Rows are created in `running` status and
//! move exactly once to a terminal status: `succeeded`, `partial` (some
//! terms failed), `cancelled`, or `failed`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `search_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchRunRow {
    pub id: i64,
    pub public_id: Uuid,
    /// Display form of the requested scope, e.g. `category:Gaming`.
    pub scope: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: i64,
    pub failed_terms: i64,
    pub error_message: Option<String>,
}

const RUN_COLUMNS: &str = "id, public_id, scope, status, started_at, completed_at, \
                           records_processed, failed_terms, error_message";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Creates a new run in `running` status with `started_at = now`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_search_run(pool: &SqlitePool, scope: &str) -> Result<SearchRunRow, DbError> {
    let row = sqlx::query_as::<_, SearchRunRow>(&format!(
        "INSERT INTO search_runs (public_id, scope, status, started_at) \
         VALUES (?, ?, 'running', ?) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(scope)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

async fn finish_search_run(
    pool: &SqlitePool,
    id: i64,
    status: &'static str,
    records_processed: i64,
    failed_terms: i64,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE search_runs \
         SET status = ?, completed_at = ?, records_processed = ?, failed_terms = ?, \
             error_message = ? \
         WHERE id = ? AND status = 'running'",
    )
    .bind(status)
    .bind(Utc::now())
    .bind(records_processed)
    .bind(failed_terms)
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run finished: `succeeded` when no term failed, otherwise
/// `partial`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_search_run(
    pool: &SqlitePool,
    id: i64,
    records_processed: i64,
    failed_terms: i64,
) -> Result<(), DbError> {
    let status = if failed_terms == 0 {
        "succeeded"
    } else {
        "partial"
    };
    finish_search_run(pool, id, status, records_processed, failed_terms, None).await
}

/// Marks a run `cancelled`. Records appended before cancellation remain in
/// the catalog and are counted in `records_processed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn cancel_search_run(
    pool: &SqlitePool,
    id: i64,
    records_processed: i64,
    failed_terms: i64,
) -> Result<(), DbError> {
    finish_search_run(
        pool,
        id,
        "cancelled",
        records_processed,
        failed_terms,
        None,
    )
    .await
}

/// Marks a run `failed` with `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_search_run(
    pool: &SqlitePool,
    id: i64,
    records_processed: i64,
    error_message: &str,
) -> Result<(), DbError> {
    finish_search_run(
        pool,
        id,
        "failed",
        records_processed,
        0,
        Some(error_message),
    )
    .await
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_search_run(pool: &SqlitePool, id: i64) -> Result<SearchRunRow, DbError> {
    let row = sqlx::query_as::<_, SearchRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM search_runs WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_search_runs(pool: &SqlitePool, limit: u32) -> Result<Vec<SearchRunRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM search_runs ORDER BY started_at DESC, id DESC LIMIT ?"
    ))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
