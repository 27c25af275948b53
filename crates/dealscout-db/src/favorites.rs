//! Database operations for the `favorites` table.
//!
//! Promotion is a single `INSERT .. ON CONFLICT (link) DO NOTHING` against
//! the unique index on `link`, so two concurrent promotions of one listing
//! produce exactly one row.

use chrono::{DateTime, Utc};
use dealscout_core::{FavoriteRecord, Source};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::{parse_stored_price, parse_stored_source, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `favorites` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRow {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    pub condition: String,
    pub link: String,
    pub source: Source,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

#[derive(sqlx::FromRow)]
struct StoredFavorite {
    id: i64,
    title: String,
    price: String,
    condition: String,
    link: String,
    source: String,
    category: String,
    timestamp: DateTime<Utc>,
    description: String,
}

impl StoredFavorite {
    fn into_row(self) -> Result<FavoriteRow, DbError> {
        Ok(FavoriteRow {
            id: self.id,
            price: parse_stored_price(&self.price)?,
            source: parse_stored_source(&self.source)?,
            title: self.title,
            condition: self.condition,
            link: self.link,
            category: self.category,
            timestamp: self.timestamp,
            description: self.description,
        })
    }
}

/// Result of [`promote_favorite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoteOutcome {
    /// A new favorites row was written with this id.
    Added(i64),
    /// A favorite with the same link already exists; nothing was written.
    AlreadyFavorited,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Copies `record` into favorites unless its link is already favorited.
///
/// # Errors
///
/// Returns [`DbError::MissingLink`] if the record has no link, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn promote_favorite(
    pool: &SqlitePool,
    record: &FavoriteRecord,
) -> Result<PromoteOutcome, DbError> {
    let link = record
        .link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or(DbError::MissingLink)?;

    let result = sqlx::query(
        "INSERT INTO favorites \
         (title, price, condition, link, source, category, timestamp, description) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (link) DO NOTHING",
    )
    .bind(&record.title)
    .bind(record.price.to_string())
    .bind(&record.condition)
    .bind(link)
    .bind(record.source.label())
    .bind(&record.category)
    .bind(record.discovered_at)
    .bind(&record.description)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        Ok(PromoteOutcome::AlreadyFavorited)
    } else {
        Ok(PromoteOutcome::Added(result.last_insert_rowid()))
    }
}

/// Returns every favorite in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or
/// [`DbError::InvalidStoredValue`] for a corrupt row.
pub async fn list_favorites(pool: &SqlitePool) -> Result<Vec<FavoriteRow>, DbError> {
    let rows = sqlx::query_as::<_, StoredFavorite>(
        "SELECT id, title, price, condition, link, source, category, timestamp, description \
         FROM favorites ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(StoredFavorite::into_row).collect()
}

/// Number of rows in the favorites table.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_favorites(pool: &SqlitePool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM favorites")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
