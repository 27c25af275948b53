//! Database operations for the append-only `items` catalog.

use chrono::{DateTime, Utc};
use dealscout_core::{ListingRecord, Source};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::{parse_stored_price, parse_stored_source, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `items` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    pub condition: String,
    pub link: Option<String>,
    pub source: Source,
    pub category: String,
    pub search_term: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl ItemRow {
    /// The listing this row was written from.
    #[must_use]
    pub fn to_record(&self) -> ListingRecord {
        ListingRecord {
            title: self.title.clone(),
            price: self.price,
            condition: self.condition.clone(),
            link: self.link.clone(),
            source: self.source,
            category: self.category.clone(),
            search_term: self.search_term.clone(),
            discovered_at: self.timestamp,
            description: self.description.clone(),
        }
    }
}

/// `items` as stored: price and source are TEXT.
#[derive(sqlx::FromRow)]
struct StoredItem {
    id: i64,
    title: String,
    price: String,
    condition: String,
    link: Option<String>,
    source: String,
    category: String,
    search_term: String,
    timestamp: DateTime<Utc>,
    description: String,
}

impl StoredItem {
    fn into_row(self) -> Result<ItemRow, DbError> {
        Ok(ItemRow {
            id: self.id,
            price: parse_stored_price(&self.price)?,
            source: parse_stored_source(&self.source)?,
            title: self.title,
            condition: self.condition,
            link: self.link,
            category: self.category,
            search_term: self.search_term,
            timestamp: self.timestamp,
            description: self.description,
        })
    }
}

const ITEM_COLUMNS: &str =
    "id, title, price, condition, link, source, category, search_term, timestamp, description";

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Appends `records` to the catalog inside a single transaction.
///
/// Callers pass the records of one search term at a time; either every
/// record of the batch lands or none does. Returns the number of rows
/// inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails; the
/// transaction is rolled back.
pub async fn append_items(pool: &SqlitePool, records: &[ListingRecord]) -> Result<u64, DbError> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for record in records {
        let result = sqlx::query(
            "INSERT INTO items \
             (title, price, condition, link, source, category, search_term, timestamp, description) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.title)
        .bind(record.price.to_string())
        .bind(&record.condition)
        .bind(record.link.as_deref())
        .bind(record.source.label())
        .bind(&record.category)
        .bind(&record.search_term)
        .bind(record.discovered_at)
        .bind(&record.description)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Deletes catalog rows discovered strictly before `cutoff`.
///
/// Favorites are independent copies and are never touched. Returns the
/// number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn prune_items_before(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM items WHERE timestamp < ?")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns the full catalog ordered by insertion (surrogate id).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or
/// [`DbError::InvalidStoredValue`] if a row holds an unparseable price or
/// source.
pub async fn snapshot_catalog(pool: &SqlitePool) -> Result<Vec<ItemRow>, DbError> {
    let rows = sqlx::query_as::<_, StoredItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(StoredItem::into_row).collect()
}

/// Fetches one catalog row by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_item(pool: &SqlitePool, id: i64) -> Result<ItemRow, DbError> {
    let row = sqlx::query_as::<_, StoredItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_row()
}

/// Number of rows in the catalog.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_items(pool: &SqlitePool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
