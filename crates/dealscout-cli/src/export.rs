//! CSV export of the full catalog.

use std::path::Path;

use dealscout_db::DbError;

const HEADER: [&str; 10] = [
    "id",
    "title",
    "price",
    "condition",
    "link",
    "source",
    "category",
    "search_term",
    "timestamp",
    "description",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The catalog holds no rows; no file was created.
    Empty,
    Written { rows: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to read catalog: {0}")]
    Db(#[from] DbError),

    #[error("failed to write {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Writes every catalog row to `path` as CSV, in insertion order.
///
/// # Errors
///
/// Returns [`ExportError::Db`] if the catalog cannot be read, or
/// [`ExportError::Csv`] if the file cannot be created or written.
pub async fn export_catalog(
    pool: &sqlx::SqlitePool,
    path: &Path,
) -> Result<ExportOutcome, ExportError> {
    let rows = dealscout_db::snapshot_catalog(pool).await?;
    if rows.is_empty() {
        return Ok(ExportOutcome::Empty);
    }

    let csv_err = |source: csv::Error| ExportError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(HEADER).map_err(csv_err)?;
    for row in &rows {
        writer
            .write_record([
                row.id.to_string(),
                row.title.clone(),
                row.price.to_string(),
                row.condition.clone(),
                row.link.clone().unwrap_or_default(),
                row.source.label().to_string(),
                row.category.clone(),
                row.search_term.clone(),
                row.timestamp.to_rfc3339(),
                row.description.clone(),
            ])
            .map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| csv_err(csv::Error::from(e)))?;

    tracing::info!(path = %path.display(), rows = rows.len(), "catalog exported");
    Ok(ExportOutcome::Written { rows: rows.len() })
}

/// Handler for `dealscout export <PATH>`.
pub(crate) async fn run_export(pool: &sqlx::SqlitePool, path: &Path) -> anyhow::Result<()> {
    match export_catalog(pool, path).await? {
        ExportOutcome::Empty => println!("catalog is empty; nothing exported"),
        ExportOutcome::Written { rows } => {
            println!("exported {rows} listing(s) to {}", path.display());
        }
    }
    Ok(())
}
