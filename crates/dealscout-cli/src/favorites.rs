//! `favorites` and `open` command handlers.

use clap::Subcommand;
use dealscout_db::{DbError, PromoteOutcome};

#[derive(Debug, Subcommand)]
pub enum FavoritesCommands {
    /// Save a catalog listing (by item id) to favorites
    Add {
        /// Catalog item id, as shown by `export`
        item_id: i64,
    },
    /// List saved favorites
    List,
}

/// Promotes catalog item `item_id` to favorites.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown id, [`DbError::MissingLink`]
/// if the listing has no link, or [`DbError::Sqlx`] on I/O failure.
pub async fn add_favorite(
    pool: &sqlx::SqlitePool,
    item_id: i64,
) -> Result<PromoteOutcome, DbError> {
    let item = dealscout_db::get_item(pool, item_id).await?;
    let outcome = dealscout_db::promote_favorite(pool, &item.to_record().to_favorite()).await?;
    tracing::debug!(item_id, ?outcome, "favorite promotion");
    Ok(outcome)
}

pub(crate) async fn run_favorites(
    pool: &sqlx::SqlitePool,
    command: &FavoritesCommands,
) -> anyhow::Result<()> {
    match command {
        FavoritesCommands::Add { item_id } => match add_favorite(pool, *item_id).await {
            Ok(PromoteOutcome::Added(id)) => println!("added to favorites (favorite #{id})"),
            Ok(PromoteOutcome::AlreadyFavorited) => println!("already in favorites"),
            Err(DbError::NotFound) => anyhow::bail!("no catalog item with id {item_id}"),
            Err(e) => return Err(e.into()),
        },
        FavoritesCommands::List => {
            let favorites = dealscout_db::list_favorites(pool).await?;
            if favorites.is_empty() {
                println!("no favorites yet");
            }
            for fav in &favorites {
                println!(
                    "#{:<4} ${:<10} {} [{}] {}",
                    fav.id, fav.price, fav.title, fav.category, fav.link
                );
            }
        }
    }
    Ok(())
}

/// Returns the link of catalog item `item_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown id or [`DbError::MissingLink`]
/// when the listing was stored without one.
pub async fn item_link(pool: &sqlx::SqlitePool, item_id: i64) -> Result<String, DbError> {
    dealscout_db::get_item(pool, item_id)
        .await?
        .link
        .ok_or(DbError::MissingLink)
}

pub(crate) async fn run_open(pool: &sqlx::SqlitePool, item_id: i64) -> anyhow::Result<()> {
    let link = item_link(pool, item_id).await?;
    println!("{link}");
    Ok(())
}
