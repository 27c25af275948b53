mod export;
mod favorites;
mod search;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::favorites::FavoritesCommands;
use crate::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "dealscout")]
#[command(about = "Search marketplaces for deals and keep a local catalog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the marketplace and append results to the catalog
    Search(SearchArgs),
    /// Manage saved favorites
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommands,
    },
    /// Export the full catalog to a CSV file
    Export {
        /// Destination file
        path: PathBuf,
    },
    /// Print the link of a catalog item
    Open {
        item_id: i64,
    },
    /// List configured search categories and their terms
    Categories,
    /// Show recent search runs
    Runs {
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32))]
        limit: u32,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database is reachable
    Ping,
    /// Delete catalog rows older than the given age (favorites are kept)
    Prune {
        #[arg(long)]
        older_than_days: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = dealscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if matches!(command, Commands::Categories) {
        return print_categories(&config);
    }

    let pool_config = dealscout_db::PoolConfig::from_app_config(&config);
    let pool = dealscout_db::connect_pool(&config.database_url, pool_config).await?;

    let explicit_migrate = matches!(
        command,
        Commands::Db {
            command: DbCommands::Migrate
        }
    );
    if !explicit_migrate {
        dealscout_db::run_migrations(&pool).await?;
    }

    match command {
        Commands::Search(args) => search::run_search(&pool, &config, &args).await?,
        Commands::Favorites { command } => favorites::run_favorites(&pool, &command).await?,
        Commands::Export { path } => export::run_export(&pool, &path).await?,
        Commands::Open { item_id } => favorites::run_open(&pool, item_id).await?,
        Commands::Runs { limit } => print_runs(&pool, limit).await?,
        Commands::Db { command } => run_db(&pool, command).await?,
        Commands::Categories => {}
    }

    Ok(())
}

fn print_categories(config: &dealscout_core::AppConfig) -> anyhow::Result<()> {
    let file = dealscout_core::load_categories(&config.categories_path)?;
    for category in &file.categories {
        println!("{}", category.name);
        for term in &category.terms {
            println!("  - {term}");
        }
    }
    Ok(())
}

async fn print_runs(pool: &sqlx::SqlitePool, limit: u32) -> anyhow::Result<()> {
    let runs = dealscout_db::list_search_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no search runs recorded");
    }
    for run in &runs {
        println!(
            "#{:<4} {:<10} {:<28} records={:<4} failed_terms={:<3} started={}",
            run.id,
            run.status,
            run.scope,
            run.records_processed,
            run.failed_terms,
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
        );
        if let Some(message) = &run.error_message {
            println!("      error: {message}");
        }
    }
    Ok(())
}

async fn run_db(pool: &sqlx::SqlitePool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Migrate => {
            let applied = dealscout_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Ping => {
            dealscout_db::health_check(pool).await?;
            println!("database ok");
        }
        DbCommands::Prune { older_than_days } => {
            let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(older_than_days));
            let deleted = dealscout_db::prune_items_before(pool, cutoff).await?;
            tracing::info!(deleted, %cutoff, "catalog pruned");
            println!("deleted {deleted} catalog row(s) older than {older_than_days} day(s)");
        }
    }
    Ok(())
}
