//! `search` command: argument parsing, progress output, and Ctrl-C handling
//! around the [`SearchOrchestrator`].

mod runner;
mod term;

use runner::{
    RunRequest, RunState, SearchOrchestrator, SearchProgress, SearchReport, SearchSettings,
    TermStatus,
};

use clap::Args;
use dealscout_core::{ListingRecord, PriceRange, SearchScope, SortMode, Source};
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Exactly one of `--term`, `--category`, or `--all`.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ScopeArgs {
    /// Search a single ad-hoc term (tagged as category "Custom")
    #[arg(long)]
    pub term: Option<String>,

    /// Search every term of a configured category
    #[arg(long)]
    pub category: Option<String>,

    /// Search every configured term
    #[arg(long)]
    pub all: bool,
}

impl ScopeArgs {
    fn to_scope(&self) -> SearchScope {
        if self.all {
            return SearchScope::All;
        }
        match (&self.term, &self.category) {
            (Some(term), _) => SearchScope::Term(term.clone()),
            (None, Some(category)) => SearchScope::Category(category.clone()),
            (None, None) => SearchScope::All,
        }
    }
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Result ordering: price, newest, or relevance
    #[arg(long, default_value = "price")]
    pub sort: SortMode,

    /// Drop listings cheaper than this
    #[arg(long)]
    pub min_price: Option<Decimal>,

    /// Drop listings more expensive than this
    #[arg(long)]
    pub max_price: Option<Decimal>,

    /// Marketplace to query; repeatable. Defaults to all.
    #[arg(long = "source")]
    pub sources: Vec<Source>,
}

impl SearchArgs {
    /// Converts parsed arguments into a [`RunRequest`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--min-price` exceeds `--max-price`.
    pub(crate) fn to_request(&self) -> anyhow::Result<RunRequest> {
        let price_range = PriceRange::new(self.min_price, self.max_price)?;
        Ok(RunRequest {
            scope: self.scope.to_scope(),
            sort: self.sort,
            price_range,
            sources: self.sources.clone(),
        })
    }
}

pub(crate) fn build_client(
    config: &dealscout_core::AppConfig,
) -> anyhow::Result<dealscout_scraper::MarketplaceClient> {
    let retry = dealscout_scraper::RetryPolicy {
        max_retries: config.scraper_max_retries,
        backoff_base_secs: config.scraper_retry_backoff_base_secs,
        backoff_max_secs: config.scraper_retry_backoff_max_secs,
    };
    dealscout_scraper::MarketplaceClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        retry,
    )
    .map_err(|e| anyhow::anyhow!("failed to build marketplace client: {e}"))
}

/// Runs the `search` command to completion, printing progress and a result
/// table. Ctrl-C cancels between terms.
///
/// # Errors
///
/// Returns an error if the categories file cannot be loaded, the request is
/// invalid, or the run fails fatally.
pub(crate) async fn run_search(
    pool: &sqlx::SqlitePool,
    config: &dealscout_core::AppConfig,
    args: &SearchArgs,
) -> anyhow::Result<()> {
    let request = args.to_request()?;
    let categories = dealscout_core::load_categories(&config.categories_path)?;
    let orchestrator = SearchOrchestrator::new(
        pool.clone(),
        build_client(config)?,
        categories,
        SearchSettings::from_app_config(config),
    );

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received ctrl-c; cancelling after the current term");
            ctrl_c_token.cancel();
        }
    });

    let (tx, mut rx) = mpsc::unbounded_channel::<SearchProgress>();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("{}", format_progress(&event));
        }
    });

    let result = orchestrator.run(&request, &tx, &cancel).await;
    drop(tx);
    let _ = printer.await;
    ctrl_c.abort();

    if orchestrator.state() == RunState::Failed {
        tracing::error!("search stopped after a store failure; see `dealscout runs`");
    }
    let report = result?;
    print_report(&report, config.search_max_results);
    Ok(())
}

fn format_progress(event: &SearchProgress) -> String {
    match &event.status {
        TermStatus::Searching => format!("[{}] searching \"{}\"...", event.category, event.term),
        TermStatus::Completed { records } => format!(
            "[{}] \"{}\": {records} listing(s)",
            event.category, event.term
        ),
        TermStatus::Failed { error } => {
            format!("[{}] \"{}\": failed ({error})", event.category, event.term)
        }
    }
}

/// Groups price-sorted `records` by category in first-seen order, keeping
/// the cheapest `per_category` of each.
fn top_by_category(
    records: &[ListingRecord],
    per_category: usize,
) -> Vec<(&str, Vec<&ListingRecord>)> {
    let mut groups: Vec<(&str, Vec<&ListingRecord>)> = Vec::new();
    for record in records {
        let idx = match groups.iter().position(|(name, _)| *name == record.category) {
            Some(idx) => idx,
            None => {
                groups.push((record.category.as_str(), Vec::new()));
                groups.len() - 1
            }
        };
        let group = &mut groups[idx].1;
        if group.len() < per_category {
            group.push(record);
        }
    }
    groups
}

fn print_row(record: &ListingRecord) {
    println!(
        "{:<10} {:<60} {:<14} {:<12} {:<6}",
        format!("${}", record.price),
        truncate(&record.title, 60),
        truncate(&record.condition, 14),
        truncate(&record.category, 12),
        record.source
    );
}

fn print_report(report: &SearchReport, per_category: usize) {
    if report.records.is_empty() {
        println!("no listings found");
    } else {
        println!();
        println!(
            "{:<10} {:<60} {:<14} {:<12} {:<6}",
            "price", "title", "condition", "category", "source"
        );
        for record in &report.records {
            print_row(record);
        }

        for (category, top) in top_by_category(&report.records, per_category) {
            println!();
            println!("top {} in {category}:", top.len());
            for record in top {
                print_row(record);
            }
        }
    }

    println!();
    println!(
        "run {}: {} listing(s) from {} term(s)",
        report.run_id,
        report.records.len(),
        report.terms_searched
    );
    for failed in &report.failed_terms {
        println!(
            "  failed: [{}] \"{}\" on {}: {}",
            failed.category, failed.term, failed.source, failed.error
        );
    }
    if report.cancelled {
        println!("search cancelled; listings found so far were saved");
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
