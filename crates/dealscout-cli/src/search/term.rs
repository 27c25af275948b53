//! Per-term pipeline: fetch → extract → normalize → filter → tag → append.

use chrono::Utc;
use dealscout_core::{ListingRecord, SearchTerm};
use dealscout_scraper::{MarketplaceClient, MarketplaceProfile};
use sqlx::SqlitePool;

use super::runner::{FailedTerm, RunRequest, SearchError, SearchSettings};

pub(super) struct TermOutcome {
    pub records: Vec<ListingRecord>,
    pub failures: Vec<FailedTerm>,
}

/// Searches one term across every requested source and appends the
/// surviving records.
///
/// Records of one source are appended in a single transaction. A fetch
/// failure for one source is logged and reported in
/// [`TermOutcome::failures`]; the remaining sources still run.
///
/// # Errors
///
/// Returns [`SearchError::Store`] if appending to the catalog fails.
pub(super) async fn search_term(
    pool: &SqlitePool,
    client: &MarketplaceClient,
    settings: &SearchSettings,
    request: &RunRequest,
    term: &SearchTerm,
) -> Result<TermOutcome, SearchError> {
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for &source in request.sources() {
        let profile = MarketplaceProfile::for_source(source, settings.ebay_base_url.as_str());

        let listings = match client
            .search(&profile, &term.term, request.sort, settings.max_results)
            .await
        {
            Ok(listings) => listings,
            Err(e) => {
                tracing::warn!(
                    category = %term.category,
                    term = %term.term,
                    source = %source,
                    error = %e,
                    "search failed for term; continuing with next"
                );
                failures.push(FailedTerm {
                    category: term.category.clone(),
                    term: term.term.clone(),
                    source,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let fetched = listings.len();
        let discovered_at = Utc::now();
        let tagged: Vec<ListingRecord> = request
            .price_range
            .apply(listings)
            .into_iter()
            .map(|listing| listing.tag(&term.category, &term.term, discovered_at))
            .collect();

        dealscout_db::append_items(pool, &tagged)
            .await
            .map_err(|err| SearchError::Store {
                term: term.term.clone(),
                stage: "append_items",
                source: err,
            })?;

        tracing::info!(
            category = %term.category,
            term = %term.term,
            source = %source,
            fetched,
            kept = tagged.len(),
            "term searched"
        );
        records.extend(tagged);
    }

    Ok(TermOutcome { records, failures })
}
