//! Run-level orchestration: scope resolution, single-run guard, inter-term
//! delay, cancellation, and `search_runs` bookkeeping.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use dealscout_core::{
    CategoriesFile, CoreError, ListingRecord, PriceRange, SearchScope, SortMode, Source,
};
use dealscout_db::DbError;
use dealscout_scraper::MarketplaceClient;
use rand::Rng;
use sqlx::SqlitePool;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::term::{search_term, TermOutcome};

/// Tunables for one orchestrator, taken from `AppConfig`.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub max_results: usize,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub ebay_base_url: String,
}

impl SearchSettings {
    #[must_use]
    pub fn from_app_config(config: &dealscout_core::AppConfig) -> Self {
        Self {
            max_results: config.search_max_results,
            delay_min_ms: config.search_delay_min_ms,
            delay_max_ms: config.search_delay_max_ms,
            ebay_base_url: config.ebay_base_url.clone(),
        }
    }
}

/// What to search and how to filter it.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub scope: SearchScope,
    pub sort: SortMode,
    pub price_range: PriceRange,
    /// Marketplaces to query. Empty means every known source.
    pub sources: Vec<Source>,
}

impl RunRequest {
    pub(super) fn sources(&self) -> &[Source] {
        if self.sources.is_empty() {
            Source::ALL
        } else {
            &self.sources
        }
    }
}

/// Per-term progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchProgress {
    pub category: String,
    pub term: String,
    pub status: TermStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermStatus {
    Searching,
    Completed { records: usize },
    Failed { error: String },
}

/// A term (or one source of a term) whose fetch failed after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTerm {
    pub category: String,
    pub term: String,
    pub source: Source,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub run_id: i64,
    /// Every record appended during the run, sorted ascending by price.
    pub records: Vec<ListingRecord>,
    pub terms_searched: usize,
    pub failed_terms: Vec<FailedTerm>,
    pub cancelled: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("a search is already running")]
    AlreadyRunning,

    #[error("invalid search scope: {0}")]
    Scope(#[from] CoreError),

    #[error("failed to record search run: {0}")]
    RunLog(#[source] DbError),

    #[error("store failure during {stage} for term \"{term}\": {source}")]
    Store {
        term: String,
        stage: &'static str,
        #[source]
        source: DbError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// The previous run hit a fatal store error. A new run may start.
    Failed,
}

/// Drives searches for one catalog. At most one run is active at a time.
pub struct SearchOrchestrator {
    pub(super) pool: SqlitePool,
    client: MarketplaceClient,
    categories: CategoriesFile,
    settings: SearchSettings,
    state: Mutex<RunState>,
}

/// Resets the orchestrator to `Idle` (or `Failed`) when the run ends, even if
/// the run future is dropped mid-flight.
struct RunGuard<'a> {
    state: &'a Mutex<RunState>,
    failed: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = if self.failed {
            RunState::Failed
        } else {
            RunState::Idle
        };
    }
}

impl SearchOrchestrator {
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        client: MarketplaceClient,
        categories: CategoriesFile,
        settings: SearchSettings,
    ) -> Self {
        Self {
            pool,
            client,
            categories,
            settings,
            state: Mutex::new(RunState::Idle),
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<RunGuard<'_>, SearchError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == RunState::Running {
            return Err(SearchError::AlreadyRunning);
        }
        *state = RunState::Running;
        Ok(RunGuard {
            state: &self.state,
            failed: false,
        })
    }

    /// Runs every term in `request.scope` sequentially.
    ///
    /// Fetch failures are isolated to their term and listed in
    /// [`SearchReport::failed_terms`]. Cancellation is checked before each
    /// term and during the inter-term delay; records appended before it stay
    /// in the catalog.
    ///
    /// # Errors
    ///
    /// - [`SearchError::AlreadyRunning`] if another run is in progress.
    /// - [`SearchError::Scope`] if the scope names an unknown category or an
    ///   empty term.
    /// - [`SearchError::RunLog`] if the run row cannot be created.
    /// - [`SearchError::Store`] if appending a term's records fails.
    pub async fn run(
        &self,
        request: &RunRequest,
        progress: &UnboundedSender<SearchProgress>,
        cancel: &CancellationToken,
    ) -> Result<SearchReport, SearchError> {
        let mut guard = self.begin()?;

        let terms = self.categories.resolve(&request.scope)?;
        let run = match dealscout_db::create_search_run(&self.pool, &request.scope.to_string())
            .await
        {
            Ok(run) => run,
            Err(e) => {
                guard.failed = true;
                return Err(SearchError::RunLog(e));
            }
        };

        tracing::info!(
            run_id = run.id,
            scope = %request.scope,
            terms = terms.len(),
            sort = %request.sort,
            "search run started"
        );

        let mut records: Vec<ListingRecord> = Vec::new();
        let mut failed_terms: Vec<FailedTerm> = Vec::new();
        let mut terms_searched = 0usize;
        let mut cancelled = false;

        for (idx, term) in terms.iter().enumerate() {
            if idx > 0 {
                let delay = inter_term_delay(self.settings.delay_min_ms, self.settings.delay_max_ms);
                tokio::select! {
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(delay) => {}
                }
            }
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let _ = progress.send(SearchProgress {
                category: term.category.clone(),
                term: term.term.clone(),
                status: TermStatus::Searching,
            });

            let outcome = search_term(
                &self.pool,
                &self.client,
                &self.settings,
                request,
                term,
            )
            .await;

            let TermOutcome {
                records: term_records,
                failures,
            } = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    guard.failed = true;
                    let message = err.to_string();
                    fail_run_best_effort(&self.pool, run.id, count(records.len()), message).await;
                    return Err(err);
                }
            };

            terms_searched += 1;
            let status = if let Some(first) = failures.first() {
                TermStatus::Failed {
                    error: first.error.clone(),
                }
            } else {
                TermStatus::Completed {
                    records: term_records.len(),
                }
            };
            let _ = progress.send(SearchProgress {
                category: term.category.clone(),
                term: term.term.clone(),
                status,
            });

            records.extend(term_records);
            failed_terms.extend(failures);
        }

        let records_processed = count(records.len());
        let failed_count = count(failed_terms.len());
        let finish = if cancelled {
            dealscout_db::cancel_search_run(&self.pool, run.id, records_processed, failed_count)
                .await
        } else {
            dealscout_db::complete_search_run(&self.pool, run.id, records_processed, failed_count)
                .await
        };
        if let Err(e) = finish {
            tracing::error!(run_id = run.id, error = %e, "failed to finalize search run");
        }

        if !failed_terms.is_empty() {
            tracing::warn!(
                run_id = run.id,
                failed = failed_terms.len(),
                total_terms = terms.len(),
                "some terms failed during search"
            );
        }
        tracing::info!(
            run_id = run.id,
            records = records.len(),
            terms_searched,
            cancelled,
            "search run finished"
        );

        records.sort_by(|a, b| a.price.cmp(&b.price));

        Ok(SearchReport {
            run_id: run.id,
            records,
            terms_searched,
            failed_terms,
            cancelled,
        })
    }
}

/// Uniformly random delay in `[min_ms, max_ms]`.
fn inter_term_delay(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

async fn fail_run_best_effort(pool: &SqlitePool, run_id: i64, records: i64, message: String) {
    if let Err(mark_err) = dealscout_db::fail_search_run(pool, run_id, records, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark search run as failed"
        );
    }
}
