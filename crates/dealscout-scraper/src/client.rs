//! HTTP client for marketplace search result pages.

use std::time::Duration;

use dealscout_core::{NormalizedListing, SortMode};
use reqwest::Client;

use crate::error::ScraperError;
use crate::extract::extract_listings;
use crate::marketplace::MarketplaceProfile;
use crate::normalize::normalize_listing;
use crate::query::{build_search_request, SearchRequest};
use crate::rate_limit::{retry_with_backoff, RetryPolicy};


/// Fetches marketplace result pages and turns them into normalized listings.
///
/// Transient failures (5xx, 408, 429, timeouts, connection errors) are
/// retried per the configured [`RetryPolicy`]. Any other non-2xx status is
/// returned as [`ScraperError::HttpStatus`] on the first attempt.
pub struct MarketplaceClient {
    client: Client,
    user_agent: String,
    retry: RetryPolicy,
}

impl MarketplaceClient {
    /// Creates a client with the given per-request timeout, `User-Agent`,
    /// and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::ClientBuild`] if the underlying
    /// `reqwest::Client` cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(ScraperError::ClientBuild)?;
        Ok(Self {
            client,
            user_agent: user_agent.to_owned(),
            retry,
        })
    }

    /// Fetches the body of `request`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::HttpStatus`] for a non-2xx status (after retries if
    ///   retriable).
    /// - [`ScraperError::Timeout`] / [`ScraperError::Network`] when the request
    ///   or body read fails after all retries.
    pub async fn fetch(&self, request: &SearchRequest) -> Result<String, ScraperError> {
        retry_with_backoff(self.retry, || async move {
            let response = self
                .client
                .get(&request.url)
                .headers(request.headers.clone())
                .send()
                .await
                .map_err(|e| ScraperError::from_reqwest(&request.url, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ScraperError::HttpStatus {
                    status: status.as_u16(),
                    url: request.url.clone(),
                });
            }

            response
                .text()
                .await
                .map_err(|e| ScraperError::from_reqwest(&request.url, e))
        })
        .await
    }

    /// Runs one search for `term` and returns up to `max_results` normalized
    /// listings in page order.
    ///
    /// Result blocks that fail normalization (no title, non-numeric price)
    /// are dropped and logged at debug level; they never fail the search.
    ///
    /// # Errors
    ///
    /// Returns the request-building or fetch error; see [`Self::fetch`].
    pub async fn search(
        &self,
        profile: &MarketplaceProfile,
        term: &str,
        sort: SortMode,
        max_results: usize,
    ) -> Result<Vec<NormalizedListing>, ScraperError> {
        let request = build_search_request(profile, term, sort, &self.user_agent)?;
        tracing::debug!(
            source = %profile.source,
            base_url = %profile.base_url,
            term,
            url = %request.url,
            "fetching search results"
        );

        let html = self.fetch(&request).await?;
        let raw = extract_listings(&html, profile.selectors, max_results);
        let extracted = raw.len();

        let listings: Vec<NormalizedListing> = raw
            .into_iter()
            .filter_map(|r| match normalize_listing(r, profile.source) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    tracing::debug!(source = %profile.source, term, error = %e, "dropping result block");
                    None
                }
            })
            .collect();

        tracing::debug!(
            source = %profile.source,
            term,
            extracted,
            kept = listings.len(),
            "search results normalized"
        );
        Ok(listings)
    }
}
