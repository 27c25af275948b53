use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub categories_path: PathBuf,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub scraper_retry_backoff_max_secs: u64,
    pub search_max_results: usize,
    pub search_delay_min_ms: u64,
    pub search_delay_max_ms: u64,
    /// Origin used for eBay search requests. Overridable so tests and
    /// regional mirrors (`ebay.co.uk`) can be targeted.
    pub ebay_base_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("categories_path", &self.categories_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field(
                "scraper_retry_backoff_max_secs",
                &self.scraper_retry_backoff_max_secs,
            )
            .field("search_max_results", &self.search_max_results)
            .field("search_delay_min_ms", &self.search_delay_min_ms)
            .field("search_delay_max_ms", &self.search_delay_max_ms)
            .field("ebay_base_url", &self.ebay_base_url)
            .finish()
    }
}
