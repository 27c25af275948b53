use crate::app_config::AppConfig;
use crate::ConfigError;

/// Desktop Chrome user agent; the marketplace serves a degraded page to
/// unrecognized clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Tests and callers
/// that manage env setup themselves use it.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so tests drive it with a pure `HashMap` lookup instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = or_default("DATABASE_URL", "sqlite://dealscout.db");
    let log_level = or_default("DEALSCOUT_LOG_LEVEL", "info");
    let categories_path = PathBuf::from(or_default(
        "DEALSCOUT_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));

    let db_max_connections = parse_u32("DEALSCOUT_DB_MAX_CONNECTIONS", "5")?;
    if db_max_connections == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DEALSCOUT_DB_MAX_CONNECTIONS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let db_acquire_timeout_secs = parse_u64("DEALSCOUT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("DEALSCOUT_SCRAPER_REQUEST_TIMEOUT_SECS", "10")?;
    let scraper_user_agent = or_default("DEALSCOUT_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_max_retries = parse_u32("DEALSCOUT_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("DEALSCOUT_SCRAPER_RETRY_BACKOFF_BASE_SECS", "4")?;
    let scraper_retry_backoff_max_secs =
        parse_u64("DEALSCOUT_SCRAPER_RETRY_BACKOFF_MAX_SECS", "10")?;
    if scraper_retry_backoff_base_secs > scraper_retry_backoff_max_secs {
        return Err(ConfigError::Validation(format!(
            "DEALSCOUT_SCRAPER_RETRY_BACKOFF_BASE_SECS ({scraper_retry_backoff_base_secs}) \
             exceeds DEALSCOUT_SCRAPER_RETRY_BACKOFF_MAX_SECS ({scraper_retry_backoff_max_secs})"
        )));
    }

    let search_max_results = parse_usize("DEALSCOUT_SEARCH_MAX_RESULTS", "5")?;
    let search_delay_min_ms = parse_u64("DEALSCOUT_SEARCH_DELAY_MIN_MS", "2000")?;
    let search_delay_max_ms = parse_u64("DEALSCOUT_SEARCH_DELAY_MAX_MS", "5000")?;
    if search_delay_min_ms > search_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "DEALSCOUT_SEARCH_DELAY_MIN_MS ({search_delay_min_ms}) exceeds \
             DEALSCOUT_SEARCH_DELAY_MAX_MS ({search_delay_max_ms})"
        )));
    }

    let ebay_base_url = or_default("DEALSCOUT_EBAY_BASE_URL", "https://www.ebay.com");

    Ok(AppConfig {
        database_url,
        log_level,
        categories_path,
        db_max_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_retry_backoff_max_secs,
        search_max_results,
        search_delay_min_ms,
        search_delay_max_ms,
        ebay_base_url,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
