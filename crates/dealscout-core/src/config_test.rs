use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_on_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.database_url, "sqlite://dealscout.db");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.categories_path.to_str(),
        Some("./config/categories.yaml")
    );
    assert_eq!(cfg.db_max_connections, 5);
    assert_eq!(cfg.db_acquire_timeout_secs, 10);
    assert_eq!(cfg.scraper_request_timeout_secs, 10);
    assert_eq!(cfg.scraper_user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.scraper_max_retries, 2);
    assert_eq!(cfg.scraper_retry_backoff_base_secs, 4);
    assert_eq!(cfg.scraper_retry_backoff_max_secs, 10);
    assert_eq!(cfg.search_max_results, 5);
    assert_eq!(cfg.search_delay_min_ms, 2000);
    assert_eq!(cfg.search_delay_max_ms, 5000);
    assert_eq!(cfg.ebay_base_url, "https://www.ebay.com");
}

#[test]
fn build_app_config_reads_database_url() {
    let mut map = HashMap::new();
    map.insert("DATABASE_URL", "sqlite:///tmp/deals.db");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.database_url, "sqlite:///tmp/deals.db");
}

#[test]
fn debug_output_redacts_database_url() {
    let mut map = HashMap::new();
    map.insert("DATABASE_URL", "sqlite:///secret/location.db");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(rendered.contains("[redacted]"));
    assert!(!rendered.contains("secret/location"));
}

#[test]
fn unrelated_env_vars_do_not_affect_loading() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_ENV", "producton");
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
}

#[test]
fn scraper_max_retries_override() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_SCRAPER_MAX_RETRIES", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scraper_max_retries, 5);
}

#[test]
fn scraper_max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_SCRAPER_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCOUT_SCRAPER_MAX_RETRIES"),
        "expected InvalidEnvVar(DEALSCOUT_SCRAPER_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn scraper_request_timeout_secs_invalid() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_SCRAPER_REQUEST_TIMEOUT_SECS", "ten");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCOUT_SCRAPER_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(DEALSCOUT_SCRAPER_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn scraper_user_agent_override() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_SCRAPER_USER_AGENT", "custom-agent/2.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scraper_user_agent, "custom-agent/2.0");
}

#[test]
fn backoff_base_above_max_is_rejected() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_SCRAPER_RETRY_BACKOFF_BASE_SECS", "12");
    map.insert("DEALSCOUT_SCRAPER_RETRY_BACKOFF_MAX_SECS", "10");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("BACKOFF_BASE_SECS")),
        "expected Validation error, got: {result:?}"
    );
}

#[test]
fn search_delay_override() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_SEARCH_DELAY_MIN_MS", "0");
    map.insert("DEALSCOUT_SEARCH_DELAY_MAX_MS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search_delay_min_ms, 0);
    assert_eq!(cfg.search_delay_max_ms, 0);
}

#[test]
fn search_delay_min_above_max_is_rejected() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_SEARCH_DELAY_MIN_MS", "6000");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("DELAY_MIN_MS")),
        "expected Validation error, got: {result:?}"
    );
}

#[test]
fn db_max_connections_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_DB_MAX_CONNECTIONS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCOUT_DB_MAX_CONNECTIONS"),
        "expected InvalidEnvVar(DEALSCOUT_DB_MAX_CONNECTIONS), got: {result:?}"
    );
}

#[test]
fn ebay_base_url_override() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_EBAY_BASE_URL", "https://www.ebay.co.uk");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.ebay_base_url, "https://www.ebay.co.uk");
}
