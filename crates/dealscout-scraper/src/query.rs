//! Builds the search URL and browser-like headers for one term.

use dealscout_core::SortMode;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};

use crate::error::ScraperError;
use crate::marketplace::MarketplaceProfile;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN_US: &str = "en-US,en;q=0.5";

/// A fully-formed marketplace search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub url: String,
    pub headers: HeaderMap,
}

/// Builds the results-page request for `term` on `profile`.
///
/// The term is form-encoded, so spaces become `+`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidBaseUrl`] if the profile's base URL does
/// not parse, or [`ScraperError::InvalidHeader`] if `user_agent` contains
/// bytes not allowed in a header value.
pub fn build_search_request(
    profile: &MarketplaceProfile,
    term: &str,
    sort: SortMode,
    user_agent: &str,
) -> Result<SearchRequest, ScraperError> {
    let base = reqwest::Url::parse(&profile.base_url).map_err(|e| ScraperError::InvalidBaseUrl {
        base_url: profile.base_url.clone(),
        reason: e.to_string(),
    })?;
    if base.cannot_be_a_base() {
        return Err(ScraperError::InvalidBaseUrl {
            base_url: profile.base_url.clone(),
            reason: "URL cannot be a base".to_owned(),
        });
    }

    let mut url = base
        .join(profile.search_path)
        .map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: profile.base_url.clone(),
            reason: e.to_string(),
        })?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair(profile.term_param(), term.trim());
        for (key, value) in profile.sort_params(sort) {
            pairs.append_pair(key, value);
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent).map_err(|e| ScraperError::InvalidHeader {
            name: "User-Agent",
            reason: e.to_string(),
        })?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN_US));
    let referer = format!("{}/", base.origin().ascii_serialization());
    headers.insert(
        REFERER,
        HeaderValue::from_str(&referer).map_err(|e| ScraperError::InvalidHeader {
            name: "Referer",
            reason: e.to_string(),
        })?,
    );

    Ok(SearchRequest {
        url: url.to_string(),
        headers,
    })
}
