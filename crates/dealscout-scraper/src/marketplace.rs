//! Per-marketplace URL and selector configuration.

use dealscout_core::{SortMode, Source};

use crate::extract::{ListingSelectors, EBAY_SELECTORS};

/// Where and how to search one marketplace.
#[derive(Debug, Clone)]
pub struct MarketplaceProfile {
    pub source: Source,
    /// Scheme + host, e.g. `https://www.ebay.com`. Tests point this at a
    /// mock server.
    pub base_url: String,
    pub search_path: &'static str,
    pub selectors: &'static ListingSelectors,
}

impl MarketplaceProfile {
    #[must_use]
    pub fn ebay(base_url: impl Into<String>) -> Self {
        Self {
            source: Source::Ebay,
            base_url: base_url.into(),
            search_path: "/sch/i.html",
            selectors: &EBAY_SELECTORS,
        }
    }

    /// Profile for `source`, rooted at `base_url`.
    #[must_use]
    pub fn for_source(source: Source, base_url: impl Into<String>) -> Self {
        match source {
            Source::Ebay => Self::ebay(base_url),
        }
    }

    /// Marketplace query parameters (other than the search term) for `sort`.
    #[must_use]
    pub fn sort_params(&self, sort: SortMode) -> [(&'static str, &'static str); 2] {
        match self.source {
            Source::Ebay => {
                let sop = match sort {
                    SortMode::PriceAscending => "15",
                    SortMode::Newest => "10",
                    SortMode::Relevance => "12",
                };
                [("_sacat", "0"), ("_sop", sop)]
            }
        }
    }

    /// Query parameter that carries the search term.
    #[must_use]
    pub fn term_param(&self) -> &'static str {
        match self.source {
            Source::Ebay => "_nkw",
        }
    }
}
