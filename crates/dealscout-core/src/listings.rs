//! Listing records as they move through the discovery pipeline.
//!
//! A [`NormalizedListing`] is what the scraper produces from one search
//! result block. The search orchestrator tags it with provenance (category,
//! search term, discovery time) to form a [`ListingRecord`], which is written
//! once to the catalog and never mutated. A [`FavoriteRecord`] is a copy of a
//! listing promoted by explicit user action.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::CoreError;

/// Condition text used when the result block carries no condition label.
pub const DEFAULT_CONDITION: &str = "unknown";

/// Description text used when the result block carries no subtitle.
pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// Marketplace that yielded a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Ebay,
}

impl Source {
    /// Every marketplace the scraper knows how to query.
    pub const ALL: &'static [Source] = &[Source::Ebay];

    /// Human-facing label, also the value persisted in the `source` column.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Source::Ebay => "eBay",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Source {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ebay") {
            Ok(Source::Ebay)
        } else {
            Err(CoreError::UnknownSource(s.to_string()))
        }
    }
}

/// Result ordering requested from the marketplace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    PriceAscending,
    Newest,
    Relevance,
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::PriceAscending => write!(f, "price"),
            SortMode::Newest => write!(f, "newest"),
            SortMode::Relevance => write!(f, "relevance"),
        }
    }
}

impl std::str::FromStr for SortMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price" | "price-ascending" => Ok(SortMode::PriceAscending),
            "new" | "newest" => Ok(SortMode::Newest),
            "relevance" => Ok(SortMode::Relevance),
            _ => Err(CoreError::UnknownSortMode(s.to_string())),
        }
    }
}

/// A search result that passed normalization but has not yet been tagged
/// with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedListing {
    pub title: String,
    pub price: Decimal,
    pub condition: String,
    /// `None` when the result block had no item link. Such listings are
    /// still stored in the catalog but cannot be promoted to favorites.
    pub link: Option<String>,
    pub source: Source,
    pub description: String,
}

impl NormalizedListing {
    /// Attaches provenance tags, producing the record the catalog stores.
    #[must_use]
    pub fn tag(
        self,
        category: &str,
        search_term: &str,
        discovered_at: DateTime<Utc>,
    ) -> ListingRecord {
        ListingRecord {
            title: self.title,
            price: self.price,
            condition: self.condition,
            link: self.link,
            source: self.source,
            category: category.to_string(),
            search_term: search_term.to_string(),
            discovered_at,
            description: self.description,
        }
    }
}

/// One discovered listing, tagged with the search that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub title: String,
    pub price: Decimal,
    pub condition: String,
    pub link: Option<String>,
    pub source: Source,
    pub category: String,
    pub search_term: String,
    pub discovered_at: DateTime<Utc>,
    pub description: String,
}

impl ListingRecord {
    /// Copies this listing into the favorites shape (drops `search_term`).
    #[must_use]
    pub fn to_favorite(&self) -> FavoriteRecord {
        FavoriteRecord {
            title: self.title.clone(),
            price: self.price,
            condition: self.condition.clone(),
            link: self.link.clone(),
            source: self.source,
            category: self.category.clone(),
            discovered_at: self.discovered_at,
            description: self.description.clone(),
        }
    }
}

/// A listing the user explicitly saved. Unique by `link` in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRecord {
    pub title: String,
    pub price: Decimal,
    pub condition: String,
    pub link: Option<String>,
    pub source: Source,
    pub category: String,
    pub discovered_at: DateTime<Utc>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn make_normalized(link: Option<&str>) -> NormalizedListing {
        NormalizedListing {
            title: "Nintendo NES Console Bundle".to_string(),
            price: Decimal::new(4999, 2),
            condition: "Pre-Owned".to_string(),
            link: link.map(str::to_string),
            source: Source::Ebay,
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }

    #[test]
    fn source_parses_case_insensitively() {
        assert_eq!(Source::from_str("eBay").unwrap(), Source::Ebay);
        assert_eq!(Source::from_str("EBAY").unwrap(), Source::Ebay);
        assert_eq!(Source::from_str(" ebay ").unwrap(), Source::Ebay);
    }

    #[test]
    fn source_rejects_unknown_marketplace() {
        let err = Source::from_str("craigslist").unwrap_err();
        assert!(matches!(err, CoreError::UnknownSource(ref s) if s == "craigslist"));
    }

    #[test]
    fn source_label_round_trips_through_from_str() {
        for source in Source::ALL {
            assert_eq!(Source::from_str(source.label()).unwrap(), *source);
        }
    }

    #[test]
    fn sort_mode_accepts_aliases() {
        assert_eq!(
            SortMode::from_str("price").unwrap(),
            SortMode::PriceAscending
        );
        assert_eq!(SortMode::from_str("new").unwrap(), SortMode::Newest);
        assert_eq!(
            SortMode::from_str("Relevance").unwrap(),
            SortMode::Relevance
        );
        assert!(SortMode::from_str("cheapest").is_err());
    }

    #[test]
    fn sort_mode_defaults_to_price_ascending() {
        assert_eq!(SortMode::default(), SortMode::PriceAscending);
    }

    #[test]
    fn tag_attaches_provenance() {
        let now = Utc::now();
        let record = make_normalized(Some("https://www.ebay.com/itm/1")).tag(
            "Consoles",
            "nintendo nes console",
            now,
        );
        assert_eq!(record.category, "Consoles");
        assert_eq!(record.search_term, "nintendo nes console");
        assert_eq!(record.discovered_at, now);
        assert_eq!(record.price, Decimal::new(4999, 2));
    }

    #[test]
    fn to_favorite_copies_everything_but_search_term() {
        let record = make_normalized(Some("https://www.ebay.com/itm/1")).tag(
            "Consoles",
            "nintendo nes console",
            Utc::now(),
        );
        let favorite = record.to_favorite();
        assert_eq!(favorite.title, record.title);
        assert_eq!(favorite.price, record.price);
        assert_eq!(favorite.link, record.link);
        assert_eq!(favorite.category, record.category);
        assert_eq!(favorite.discovered_at, record.discovered_at);
    }
}
