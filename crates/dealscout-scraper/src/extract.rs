//! Pulls raw listing fields out of a search results page.
//!
//! Extraction is purely structural: every field is captured as trimmed text
//! (or `None` when the element is absent). Deciding whether a block is a
//! usable listing happens in [`crate::normalize`].

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

/// CSS selectors locating one result block and its fields.
#[derive(Debug)]
pub struct ListingSelectors {
    pub item: Selector,
    pub title: Selector,
    pub price: Selector,
    pub condition: Selector,
    pub link: Selector,
    pub description: Selector,
}

impl ListingSelectors {
    /// Parses each selector string.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Selector`] naming the first selector that fails
    /// to parse.
    pub fn parse(
        item: &str,
        title: &str,
        price: &str,
        condition: &str,
        link: &str,
        description: &str,
    ) -> Result<Self, ScraperError> {
        let sel = |s: &str| {
            Selector::parse(s).map_err(|e| ScraperError::Selector {
                selector: s.to_owned(),
                reason: e.to_string(),
            })
        };
        Ok(Self {
            item: sel(item)?,
            title: sel(title)?,
            price: sel(price)?,
            condition: sel(condition)?,
            link: sel(link)?,
            description: sel(description)?,
        })
    }
}

pub(crate) static EBAY_SELECTORS: LazyLock<ListingSelectors> = LazyLock::new(|| {
    ListingSelectors::parse(
        "div.s-item__info",
        "div.s-item__title",
        "span.s-item__price",
        "span.SECONDARY_INFO",
        "a.s-item__link",
        "div.s-item__subtitle",
    )
    .expect("valid selector")
});

/// Fields captured from one result block, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub title: Option<String>,
    pub price_text: Option<String>,
    pub condition: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

/// Extracts at most `max_results` result blocks from `html`, in page order.
///
/// Blocks are not validated here; a block with no title or price still
/// yields a [`RawListing`] so the caller can log why it was dropped.
#[must_use]
pub fn extract_listings(
    html: &str,
    selectors: &ListingSelectors,
    max_results: usize,
) -> Vec<RawListing> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.item)
        .take(max_results)
        .map(|block| RawListing {
            title: first_text(block, &selectors.title),
            price_text: first_text(block, &selectors.price),
            condition: first_text(block, &selectors.condition),
            link: block
                .select(&selectors.link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| href.trim().to_owned())
                .filter(|href| !href.is_empty()),
            description: first_text(block, &selectors.description),
        })
        .collect()
}

fn first_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    block
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .filter(|text| !text.is_empty())
}
