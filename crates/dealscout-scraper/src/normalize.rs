//! Validation and cleanup from [`RawListing`] to
//! [`dealscout_core::NormalizedListing`].

use std::str::FromStr;
use std::sync::LazyLock;

use dealscout_core::{NormalizedListing, Source, DEFAULT_CONDITION, DEFAULT_DESCRIPTION};
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ScraperError;
use crate::extract::RawListing;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Marker some pages render in place of a missing field.
const PLACEHOLDER: &str = "N/A";

/// Parses a displayed price into a decimal.
///
/// Every character other than an ASCII digit or `.` is discarded, so
/// `"$1,299.99"` parses as `1299.99`. Returns `None` when nothing numeric
/// remains (e.g. `"Best Offer"`) or the remainder is not a valid number
/// (e.g. a range like `"$10.00 to $20.00"` collapses to `"10.0020.00"`).
///
/// A leading `-` is discarded with the other symbols, so `"-5.00"` parses as
/// `5.00`. Digit strings beyond [`Decimal`]'s 28 significant digits overflow
/// and also yield `None`.
#[must_use]
pub fn clean_price(text: &str) -> Option<Decimal> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    Decimal::from_str(&digits).ok()
}

/// Collapses interior whitespace runs to a single space and trims the ends.
fn clean_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Cleaned text, or `None` when the field is absent, blank, or the `N/A`
/// placeholder.
fn present(field: Option<&str>) -> Option<String> {
    field
        .map(clean_text)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(PLACEHOLDER))
}

/// Converts one extracted result block into a [`NormalizedListing`].
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if the block has no title or its
/// price text does not parse as a number. Callers drop such blocks.
pub fn normalize_listing(raw: RawListing, source: Source) -> Result<NormalizedListing, ScraperError> {
    let Some(title) = present(raw.title.as_deref()) else {
        return Err(ScraperError::Normalization {
            reason: "result block has no title".into(),
        });
    };

    let Some(price_text) = present(raw.price_text.as_deref()) else {
        return Err(ScraperError::Normalization {
            reason: format!("\"{title}\" has no price"),
        });
    };

    let Some(price) = clean_price(&price_text) else {
        return Err(ScraperError::Normalization {
            reason: format!("\"{title}\" has unparseable price \"{price_text}\""),
        });
    };

    let condition =
        present(raw.condition.as_deref()).unwrap_or_else(|| DEFAULT_CONDITION.to_owned());
    let description =
        present(raw.description.as_deref()).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned());
    let link = raw
        .link
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty());

    Ok(NormalizedListing {
        title,
        price,
        condition,
        link,
        source,
        description,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
