//! Post-normalization price-range filtering.

use rust_decimal::Decimal;

use crate::listings::NormalizedListing;
use crate::CoreError;

/// Anything carrying a normalized price.
pub trait Priced {
    fn price(&self) -> Decimal;
}

impl Priced for NormalizedListing {
    fn price(&self) -> Decimal {
        self.price
    }
}

/// Inclusive price bounds; an unset bound admits everything on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceRange {
    min: Option<Decimal>,
    max: Option<Decimal>,
}

impl PriceRange {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPriceRange`] when both bounds are set and
    /// `min > max`.
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Result<Self, CoreError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(CoreError::InvalidPriceRange { min, max });
            }
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    #[must_use]
    pub fn min(&self) -> Option<Decimal> {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Option<Decimal> {
        self.max
    }

    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }

    /// Keeps the items whose price falls inside the range, preserving order.
    #[must_use]
    pub fn apply<T: Priced>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| self.contains(item.price()))
            .collect()
    }
}
