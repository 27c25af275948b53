pub mod app_config;
pub mod categories;
pub mod config;
pub mod filter;
pub mod listings;

pub use app_config::AppConfig;
pub use categories::{
    load_categories, CategoriesFile, SearchCategory, SearchScope, SearchTerm, CUSTOM_CATEGORY,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::PriceRange;
pub use listings::{
    FavoriteRecord, ListingRecord, NormalizedListing, SortMode, Source, DEFAULT_CONDITION,
    DEFAULT_DESCRIPTION,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown marketplace source: {0}")]
    UnknownSource(String),

    #[error("unknown sort mode: {0}")]
    UnknownSortMode(String),

    #[error("unknown search category: {0}")]
    UnknownCategory(String),

    #[error("search term must be non-empty")]
    EmptySearchTerm,

    #[error("invalid price range: min {min} is greater than max {max}")]
    InvalidPriceRange {
        min: rust_decimal::Decimal,
        max: rust_decimal::Decimal,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[source] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
