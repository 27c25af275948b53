pub mod client;
pub mod error;
pub mod extract;
pub mod marketplace;
pub mod normalize;
pub mod query;
pub mod rate_limit;

pub use client::MarketplaceClient;
pub use error::ScraperError;
pub use extract::{extract_listings, ListingSelectors, RawListing};
pub use marketplace::MarketplaceProfile;
pub use normalize::{clean_price, normalize_listing};
pub use query::{build_search_request, SearchRequest};
pub use rate_limit::RetryPolicy;
