//! Travel-Proxy-RS: a REST proxy over the Amadeus travel APIs
//!
//! Besides relaying flight and hotel searches, it searches a fixed list of
//! candidate destinations concurrently and returns one price-ordered list.

pub mod config;
pub mod error;
pub mod hotels;
pub mod metrics;
pub mod network;
pub mod providers;
pub mod search;
pub mod store;
pub mod web;

pub use config::Settings;
pub use error::{CredentialError, ProviderError, SearchError};
pub use search::{MultiDestinationSearch, MultiSearchRequest, MultiSearchResult};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
