//! HTTP networking module
//!
//! Provides HTTP client functionality for calling upstream travel APIs.

mod client;
mod types;

pub use client::{is_timeout, HttpClient};
pub use types::{ProviderRequest, ProviderResponse, RequestBody};
