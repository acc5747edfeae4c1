//! Search orchestration module
//!
//! Fans a flight search out to every candidate destination, then merges,
//! orders and caps the per-destination results.

mod executor;
mod models;
pub mod ranking;

pub use executor::MultiDestinationSearch;
pub use models::*;
