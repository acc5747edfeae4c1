//! Upstream travel API providers
//!
//! Defines the provider traits the search and web layers depend on, and the
//! Amadeus implementation of them.

pub mod amadeus;
mod traits;

pub use amadeus::Amadeus;
pub use traits::*;
