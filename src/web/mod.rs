//! Web server module
//!
//! Provides the JSON API and the static test page.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
