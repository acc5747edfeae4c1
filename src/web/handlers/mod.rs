//! HTTP request handlers

pub mod flights;
pub mod hotels;
pub mod store;

use super::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// Treat empty query values like absent ones
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Test page handler
pub async fn index(State(state): State<AppState>) -> Response {
    let path = state.static_dir().join("test.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", path.display(), e);
            (StatusCode::NOT_FOUND, "Test page not found").into_response()
        }
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": format!("{} API server is running", state.instance_name()),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Dispatch statistics handler
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": state.metrics.snapshot(),
    }))
}

/// Favicon handler
pub async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
