//! Error types shared across the crate

use serde_json::{json, Value};
use thiserror::Error;

/// Failure to obtain an upstream access token
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CredentialError {
    pub message: String,
    /// Upstream error body or local description, kept for diagnostics
    pub detail: Value,
}

impl CredentialError {
    pub fn new(message: impl Into<String>, detail: Value) -> Self {
        Self {
            message: message.into(),
            detail,
        }
    }
}

/// Transport-level failure calling an upstream API
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Opaque JSON form recorded on failed destination outcomes
    pub fn detail(&self) -> Value {
        json!({ "message": self.to_string() })
    }
}

/// Errors that abort a multi-destination search as a whole
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("missing required parameters: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SearchError::Validation {
            missing: vec!["originLocationCode", "departureDate"],
        };
        assert_eq!(
            err.to_string(),
            "missing required parameters: originLocationCode, departureDate"
        );

        let err: SearchError = CredentialError::new("token request failed", json!({"error": "invalid_client"})).into();
        assert_eq!(err.to_string(), "token request failed");

        assert_eq!(
            ProviderError::Timeout.detail(),
            json!({"message": "request timed out"})
        );
    }
}
