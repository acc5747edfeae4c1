//! JSON error envelopes returned by the API

use crate::error::{CredentialError, ProviderError, SearchError};
use crate::store::StoreError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;

const CREDENTIAL_SUGGESTION: &str =
    "Check that AMADEUS_API_KEY and AMADEUS_API_SECRET are set correctly.";

/// Errors rendered as `{success: false, ...}` responses
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 with `error` and `message`, optionally an `example` request
    #[error("{error}: {message}")]
    BadRequest {
        error: String,
        message: String,
        example: Option<Value>,
    },

    /// 404 with `error` and `message`
    #[error("{error}: {message}")]
    NotFound { error: String, message: String },

    /// 500 carrying the token failure detail
    #[error("{0}")]
    Credential(CredentialError, bool),

    /// Upstream rejection, relayed with the upstream status
    #[error("upstream responded with status {status}")]
    Upstream {
        status: u16,
        body: Value,
        debug: Option<Value>,
        suggestions: &'static [&'static str],
    },

    /// Transport failure talking to the upstream
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            error: error.into(),
            message: message.into(),
            example: None,
        }
    }

    pub fn not_found(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Token failure without a configuration hint
    pub fn credential(err: CredentialError) -> Self {
        Self::Credential(err, false)
    }

    /// Token failure with a configuration hint
    pub fn credential_with_suggestion(err: CredentialError) -> Self {
        Self::Credential(err, true)
    }

    pub fn upstream(status: u16, body: Value) -> Self {
        Self::Upstream {
            status,
            body,
            debug: None,
            suggestions: &[],
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Credential(..) | Self::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    fn body(self) -> Value {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));

        match self {
            Self::BadRequest {
                error,
                message,
                example,
            } => {
                body.insert("error".to_string(), json!(error));
                body.insert("message".to_string(), json!(message));
                if let Some(example) = example {
                    body.insert("example".to_string(), example);
                }
            }
            Self::NotFound { error, message } => {
                body.insert("error".to_string(), json!(error));
                body.insert("message".to_string(), json!(message));
            }
            Self::Credential(err, with_suggestion) => {
                let mut error = json!({
                    "message": err.message,
                    "detail": err.detail,
                });
                if with_suggestion {
                    error["suggestion"] = json!(CREDENTIAL_SUGGESTION);
                }
                body.insert("error".to_string(), error);
            }
            Self::Upstream {
                body: upstream,
                debug,
                suggestions,
                ..
            } => {
                body.insert("error".to_string(), upstream);
                if let Some(debug) = debug {
                    body.insert("debug".to_string(), debug);
                }
                if !suggestions.is_empty() {
                    body.insert("suggestions".to_string(), json!(suggestions));
                }
            }
            Self::Provider(err) => {
                body.insert(
                    "error".to_string(),
                    json!({
                        "message": "Upstream request failed",
                        "detail": err.to_string(),
                    }),
                );
            }
        }

        Value::Object(body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation { missing } => Self::bad_request(
                "Missing required parameters",
                format!("{} are required", missing.join(", ")),
            ),
            SearchError::Credential(err) => Self::credential(err),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingFields(fields) => Self::bad_request(
                "Missing required fields",
                format!("{} are required", fields),
            ),
            StoreError::InvalidNumber { .. } => {
                Self::bad_request("Invalid field value", err.to_string())
            }
            StoreError::UserNotFound(id) => {
                Self::not_found("User not found", format!("No user with id {}", id))
            }
            StoreError::TripNotFound(id) => {
                Self::not_found("Trip not found", format!("No trip with id {}", id))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body", rejection.body_text())
    }
}
