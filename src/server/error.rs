//! API error types and JSON response formatting.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details in the response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Key not found error.
    pub fn key_not_found(table: &str, key: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "KEY_NOT_FOUND",
            format!("Key '{}' not found in table '{}'", key, table),
        )
        .with_details(serde_json::json!({ "table": table, "key": key }))
    }

    /// Malformed request body or query.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match &err {
            Error::InvalidKey(_) | Error::Path(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_KEY", message)
            }
            Error::InvalidTable(table) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_TABLE", message)
                    .with_details(serde_json::json!({ "table": table }))
            }
            Error::InvalidOperator(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_OPERATOR", message)
            }
            Error::Import(_) => Self::new(StatusCode::BAD_REQUEST, "IMPORT_REJECTED", message),
            Error::NotANumber { key, found } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "NOT_A_NUMBER", message)
                    .with_details(serde_json::json!({ "key": key, "found": found }))
            }
            Error::NotAnArray(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "NOT_AN_ARRAY", message)
            }
            Error::TargetNotObject(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "TARGET_NOT_OBJECT", message)
            }
            Error::NotConnected => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "NOT_CONNECTED", message)
            }
            _ if err.is_invalid_input() => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
            }
            _ => Self::internal(message),
        }
    }
}
