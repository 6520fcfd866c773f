//! Error handling module for the Caseflow backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and the
//! uniform response envelope.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Authenticated but lacking the required case access level
    Forbidden(String),
    /// Resource not found (explicit 404, used by the existence check)
    NotFound(String),
    /// Generic domain/validation error (client error, no status override)
    Validation(String),
    /// Schema validation failure with per-field messages
    Schema {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Schema { .. } => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Schema { message, .. } => message.clone(),
            // Internal failure details go to the logs, not to the client.
            AppError::Database(_) => "Database error".to_string(),
            AppError::Internal(_) => "Internal error".to_string(),
        }
    }

    /// Structured error payload, if any (per-field messages for schema errors).
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Schema { fields, .. } => serde_json::to_value(fields).ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Database(msg) | AppError::Internal(msg) => write!(f, "{}", msg),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Validation(format!("JSON error: {}", err))
    }
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            status: "error".to_string(),
            message: error.message(),
            data: error.data(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("who".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_schema_error_carries_fields() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "log_content".to_string(),
            vec!["Missing data for required field.".to_string()],
        );
        let err = AppError::Schema {
            message: "Data error".to_string(),
            fields,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let data = err.data().unwrap();
        assert!(data["log_content"].is_array());
    }

    #[test]
    fn test_internal_details_not_leaked() {
        let err = AppError::Database("connection refused at 10.0.0.5".into());
        assert_eq!(err.message(), "Database error");
    }
}
