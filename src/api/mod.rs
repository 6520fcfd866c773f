//! Route handler module.
//!
//! Contains all case endpoints and the response envelope of the case API.

mod activity;
mod case;
mod summary;
mod ws;

pub use activity::*;
pub use case::*;
pub use summary::*;
pub use ws::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppError>;

/// Create a successful API response with a data payload.
pub fn success<T: Serialize>(message: &str, data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        status: "success".to_string(),
        message: message.to_string(),
        data: Some(data),
    })
}

/// Create a successful API response without a payload.
pub fn success_message(message: &str) -> ApiResult<()> {
    Ok(ApiResponse {
        status: "success".to_string(),
        message: message.to_string(),
        data: None,
    })
}

/// Query parameters identifying the target case.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CaseQuery {
    pub cid: i64,
}
