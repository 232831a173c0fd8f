//! API error handling

use crate::core::ProfitError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const PROFIT_FAILED_MESSAGE: &str = "Failed to calculate profit";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Profit(#[from] ProfitError),
}

/// Every calculation failure renders the same body; the cause has already
/// been reported to the diagnostics sink.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Profit(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": PROFIT_FAILED_MESSAGE }));
        (status, body).into_response()
    }
}
