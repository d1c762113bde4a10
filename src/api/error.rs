//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::core::UnknownMetric;
use crate::report::{ReportError, UnknownCurrency};

use super::json_response;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    UnknownMetric(#[from] UnknownMetric),

    #[error(transparent)]
    UnknownCurrency(#[from] UnknownCurrency),

    #[error("Not found")]
    NotFound,

    #[error("Failed to render report: {0}")]
    Report(#[from] ReportError),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownMetric(_) | ApiError::UnknownCurrency(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        json_response(
            status,
            ErrorResponse {
                error: self.to_string(),
            },
        )
    }
}
