// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorBody;

pub const ORACLE_CLOUDED: &str =
    "The oracle's vision is clouded. Please seek wisdom again in a moment.";
pub const ORACLE_RESTING: &str = "The Oracle requires rest. Please wait before seeking more wisdom.";
pub const PATH_NOT_FOUND: &str = "The path you seek does not exist.";

/// Errors surfaced to HTTP clients as `{"error": ...}` bodies.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,

    #[error("{0}")]
    BadRequest(String),

    #[error("{}", ORACLE_RESTING)]
    RateLimited,

    #[error("{}", PATH_NOT_FOUND)]
    NotFound,

    /// Carries the internal cause for logging; clients only see the themed text.
    #[error("{}", ORACLE_CLOUDED)]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(cause) = &self {
            tracing::error!(%cause, "error in chat endpoint");
        }
        let body = ErrorBody { error: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}
