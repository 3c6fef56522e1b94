use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::rubric::RubricError;
use crate::llm_client::LlmError;

/// Message returned to clients for every failure past input validation.
pub const GENERIC_ANALYSIS_ERROR: &str = "An error occurred during analysis.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Resume extraction error: {0}")]
    Extraction(String),

    #[error("Upstream model error: {0}")]
    Upstream(String),

    #[error("Model output parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),
}

impl From<RubricError> for AppError {
    fn from(e: RubricError) -> Self {
        AppError::Configuration(e.to_string())
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Parse(msg) => AppError::Parse(msg),
            LlmError::EmptyContent => AppError::Parse("model returned empty content".to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!("CRITICAL configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    GENERIC_ANALYSIS_ERROR.to_string(),
                )
            }
            AppError::Extraction(msg) => {
                tracing::error!("Resume extraction error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_ERROR",
                    GENERIC_ANALYSIS_ERROR.to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream model error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    GENERIC_ANALYSIS_ERROR.to_string(),
                )
            }
            AppError::Parse(msg) => {
                tracing::error!("Model output parse error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PARSE_ERROR",
                    GENERIC_ANALYSIS_ERROR.to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
