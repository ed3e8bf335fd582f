// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::services::plan_validation::PlanShapeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required server-side configuration is absent or unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    /// The model answered, but not with JSON.
    #[error("AI response is not valid JSON: {0}")]
    InvalidAiResponse(String),

    #[error("AI response has an unexpected shape: {0}")]
    PlanShape(#[from] PlanShapeError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when the AI provider rejects us for quota reasons.
    pub const AI_RATE_LIMIT: &'static str = "AI service quota exceeded";

    /// HTTP status for this error class.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::AiProvider(_)
            | AppError::InvalidAiResponse(_)
            | AppError::PlanShape(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the AI provider refused the call because of rate limiting.
    pub fn is_ai_rate_limit(&self) -> bool {
        matches!(self, AppError::AiProvider(msg) if msg.contains(Self::AI_RATE_LIMIT))
    }
}

/// JSON error response body
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Config(msg) => {
                tracing::error!(error = %msg, "Server misconfigured");
            }
            AppError::BadRequest(_) => {
                tracing::warn!(error = %self, "Rejected request");
            }
            _ => {
                tracing::error!(error = %self, "Request failed");
            }
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
