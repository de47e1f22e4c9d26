//! Error taxonomy of the HTTP surface and its single translation to
//! status codes and response bodies.

use crate::extraction::ExtractionError;
use crate::llm::LlmError;
use crate::rate_limit::RateLimitExceeded;
use crate::sink::PersistenceError;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    RateLimited(#[from] RateLimitExceeded),

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("AI platform request failed: {0}")]
    Upstream(LlmError),

    #[error("Model did not return valid JSON. AI response: {raw}")]
    MalformedModelOutput { raw: String },

    #[error("Failed to persist extracted data: {0}")]
    Persistence(#[from] PersistenceError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnsupportedModel(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_)
            | AppError::MalformedModelOutput { .. }
            | AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::UnsupportedModel(model) => AppError::UnsupportedModel(model),
            other => AppError::Upstream(other),
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::Upstream(e) => e.into(),
            ExtractionError::MalformedOutput { raw, .. } => AppError::MalformedModelOutput { raw },
            ExtractionError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

// Body shape an endpoint answers errors with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    // {"detail": "..."}
    Detail,
    // {"success": false, "message": "..."}
    Prefill,
}

#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub envelope: Envelope,
}

impl ApiError {
    pub fn detail(error: AppError) -> Self {
        Self {
            error,
            envelope: Envelope::Detail,
        }
    }

    pub fn prefill(error: AppError) -> Self {
        Self {
            error,
            envelope: Envelope::Prefill,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let message = self.error.to_string();

        match &self.error {
            AppError::RateLimited(_) => tracing::warn!("{message}"),
            e if status.is_server_error() => tracing::error!(error = %e, "request failed"),
            _ => tracing::debug!(%status, "{message}"),
        }

        // rate limiting always answers with {detail}, whatever the endpoint
        let body = match (&self.error, self.envelope) {
            (AppError::RateLimited(_), _) | (_, Envelope::Detail) => json!({ "detail": message }),
            (_, Envelope::Prefill) => json!({ "success": false, "message": message }),
        };

        let mut response = (status, Json(body)).into_response();
        if let AppError::RateLimited(limit) = &self.error {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(limit.retry_after_secs()));
        }
        response
    }
}
