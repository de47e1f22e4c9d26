mod chat;
mod health;
mod metrics;
mod prefill;

pub use chat::chat_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use prefill::prefill_handler;

use crate::error::AppError;
use crate::metrics::RATE_LIMITED_TOTAL;
use crate::rate_limit::GLOBAL_IDENTITY;
use crate::state::AppState;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};

// creating the router with routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/v1/chat/completions", post(chat_handler))
        .route("/v1/prefill", post(prefill_handler))
        .with_state(state)
}

// Every caller shares the global bucket
fn check_rate_limit(state: &AppState) -> Result<(), AppError> {
    state.limiter.check(GLOBAL_IDENTITY).map_err(|e| {
        RATE_LIMITED_TOTAL.inc();
        AppError::from(e)
    })
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}
