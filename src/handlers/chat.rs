use super::{check_rate_limit, invalid_body};
use crate::error::{ApiError, AppError};
use crate::llm::CompletionRequest;
use crate::metrics::{REQUESTS_TOTAL, UPSTREAM_LATENCY};
use crate::models::{ChatRequest, ChatResponse};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::time::Instant;

/// POST /v1/chat/completions
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    REQUESTS_TOTAL.with_label_values(&["chat"]).inc();

    complete_chat(&state, payload)
        .await
        .map(Json)
        .map_err(ApiError::detail)
}

async fn complete_chat(
    state: &AppState,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<ChatResponse, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;
    request.validate()?;
    check_rate_limit(state)?;

    let completion =
        CompletionRequest::new(request.model_name.trim(), &state.chat_prompt, request.prompt);

    let started = Instant::now();
    let result = state.platform.complete(completion).await;
    UPSTREAM_LATENCY.observe(started.elapsed().as_secs_f64());

    Ok(ChatResponse { response: result? })
}
