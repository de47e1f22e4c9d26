use super::{check_rate_limit, invalid_body};
use crate::error::{ApiError, AppError};
use crate::extraction::ExtractionError;
use crate::metrics::{EXTRACTIONS_TOTAL, REQUESTS_TOTAL};
use crate::models::{PrefillRequest, PrefillResponse};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

/// POST /v1/prefill
///
/// Extracts an invoice from the email text and appends it to the record file.
pub async fn prefill_handler(
    State(state): State<AppState>,
    payload: Result<Json<PrefillRequest>, JsonRejection>,
) -> Result<Json<PrefillResponse>, ApiError> {
    REQUESTS_TOTAL.with_label_values(&["prefill"]).inc();

    prefill(&state, payload)
        .await
        .map(Json)
        .map_err(ApiError::prefill)
}

async fn prefill(
    state: &AppState,
    payload: Result<Json<PrefillRequest>, JsonRejection>,
) -> Result<PrefillResponse, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;
    request.validate()?;
    check_rate_limit(state)?;

    let record = state
        .extractor
        .extract(&request.email_text, request.model.trim())
        .await
        .inspect_err(|e| {
            EXTRACTIONS_TOTAL.with_label_values(&[outcome(e)]).inc();
        })?;

    EXTRACTIONS_TOTAL.with_label_values(&["success"]).inc();
    Ok(PrefillResponse::extracted(record))
}

fn outcome(error: &ExtractionError) -> &'static str {
    match error {
        ExtractionError::Upstream(_) => "upstream_error",
        ExtractionError::MalformedOutput { .. } => "malformed_output",
        ExtractionError::Persistence(_) => "persistence_error",
    }
}
