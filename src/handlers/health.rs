use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

// "degraded" when no provider has an API key, every model call would fail
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let status = if state.providers.is_empty() {
        "degraded"
    } else {
        "healthy"
    };
    let providers: Vec<String> = state.providers.iter().map(ToString::to_string).collect();

    Json(json!({
        "status": status,
        "providers": providers,
        "rate_limit": {
            "limit": state.limiter.limit(),
            "window_seconds": state.limiter.window().as_secs(),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
