use crate::extraction::Extractor;
use crate::llm::{AiPlatform, Provider};
use crate::rate_limit::SlidingWindowLimiter;
use std::sync::Arc;

// app's shared state, built once in main and handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<SlidingWindowLimiter>,
    pub platform: Arc<dyn AiPlatform>, // chat completions go straight here
    pub extractor: Arc<Extractor>,
    pub chat_prompt: String,
    pub providers: Vec<Provider>, // reported by /health
}
