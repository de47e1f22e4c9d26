//! HTTP gateway in front of hosted LLM platforms.
//!
//! Two endpoints share one sliding-window rate limiter:
//! `POST /v1/chat/completions` proxies a prompt to a chat model, and
//! `POST /v1/prefill` turns an invoice email into an [`ExtractionRecord`]
//! appended to a CSV file.
//!
//! [`ExtractionRecord`]: extraction::ExtractionRecord

pub mod config;
pub mod error;
pub mod extraction;
pub mod handlers;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod prompts;
pub mod rate_limit;
pub mod sink;
pub mod state;

pub use handlers::router;
pub use state::AppState;
