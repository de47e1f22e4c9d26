//! Email-to-invoice extraction ("prefill").

mod pipeline;
mod record;
mod text;

use crate::llm::LlmError;
use crate::sink::PersistenceError;
use thiserror::Error;

pub use pipeline::{Extractor, INVOICE_SCHEMA_NAME, invoice_schema};
pub use record::{ExtractionRecord, RECORD_FIELDS};
pub use text::clean_email_text;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Upstream(#[from] LlmError),

    // raw model text is kept for diagnostics
    #[error("Model did not return valid JSON. AI response: {raw}")]
    MalformedOutput { raw: String, reason: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
