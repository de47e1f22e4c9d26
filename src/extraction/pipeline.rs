use super::{ExtractionError, ExtractionRecord, clean_email_text};
use crate::llm::{AiPlatform, CompletionRequest, JsonSchemaFormat};
use crate::metrics::UPSTREAM_LATENCY;
use crate::sink::{RecordSink, Transcript, TranscriptEntry};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;

pub const INVOICE_SCHEMA_NAME: &str = "InvoiceExtraction";

// JSON schema the model output is constrained to
pub fn invoice_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "amount": { "type": "number" },
            "currency": { "type": "string" },
            "due_date": { "type": "string" },
            "description": { "type": "string" },
            "company": { "type": "string" },
            "contact": { "type": "string" }
        },
        "required": ["amount", "currency", "due_date", "description", "company", "contact"]
    })
}

/// Runs one email through transcript, clean, model call, parse and persist.
pub struct Extractor {
    platform: Arc<dyn AiPlatform>,
    sink: Arc<dyn RecordSink>,
    transcript: Arc<dyn Transcript>,
    system_prompt: String,
}

impl Extractor {
    pub fn new(
        platform: Arc<dyn AiPlatform>,
        sink: Arc<dyn RecordSink>,
        transcript: Arc<dyn Transcript>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            sink,
            transcript,
            system_prompt: system_prompt.into(),
        }
    }

    pub async fn extract(
        &self,
        email_text: &str,
        model: &str,
    ) -> Result<ExtractionRecord, ExtractionError> {
        self.log(TranscriptEntry::input(model, email_text)).await;
        let cleaned = clean_email_text(email_text);

        let request = CompletionRequest::new(model, &self.system_prompt, cleaned.as_str())
            .with_json_schema(JsonSchemaFormat {
                name: INVOICE_SCHEMA_NAME.to_string(),
                schema: invoice_schema(),
            });

        let started = Instant::now();
        let result = self.platform.complete(request).await;
        UPSTREAM_LATENCY.observe(started.elapsed().as_secs_f64());
        let raw = result?;

        self.log(TranscriptEntry::output(model, &raw)).await;

        let record = ExtractionRecord::from_model_output(&raw)?;
        self.sink.append(&record).await?;

        tracing::info!(
            company = %record.company,
            amount = record.amount,
            currency = %record.currency,
            "extracted record persisted"
        );
        Ok(record)
    }

    // transcript failures never fail the request
    async fn log(&self, entry: TranscriptEntry<'_>) {
        if let Err(e) = self.transcript.record(entry).await {
            tracing::warn!(error = %e, kind = %entry.kind, "failed to write request transcript");
        }
    }
}
