use super::{PersistenceError, RecordSink, Transcript, TranscriptEntry, TranscriptKind};
use crate::extraction::ExtractionRecord;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

// In-memory record sink; clones share storage
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<ExtractionRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ExtractionRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append(&self, record: &ExtractionRecord) -> Result<(), PersistenceError> {
        self.records
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?
            .push(record.clone());
        Ok(())
    }
}

// In-memory transcript; keeps (kind, model, text)
#[derive(Debug, Clone, Default)]
pub struct MemoryTranscript {
    entries: Arc<Mutex<Vec<(TranscriptKind, String, String)>>>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(TranscriptKind, String, String)> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transcript for MemoryTranscript {
    async fn record(&self, entry: TranscriptEntry<'_>) -> Result<(), PersistenceError> {
        self.entries
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?
            .push((entry.kind, entry.model.to_string(), entry.text.to_string()));
        Ok(())
    }
}
