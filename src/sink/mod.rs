//! Where extraction results and request transcripts end up.
//!
//! The pipeline only sees the [`RecordSink`] and [`Transcript`] traits; the
//! file-backed implementations are wired in `main`, the in-memory ones are
//! used by tests.

mod csv_file;
mod memory;
mod transcript;

use crate::extraction::ExtractionRecord;
use async_trait::async_trait;
use thiserror::Error;

pub use csv_file::CsvRecordSink;
pub use memory::{MemorySink, MemoryTranscript};
pub use transcript::{FileTranscript, TranscriptEntry, TranscriptKind};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Append one record. Appends from concurrent callers must not interleave.
    async fn append(&self, record: &ExtractionRecord) -> Result<(), PersistenceError>;
}

#[async_trait]
pub trait Transcript: Send + Sync {
    async fn record(&self, entry: TranscriptEntry<'_>) -> Result<(), PersistenceError>;
}
