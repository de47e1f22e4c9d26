use super::{PersistenceError, RecordSink};
use crate::extraction::{ExtractionRecord, RECORD_FIELDS};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only CSV file with a fixed six-column header.
pub struct CsvRecordSink {
    path: PathBuf,
    // serializes appends so rows never interleave
    lock: Mutex<()>,
}

impl CsvRecordSink {
    /// Open (or create) the file, writing the header when the file is new or
    /// empty. An existing header is left untouched.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();

        let is_empty = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(io_error(&path, e)),
        };

        if is_empty {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(RECORD_FIELDS)?;
            let header = finish(writer)?;
            append_bytes(&path, &header).await?;
            tracing::info!(path = %path.display(), "created record file");
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl RecordSink for CsvRecordSink {
    async fn append(&self, record: &ExtractionRecord) -> Result<(), PersistenceError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(record)?;
        let row = finish(writer)?;

        let _guard = self.lock.lock().await;
        append_bytes(&self.path, &row).await
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, PersistenceError> {
    writer
        .into_inner()
        .map_err(|e| PersistenceError::Unavailable(e.to_string()))
}

async fn append_bytes(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| io_error(path, e))?;
    file.write_all(bytes).await.map_err(|e| io_error(path, e))?;
    file.flush().await.map_err(|e| io_error(path, e))
}

pub(super) fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.display().to_string(),
        source,
    }
}
