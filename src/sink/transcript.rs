use super::csv_file::io_error;
use super::{PersistenceError, Transcript};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptKind {
    Input,
    Output,
}

impl fmt::Display for TranscriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptKind::Input => f.write_str("input"),
            TranscriptKind::Output => f.write_str("output"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TranscriptEntry<'a> {
    pub kind: TranscriptKind,
    pub model: &'a str,
    pub text: &'a str,
}

impl<'a> TranscriptEntry<'a> {
    pub fn input(model: &'a str, text: &'a str) -> Self {
        Self {
            kind: TranscriptKind::Input,
            model,
            text,
        }
    }

    pub fn output(model: &'a str, text: &'a str) -> Self {
        Self {
            kind: TranscriptKind::Output,
            model,
            text,
        }
    }

    // [timestamp] kind model=...\n<text>\n---\n
    pub fn render(&self, timestamp: &str) -> String {
        format!(
            "[{timestamp}] {} model={}\n{}\n---\n",
            self.kind, self.model, self.text
        )
    }
}

/// Plain-text request log, one timestamped block per entry.
pub struct FileTranscript {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTranscript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl Transcript for FileTranscript {
    async fn record(&self, entry: TranscriptEntry<'_>) -> Result<(), PersistenceError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let block = entry.render(&timestamp);

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        file.write_all(block.as_bytes())
            .await
            .map_err(|e| io_error(&self.path, e))
    }
}
