use super::{AiPlatform, CompletionRequest, LlmError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Deterministic in-process platform for tests.
///
/// Replies with a fixed text (or fails with a fixed message) and keeps every
/// request it saw. Clones share the same request log.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    reply: Result<String, String>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockPlatform {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    // Every call fails with LlmError::Other(message)
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AiPlatform for MockPlatform {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.reply.clone().map_err(LlmError::Other)
    }
}
