use std::path::Path;

pub const CHAT_PROMPT_FILE: &str = "system_prompt.txt";
pub const PREFILL_PROMPT_FILE: &str = "prefill_prompt.md";

pub const DEFAULT_CHAT_PROMPT: &str =
    "You are a helpful assistant. Keep answers concise (3–5 sentences max).";
pub const DEFAULT_PREFILL_PROMPT: &str = "Extract the following fields from the email and return only valid JSON with no extra text: amount, currency, due_date, description, company, contact";

/// System prompts, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemPrompts {
    pub chat: String,
    pub prefill: String,
}

impl SystemPrompts {
    pub fn load(dir: &Path) -> Self {
        Self {
            chat: load_prompt(dir, CHAT_PROMPT_FILE, DEFAULT_CHAT_PROMPT),
            prefill: load_prompt(dir, PREFILL_PROMPT_FILE, DEFAULT_PREFILL_PROMPT),
        }
    }
}

impl Default for SystemPrompts {
    fn default() -> Self {
        Self {
            chat: DEFAULT_CHAT_PROMPT.to_string(),
            prefill: DEFAULT_PREFILL_PROMPT.to_string(),
        }
    }
}

fn load_prompt(dir: &Path, file: &str, fallback: &str) -> String {
    let path = dir.join(file);
    match std::fs::read_to_string(&path) {
        Ok(text) if !text.trim().is_empty() => {
            tracing::info!(path = %path.display(), "loaded system prompt");
            text.trim().to_string()
        }
        Ok(_) => fallback.to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => fallback.to_string(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read system prompt, using default");
            fallback.to_string()
        }
    }
}
