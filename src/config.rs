use clap::Parser;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// CLI argument structure; every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "prefill-gateway")]
#[command(about = "Chat completion proxy and invoice email extractor backed by hosted LLMs")]
pub struct Args {
    // Address to bind
    #[arg(long, env = "GATEWAY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, env = "GATEWAY_PORT", default_value_t = 8090)]
    pub port: u16,

    // Rate limit max requests per window
    #[arg(long, env = "GATEWAY_RATE_LIMIT", default_value_t = 3)]
    pub rate_limit: usize,

    // Rate limit window in seconds
    #[arg(long, env = "GATEWAY_RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // CSV file extracted records are appended to
    #[arg(long, env = "GATEWAY_DATA_FILE", default_value = "data.csv")]
    pub data_file: PathBuf,

    // Plain-text log of prefill inputs and raw model output
    #[arg(long, env = "GATEWAY_INPUT_LOG", default_value = "input_email_text.log")]
    pub input_log: PathBuf,

    // Directory holding system_prompt.txt and prefill_prompt.md
    #[arg(long, env = "GATEWAY_PROMPTS_DIR", default_value = "prompts")]
    pub prompts_dir: PathBuf,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,

    // Fallback KEY=value file for keys not set above
    #[arg(long, env = "GATEWAY_API_KEYS_FILE", default_value = "api_keys.txt")]
    pub api_keys_file: PathBuf,

    #[arg(long, env = "GROQ_BASE_URL", default_value = "https://api.groq.com/openai/v1")]
    pub groq_base_url: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = "https://openrouter.ai/api/v1")]
    pub openrouter_base_url: String,

    // Upstream request timeout in seconds
    #[arg(long, env = "GATEWAY_UPSTREAM_TIMEOUT", default_value_t = 60)]
    pub upstream_timeout: u64,
}

impl Args {
    /// Fill API keys missing from flags/environment from the keys file.
    pub fn apply_key_file(&mut self, keys: &HashMap<String, String>) {
        let fill = |slot: &mut Option<String>, name: &str| {
            if slot.as_deref().is_none_or(|k| k.trim().is_empty()) {
                *slot = keys.get(name).cloned();
            }
        };
        fill(&mut self.groq_api_key, "GROQ_API_KEY");
        fill(&mut self.openai_api_key, "OPENAI_API_KEY");
        fill(&mut self.openrouter_api_key, "OPENROUTER_API_KEY");
    }
}

// KEY=value per line; lines without '=' are skipped
pub fn parse_key_file(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect()
}

// Missing file is not an error, there is simply nothing to fall back to
pub fn load_key_file(path: &Path) -> std::io::Result<HashMap<String, String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(parse_key_file(contents.as_str())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(e) => Err(e),
    }
}
