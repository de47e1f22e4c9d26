use super::{AiPlatform, CompletionRequest, LlmError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    OpenAi,
    OpenRouter,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Groq, Provider::OpenAi, Provider::OpenRouter];
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
            Provider::OpenRouter => "openrouter",
        };
        f.write_str(name)
    }
}

// Short names clients may send instead of a full model id
const MODEL_ALIASES: &[(&str, &str)] = &[
    ("gpt", "gpt-5-mini"),
    ("deepseek", "deepseek/deepseek-r1-0528:free"),
    ("llama", "llama-3.1-8b-instant"),
];

/// Map a client-supplied model name to the provider serving it and the
/// concrete model id to send upstream.
pub fn resolve_model(model: &str) -> Result<(Provider, String), LlmError> {
    let requested = model.trim();
    let lowered = requested.to_lowercase();

    let resolved = MODEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, full)| full.to_string())
        .unwrap_or_else(|| requested.to_string());

    let id = resolved.to_lowercase();
    let provider = if id.contains("gpt") {
        Provider::OpenAi
    } else if ["deepseek", "moonshotai", "qwen"].iter().any(|p| id.contains(p)) {
        Provider::OpenRouter
    } else if id.contains("llama") {
        Provider::Groq
    } else {
        return Err(LlmError::UnsupportedModel(requested.to_string()));
    };

    Ok((provider, resolved))
}

/// Dispatches each completion to the provider owning the requested model.
#[derive(Default, Clone)]
pub struct ProviderRouter {
    providers: HashMap<Provider, Arc<dyn AiPlatform>>,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Provider, platform: Arc<dyn AiPlatform>) -> Self {
        self.providers.insert(provider, platform);
        self
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        self.providers.contains_key(&provider)
    }

    // Registered providers, in a stable order
    pub fn configured(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.is_configured(*p))
            .collect()
    }
}

#[async_trait]
impl AiPlatform for ProviderRouter {
    async fn complete(&self, mut request: CompletionRequest) -> Result<String, LlmError> {
        let (provider, model) = resolve_model(&request.model)?;
        let platform = self
            .providers
            .get(&provider)
            .ok_or(LlmError::ProviderNotConfigured(provider))?;

        tracing::debug!(%provider, %model, "routing completion");
        request.model = model;
        platform.complete(request).await
    }
}
