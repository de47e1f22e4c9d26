use clap::Parser; // for cli
use prefill_gateway::config::{Args, load_key_file};
use prefill_gateway::extraction::Extractor;
use prefill_gateway::llm::{OpenAiCompatProvider, Provider, ProviderRouter};
use prefill_gateway::prompts::SystemPrompts;
use prefill_gateway::rate_limit::SlidingWindowLimiter;
use prefill_gateway::sink::{CsvRecordSink, FileTranscript};
use prefill_gateway::{AppState, router};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // .env is optional
    let _ = dotenvy::dotenv();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(mut args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match load_key_file(&args.api_keys_file) {
        Ok(keys) => args.apply_key_file(&keys),
        Err(e) => tracing::warn!(
            path = %args.api_keys_file.display(),
            error = %e,
            "could not read API keys file"
        ),
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.upstream_timeout))
        .build()?;
    let platform = Arc::new(build_router(&args, &client));
    let providers = platform.configured();

    let prompts = SystemPrompts::load(&args.prompts_dir);
    let sink = CsvRecordSink::open(&args.data_file).await?;
    let transcript = FileTranscript::new(&args.input_log);

    let extractor = Extractor::new(
        platform.clone(),
        Arc::new(sink),
        Arc::new(transcript),
        prompts.prefill,
    );

    // creating shared state
    let state = AppState {
        limiter: Arc::new(SlidingWindowLimiter::new(
            args.rate_limit,
            Duration::from_secs(args.rate_window),
        )),
        platform,
        extractor: Arc::new(extractor),
        chat_prompt: prompts.chat,
        providers,
    };

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Gateway running on http://{addr}");
    tracing::info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit,
        args.rate_window
    );
    tracing::info!(
        data_file = %args.data_file.display(),
        input_log = %args.input_log.display(),
        "persisting extractions"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

// Register a provider per configured API key
fn build_router(args: &Args, client: &reqwest::Client) -> ProviderRouter {
    let candidates = [
        (Provider::Groq, &args.groq_base_url, &args.groq_api_key),
        (Provider::OpenAi, &args.openai_base_url, &args.openai_api_key),
        (Provider::OpenRouter, &args.openrouter_base_url, &args.openrouter_api_key),
    ];

    let mut platforms = ProviderRouter::new();
    for (provider, base_url, key) in candidates {
        match key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => {
                tracing::info!(%provider, base_url = %base_url, "provider configured");
                platforms = platforms.with_provider(
                    provider,
                    Arc::new(OpenAiCompatProvider::new(base_url.as_str(), key, client.clone())),
                );
            }
            None => tracing::warn!(%provider, "no API key found, provider disabled"),
        }
    }
    platforms
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
