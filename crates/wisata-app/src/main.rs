//! Wisata application binary - composition root.
//!
//! 1. Install tracing, then load configuration from TOML (and `.env` for
//!    the API key)
//! 2. Load the four CSV datasets and build the retrieval index
//! 3. Wire the language model, tools, agent, router and city explorer
//! 4. Serve the HTTP API or run the terminal chat

mod cli;
mod repl;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter};
use wisata_api::{start_server, AppState};
use wisata_chat::{
    ChatOrchestrator, CityExplorer, DialogueRouter, IntentClassifier, ToolAgent, ToolContext,
    ToolRegistry,
};
use wisata_core::config::WisataConfig;
use wisata_core::error::WisataError;
use wisata_data::Catalog;
use wisata_provider::{GeminiProvider, LanguageModel, WikipediaClient};
use wisata_vector::{HashingEmbedding, RetrievalIndex};

use crate::cli::{CliArgs, Command};

const DEFAULT_LOG_LEVEL: &str = "info";

async fn build_orchestrator(config: &WisataConfig) -> Result<ChatOrchestrator, WisataError> {
    let api_key = std::env::var(&config.llm.api_key_env).map_err(|_| {
        WisataError::Config(format!(
            "environment variable {} is not set",
            config.llm.api_key_env
        ))
    })?;

    let catalog = Arc::new(Catalog::load(&config.datasets)?);

    let embedder = Arc::new(HashingEmbedding::new(config.retrieval.dimensions));
    let retrieval = RetrievalIndex::build(catalog.documents(), embedder).await?;
    tracing::info!(documents = retrieval.len(), "Retrieval index built");

    let model: Arc<dyn LanguageModel> = Arc::new(GeminiProvider::from_config(&config.llm, api_key));
    tracing::info!(model = %config.llm.model, "Language model client ready");

    let context = ToolContext {
        catalog: Arc::clone(&catalog),
        retrieval: Arc::new(retrieval),
        top_k: config.retrieval.top_k,
    };
    let agent = ToolAgent::new(
        Arc::clone(&model),
        ToolRegistry::standard(),
        context,
        config.llm.agent_max_iterations,
        config.llm.memory_turns,
    );
    let router = DialogueRouter::new(
        catalog,
        IntentClassifier::new(config.keywords.clone()),
        agent,
        Arc::clone(&model),
        config.chat.clone(),
    );
    let explorer = CityExplorer::new(
        model,
        Arc::new(WikipediaClient::new(&config.explorer.wikipedia_lang)),
        config.explorer.description_sentences,
    );

    Ok(ChatOrchestrator::new(
        router,
        explorer,
        config.chat.session_timeout_minutes,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    // Tracing first, so config loading is logged. RUST_LOG or --log-level
    // win; otherwise the configured level replaces the bootstrap one below.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let level_is_fixed = args.log_level_is_fixed(env_filter.is_some());
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(args.resolve_log_level(DEFAULT_LOG_LEVEL))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = WisataConfig::load_or_default(&config_file);
    config.general.port = args.resolve_port(config.general.port);

    if !level_is_fixed {
        if let Err(e) = filter_handle.reload(EnvFilter::new(&config.general.log_level)) {
            tracing::warn!(error = %e, "Failed to apply configured log level");
        }
    }

    tracing::info!("Starting Wisata v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    let orchestrator = match build_orchestrator(&config).await {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    match args.command {
        Command::Serve { .. } => start_server(AppState::new(config, orchestrator)).await?,
        Command::Chat => repl::run(&orchestrator).await?,
    }

    Ok(())
}
