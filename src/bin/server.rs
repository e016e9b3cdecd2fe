//! HTTP server binary entry point.
//!
//! Loads configuration from the environment (optionally seeded from a
//! `.env` file), wires up the Groq generation provider, the in-process
//! memory store, and the search providers, then serves the API.
//!
//! # Examples
//!
//! ```bash
//! GROQ_API_KEY=... server
//! server --bind 0.0.0.0:9000 --log-level debug
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use paper_chat::chat::ChatService;
use paper_chat::config::Config;
use paper_chat::generation::groq::GroqProvider;
use paper_chat::generation::GenerationProvider;
use paper_chat::memory::lexical::LexicalMemoryStore;
use paper_chat::search::arxiv::ArxivProvider;
use paper_chat::search::scholar::ScholarProvider;
use paper_chat::search::SearchProvider;
use paper_chat::server::{build_router, AppState};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Paper chat backend server
#[derive(Parser, Debug)]
#[command(
    name = "server",
    version,
    about = "HTTP backend for chatting about research papers"
)]
struct Args {
    /// Address to bind the HTTP server to (host:port)
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<String>,

    /// Logging verbosity level
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    log_level: String,
}

/// Setup logging with the specified level
fn setup_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    setup_logging(&args.log_level);

    let config = Config::from_env().with_context(|| {
        "Failed to load configuration.\n\
         Set GROQ_API_KEY in the environment or a .env file."
    })?;

    let generation = GroqProvider::new(config.groq_api_key.clone())
        .with_context(|| "Failed to create Groq provider")?;
    info!(model = generation.model_name(), "generation provider ready");

    let memory = LexicalMemoryStore::new();
    let chat = ChatService::new(generation, memory);

    let arxiv: Arc<dyn SearchProvider> = Arc::new(ArxivProvider::new());

    let scholar: Option<Arc<dyn SearchProvider>> = match &config.serpapi_key {
        Some(key) => {
            let provider = ScholarProvider::new(key.clone())
                .with_context(|| "Failed to create Scholar provider")?;
            Some(Arc::new(provider) as Arc<dyn SearchProvider>)
        }
        None => {
            warn!("SERPAPI_KEY not set; /scholar-results will return 503");
            None
        }
    };

    let bind_addr = args.bind.unwrap_or_else(|| config.bind_addr.clone());
    let state = Arc::new(AppState::new(
        chat,
        arxiv,
        scholar,
        config.download_dir.clone(),
    ));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!(%bind_addr, "listening");

    axum::serve(listener, app)
        .await
        .with_context(|| "Server terminated unexpectedly")?;

    Ok(())
}
