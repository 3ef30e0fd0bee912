//! PDF QA server binary
//!
//! Run with: cargo run -p pdf-qa --bin pdf-qa-server

use clap::Parser;
use pdf_qa::{
    config::{QaConfig, DEFAULT_DOTENV_PATH},
    providers::{watsonx, EmbeddingProvider},
    server::QaServer,
    ErrorReporter, QaPipeline,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload a PDF and ask questions about it
#[derive(Parser, Debug)]
#[command(name = "pdf-qa-server", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "PDF_QA_CONFIG")]
    config: Option<PathBuf>,

    /// Dotenv file with APIKEY and PROJECT_ID, skipped when absent
    #[arg(long, env = "PDF_QA_ENV_FILE", default_value = DEFAULT_DOTENV_PATH)]
    env_file: PathBuf,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_qa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║              PDF Document Question Answering              ║
║            Retrieval-augmented answers, watsonx.ai        ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let reporter = ErrorReporter::new();
    let mut config = match QaConfig::load_with_dotenv(args.config.as_deref(), &args.env_file) {
        Ok(config) => config,
        Err(e) => {
            reporter.report(&e, Some("Loading configuration"));
            std::process::exit(1);
        }
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - watsonx.ai: {}", config.watsonx.url);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - LLM model: {}", config.generation.model);
    tracing::info!(
        "  - Chunking: {} (size {}, overlap {})",
        config.chunking.strategy,
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Top k: {}", config.retrieval.top_k);

    let (embedder, llm) = watsonx::from_config(&config)?;

    tracing::info!("Checking watsonx.ai credentials...");
    match embedder.health_check().await {
        Ok(_) => tracing::info!("watsonx.ai credentials accepted"),
        Err(e) => {
            tracing::warn!("watsonx.ai not reachable: {}", e);
            tracing::warn!("Requests will fail until the APIKEY and endpoint are valid");
        }
    }

    let pipeline = match QaPipeline::new(&config, Arc::new(embedder), Arc::new(llm)) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            reporter.report(&e, Some("Building QA pipeline"));
            std::process::exit(1);
        }
    };

    let server = QaServer::new(config.server.clone(), pipeline);

    println!("\nServer starting...");
    println!("  Form: http://{}/", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
