//! snaptext command-line interface.
//!
//! ```text
//! snaptext serve [-H host] [-p port] [-c config]
//! snaptext extract <files>... [-c config] [--format text|json]
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use snaptext::download::render_all;
use snaptext::{BatchOrchestrator, BatchOutcome, MemorySessionStore, ServiceConfig, UploadItem};

#[derive(Parser)]
#[command(name = "snaptext")]
#[command(about = "Extract text from images with Tesseract OCR")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the upload server
    Serve {
        /// Address to bind to (overrides config and SNAPTEXT_HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config and SNAPTEXT_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to a snaptext.toml; discovered from the working directory if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run the extraction pipeline over local image files
    Extract {
        /// Image files, processed in the order given
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Path to a snaptext.toml; discovered from the working directory if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let config = ServiceConfig::load(path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_uploads(files: &[PathBuf]) -> Result<Vec<UploadItem>> {
    files
        .iter()
        .map(|path| {
            let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(UploadItem::new(filename, data))
        })
        .collect()
}

fn format_outcome(outcome: &BatchOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => {
            if outcome.results.is_empty() {
                return Ok(String::new());
            }
            Ok(render_all(Some(&outcome.results), Utc::now())?.body)
        }
    }
}

async fn extract(files: Vec<PathBuf>, config: Option<PathBuf>, format: OutputFormat) -> Result<ExitCode> {
    let config = load_config(config.as_deref())?;
    let engine = config.ocr.build_engine()?;
    let orchestrator = BatchOrchestrator::from_config(&config, engine, Arc::new(MemorySessionStore::new()))?;

    let items = read_uploads(&files)?;
    let outcome = orchestrator.run(items).await;

    print!("{}", format_outcome(&outcome, format)?);
    if format == OutputFormat::Json {
        println!();
    }

    match &outcome.error {
        Some(error) => {
            eprintln!("Error: {}", error);
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

async fn serve(host: Option<String>, port: Option<u16>, config: Option<PathBuf>) -> Result<ExitCode> {
    let mut config = load_config(config.as_deref())?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    snaptext::api::serve_with_config(config).await.context("Server error")?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, config } => serve(host, port, config).await,
        Commands::Extract { files, config, format } => extract(files, config, format).await,
    }
}
