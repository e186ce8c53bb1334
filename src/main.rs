//! Sundial entry point.

use clap::{Parser, Subcommand};
use sundial::chat::{ChatSession, McpToolProvider, OllamaEngine};
use sundial::{run_server, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sundial: conversational calendar assistant
#[derive(Parser, Debug)]
#[command(name = "sundial")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the calendar tool server over stdio (default)
    Serve {
        /// Enable JSON logging format
        #[arg(long)]
        json_logs: bool,
    },
    /// Chat with the assistant in the terminal
    Chat {
        /// Override the configured model name
        #[arg(short, long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Chat { model }) => run_chat(&args.config, model).await,
        Some(Command::Serve { json_logs }) => run_serve(&args.config, json_logs).await,
        None => run_serve(&args.config, false).await,
    }
}

async fn run_serve(config_path: &Option<String>, json_logs: bool) -> anyhow::Result<()> {
    // stdout carries the MCP stream, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Starting Sundial MCP server v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(config_path)?;
    run_server(config).await
}

async fn run_chat(config_path: &Option<String>, model: Option<String>) -> anyhow::Result<()> {
    // Keep the terminal clean unless RUST_LOG asks for more
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = load_config(config_path)?;
    if let Some(model) = model {
        config.llm.model = model;
    }

    let engine = OllamaEngine::new(&config.llm)?;
    let provider = McpToolProvider::spawn(config_path.as_deref()).await?;
    let mut session = ChatSession::new(engine, provider).await?;
    session.run().await
}

fn load_config(config_path: &Option<String>) -> anyhow::Result<Config> {
    // Environment overrides apply to explicit config files too.
    let config = if let Some(path) = config_path {
        Config::from_file(path)?.with_env_overrides()
    } else {
        Config::load()?
    };
    Ok(config)
}
