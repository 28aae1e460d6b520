use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use memweave::config::MemweaveConfig;
use memweave::{cli, server};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memweave", version, about = "Graph-structured working memory for AI agents, over MCP")]
struct Cli {
    /// Config file (defaults to ~/.memweave/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server
    Serve {
        /// Overrides `server.transport` from config
        #[arg(long, value_enum)]
        transport: Option<Transport>,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download all-MiniLM-L6-v2 into the model cache dir
    Download,
}

#[derive(Clone, Copy, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MemweaveConfig::load_from(path)?,
        None => MemweaveConfig::load()?,
    };

    // stdout carries MCP JSON-RPC on stdio, so logs go to stderr.
    let filter =
        EnvFilter::try_new(&config.server.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { transport } => {
            if let Some(transport) = transport {
                config.server.transport = match transport {
                    Transport::Stdio => "stdio".into(),
                    Transport::Http => "http".into(),
                };
            }
            server::serve(config).await?;
        }
        Command::Model {
            action: ModelAction::Download,
        } => cli::model_download(&config.embedding).await?,
    }

    Ok(())
}
