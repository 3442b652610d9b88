//! Herald server binary
//!
//! Starts the HTTP server that answers questions about one person.

use anyhow::Context;
use clap::Parser;
use herald_router::{config::ServerConfig, start_server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Herald - grounded Q&A about one person, streamed
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(about = "Streams grounded answers about one person", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,

    /// Provider API key (overrides the config file)
    #[arg(long, env = "OPENAI_KEY", hide_env_values = true)]
    openai_key: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            tracing::warn!("No config file specified, using defaults");
            ServerConfig::parse("bind_address = \"127.0.0.1\"\nbind_port = 3000\n")?
        }
    };

    if let Some(key) = args.openai_key {
        config.openai.api_key = Some(key);
    }
    if let Some(port) = args.port {
        config.bind_port = port;
    }

    start_server(config).await?;
    Ok(())
}
