//! # chainchat CLI
//!
//! Command-line interface for chainchat - a conversational crypto assistant.
//!
//! ## Usage
//!
//! - `chainchat` - Start the interactive conversation
//! - `chainchat tools` - Show the fixed tool set
//!
//! Configuration comes from flags, an optional `chainchat.json`, and the
//! environment; the chat API key is required before any conversation starts.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{chat_command, tools_command};
use config::CliConfigLoader;

/// chainchat - a conversational crypto assistant
#[derive(Parser)]
#[command(name = "chainchat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A conversational crypto assistant with LLM tool calling")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key override for the chat endpoint
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL override for the chat endpoint
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Mail submission host override
    #[arg(long)]
    smtp_host: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the fixed tool set
    Tools,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(smtp_host) = &cli.smtp_host {
        loader = loader.with_smtp_host_override(smtp_host.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    chainchat_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    match cli.command {
        Some(Commands::Tools) => tools_command().await,
        None => chat_command(config_loader).await,
    }
}
