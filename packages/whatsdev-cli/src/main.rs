//! WhatsDev CLI - offline tooling for the unread tracker
//!
//! This binary can:
//! - Replay a recorded stream of title/poll/focus events through the tracker
//! - Show the configuration the desktop shell would use

mod replay;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use whatsdev_core::config;

#[derive(Parser)]
#[command(name = "whatsdev-cli")]
#[command(author = "WhatsDev contributors")]
#[command(version)]
#[command(about = "Inspect and replay WhatsDev unread tracking")]
#[command(long_about = "
WhatsDev CLI drives the same unread tracker the desktop shell uses, without
a window. Record page events as JSON lines and replay them to see which
notifications and tooltips the shell would produce.

Event lines:
  {\"type\":\"title\",\"title\":\"(2) WhatsApp\"}
  {\"type\":\"poll\",\"chats\":[{\"name\":\"Alice\",\"count\":\"2\",\"lastMessage\":\"hi\"}]}
  {\"type\":\"poll_failed\",\"reason\":\"timeout\"}
  {\"type\":\"focus_gained\"}
  {\"type\":\"focus_lost\"}
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a JSON-lines event file through the tracker
    Replay {
        /// Event file, one JSON object per line
        file: PathBuf,
    },

    /// Show configuration paths and settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("whatsdev_cli={},whatsdev_core={}", log_level, log_level).into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Replay { file } => replay::run_replay(file, cli.format).await,
        Commands::Config => cmd_config(&cli),
    }
}

fn cmd_config(cli: &Cli) -> Result<()> {
    let effective = config::load_config();

    match cli.format {
        OutputFormat::Text => {
            println!("Config file: {}", config::config_file_path_string());
            println!("URL source:  {}", effective.source);
            println!();
            println!("  app_name              = {}", effective.app_name);
            println!("  url                   = {}", effective.url);
            println!("  poll_interval_secs    = {}", effective.poll_interval_secs);
            println!("  poll_timeout_secs     = {}", effective.poll_timeout_secs);
            println!("  notifications_enabled = {}", effective.notifications_enabled);
            println!("  start_hidden          = {}", effective.start_hidden);
            println!();
            println!("Example config:");
            println!();
            print!("{}", config::generate_example_config());
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "config_file": config::config_file_path_string(),
                    "source": effective.source.to_string(),
                    "config": effective,
                })
            );
        }
    }

    Ok(())
}
