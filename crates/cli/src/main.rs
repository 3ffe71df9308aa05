//! SkillSwap command-line client

mod commands;
mod logging;
mod state_dir;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use commands::Commands;
use skillswap_api::{ApiClient, ClientConfig, FileSessionStore, SessionState};
use state_dir::StateDir;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, error, info};

#[derive(Parser)]
#[command(name = "skillswap")]
#[command(about = "Command-line client for the SkillSwap social network")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory holding the session, configuration and log files
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to config.toml in the config directory)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base address
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Timeout for the command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state_dir = cli
        .data_dir
        .clone()
        .map_or_else(StateDir::new, StateDir::with_override);
    logging::init_logging(cli.log_level.into(), &state_dir.log_path(), cli.no_file_log)?;
    state_dir.create_directories()?;

    let client = build_client(&cli, &state_dir)?;
    info!(api = client.api_base(), "Starting SkillSwap CLI");

    // Streaming commands run until interrupted
    let timeout = if cli.timeout == 0 || cli.command.is_long_running() {
        None
    } else {
        Some(Duration::from_secs(cli.timeout))
    };

    let outcome = match timeout {
        None => cli.command.execute(&client).await,
        Some(duration) => match tokio::time::timeout(duration, cli.command.execute(&client)).await
        {
            Ok(result) => result,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        },
    };

    if let SessionState::Expired { redirect_to } = client.session_state() {
        debug!(%redirect_to, "Session expired");
        eprintln!("Your session has expired. Run `skillswap login` to sign in again.");
    }

    match outcome {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn build_client(cli: &Cli, state_dir: &StateDir) -> Result<ApiClient> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| state_dir.config_path());
    let mut config = ClientConfig::load(Some(&config_path))
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    if let Some(api_url) = &cli.api_url {
        config.api_url.clone_from(api_url);
    }

    let store = FileSessionStore::new(state_dir.session_path());
    debug!(session = %store.path().display(), "Using session file");

    ApiClient::builder()
        .config(config)
        .store(Arc::new(store))
        .build()
        .context("Failed to create API client")
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
