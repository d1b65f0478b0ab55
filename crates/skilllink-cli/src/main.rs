//! `SkillLink` CLI
//!
//! Terminal client for the `SkillLink` freelance marketplace.
//! Provides both TUI (ratatui) and headless modes.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use skilllink_cli::api::ApiClient;
use skilllink_cli::app::App;
use skilllink_cli::commands::{self, Command};
use skilllink_cli::storage::ClientStorage;
use skilllink_cli::tui;
use skilllink_core::Route;
use skilllink_core::config::{self, Config};
use skilllink_core::tracing_init::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "skilllink")]
#[command(version, about = "SkillLink marketplace client", long_about = None)]
struct Cli {
    /// Backend origin, e.g. `http://127.0.0.1:8000`
    #[arg(long)]
    base_url: Option<String>,

    /// Client storage file (session token, remembered email)
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Extra settings file, applied over the global one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Run one command and exit instead of starting the TUI
    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(path) = cli.storage {
        config.storage.path = Some(path);
    }

    // Use file-based tracing for TUI mode to avoid polluting terminal
    if cli.command.is_some() {
        init_tracing(
            &format!("skilllink={}", config.api.log_level),
            cli.log_json,
            None,
        )?;
    } else {
        init_tracing("skilllink=warn", cli.log_json, config::log_file_path().as_deref())?;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "Starting skilllink"
    );

    let storage = Arc::new(open_storage(&config));
    let api = ApiClient::new(&config.api.base_url, Arc::clone(&storage))?;

    match cli.command {
        Some(command) => {
            let mut out = io::stdout().lock();
            commands::run(command, &api, &storage, &mut out).await
        }
        None => {
            let (app, initial) = App::new(Route::Marketplace, storage, config.ui.clone());
            tui::run(api, app, initial).await
        }
    }
}

fn open_storage(config: &Config) -> ClientStorage {
    match config
        .storage
        .path
        .clone()
        .or_else(config::default_storage_path)
    {
        Some(path) => ClientStorage::open(path),
        None => ClientStorage::in_memory(),
    }
}
