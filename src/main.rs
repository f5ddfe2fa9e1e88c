//! iconcache - app icon cache maintenance
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use iconcache::cli::{Cli, Commands};
use iconcache::config::{Config, ConfigManager};
use iconcache::error::IconCacheResult;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> IconCacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);
    iconcache::ui::init_theme();
    debug!("Loaded configuration from {}", config_manager.path().display());

    match cli.command {
        Commands::List(args) => {
            iconcache::cli::commands::list(args, &with_db_override(config, cli.db)).await
        }
        Commands::Stats(args) => {
            iconcache::cli::commands::stats(args, &with_db_override(config, cli.db)).await
        }
        Commands::Purge(args) => {
            iconcache::cli::commands::purge(args, &with_db_override(config, cli.db)).await
        }
        Commands::Clear(args) => {
            iconcache::cli::commands::clear(args, &with_db_override(config, cli.db)).await
        }
        // Edits the file as loaded; `--db` never reaches it
        Commands::Config(args) => {
            iconcache::cli::commands::config(args, &config_manager, &config).await
        }
    }
}

/// Apply `--db` / `ICONCACHE_DB` for commands that open the database
fn with_db_override(mut config: Config, db: Option<PathBuf>) -> Config {
    if let Some(db) = db {
        config.cache.db_path = Some(db);
    }
    config
}

/// 0 = warn, 1 = info, 2+ = debug; `RUST_LOG` wins when set
fn init_logging(verbose: u8, log_format: &str) {
    let default = match verbose {
        0 => "iconcache=warn",
        1 => "iconcache=info",
        _ => "iconcache=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
