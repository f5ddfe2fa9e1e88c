//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// iconcache - inspect and maintain the app icon cache
///
/// Works directly on the icon database: lists stored entries, purges
/// packages and clears the table.
#[derive(Parser, Debug)]
#[command(name = "iconcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ICONCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Icon database path (overrides cache.db_path)
    #[arg(long, global = true, env = "ICONCACHE_DB")]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stored icon entries
    List(ListArgs),

    /// Show database statistics
    Stats(StatsArgs),

    /// Remove every entry of a package for one user
    Purge(PurgeArgs),

    /// Remove every stored entry
    Clear(ClearArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only entries of this package
    #[arg(short, long)]
    pub package: Option<String>,

    /// Only entries of this user serial
    #[arg(short, long)]
    pub user_serial: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct PurgeArgs {
    /// Package name
    pub package: String,

    /// User serial owning the entries
    #[arg(short, long, default_value_t = 0)]
    pub user_serial: i64,
}

#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration loaded from the file
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Set one value, e.g. `icons.icon_size 96`
    Set {
        /// Dot-separated key
        key: String,

        value: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Plain,
}
