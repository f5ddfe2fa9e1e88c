//! CLI command implementations

pub mod clear;
pub mod config;
pub mod list;
pub mod purge;
pub mod stats;

pub use clear::execute as clear;
pub use config::execute as config;
pub use list::execute as list;
pub use purge::execute as purge;
pub use stats::execute as stats;

use crate::cache::SqliteIconStore;
use crate::config::{Config, ConfigManager};
use crate::error::IconCacheResult;
use tracing::debug;

/// Open the configured icon database, creating its directory if needed
pub(crate) async fn open_store(config: &Config) -> IconCacheResult<SqliteIconStore> {
    let path = ConfigManager::db_path(config);
    ConfigManager::ensure_db_dir(&path).await?;
    debug!("Using icon database {}", path.display());
    SqliteIconStore::open(&path)
}
