//! Stats command - summarize the icon database

use crate::cache::{IconStore, StoredRow, SCHEMA_VERSION};
use crate::cli::args::{OutputFormat, StatsArgs};
use crate::config::{Config, ConfigManager};
use crate::error::IconCacheResult;
use crate::model::ComponentName;
use crate::ui::{self, UiContext};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Serialize, PartialEq)]
struct CacheStats {
    db_path: String,
    db_size_bytes: u64,
    schema_version: i64,
    entries: usize,
    package_entries: usize,
    packages: usize,
    users: usize,
    oldest: Option<DateTime<Utc>>,
    newest: Option<DateTime<Utc>>,
}

impl CacheStats {
    fn from_rows(rows: &[StoredRow], db_path: String, db_size_bytes: u64) -> Self {
        let mut packages = BTreeSet::new();
        let mut users = BTreeSet::new();
        let mut package_entries = 0;

        for row in rows {
            users.insert(row.user_serial);
            if let Some(component) = ComponentName::unflatten(&row.component) {
                if component.is_package_component() {
                    package_entries += 1;
                }
                packages.insert(component.package().to_string());
            }
        }

        let times = rows
            .iter()
            .filter_map(|row| DateTime::from_timestamp_millis(row.last_updated));

        Self {
            db_path,
            db_size_bytes,
            schema_version: SCHEMA_VERSION,
            entries: rows.len(),
            package_entries,
            packages: packages.len(),
            users: users.len(),
            oldest: times.clone().min(),
            newest: times.max(),
        }
    }
}

/// Execute the stats command
pub async fn execute(args: StatsArgs, config: &Config) -> IconCacheResult<()> {
    let path = ConfigManager::db_path(config);
    let store = super::open_store(config).await?;
    let rows = store.list(None, None)?;
    let size = tokio::fs::metadata(&path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);

    let stats = CacheStats::from_rows(&rows, path.display().to_string(), size);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => print_plain(&stats),
        OutputFormat::Table => print_table(&stats),
    }
    Ok(())
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_table(stats: &CacheStats) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Icon cache");
    ui::key_value(&ctx, "Database", &stats.db_path);
    ui::key_value(&ctx, "Size", &format!("{} KiB", stats.db_size_bytes / 1024));
    ui::key_value(&ctx, "Schema", &stats.schema_version.to_string());
    ui::key_value(&ctx, "Entries", &stats.entries.to_string());
    ui::key_value(&ctx, "Package entries", &stats.package_entries.to_string());
    ui::key_value(&ctx, "Packages", &stats.packages.to_string());
    ui::key_value(&ctx, "Users", &stats.users.to_string());
    ui::key_value(&ctx, "Oldest", &format_time(stats.oldest));
    ui::key_value(&ctx, "Newest", &format_time(stats.newest));
}

fn print_plain(stats: &CacheStats) {
    println!("entries={}", stats.entries);
    println!("packages={}", stats.packages);
    println!("users={}", stats.users);
    println!("schema_version={}", stats.schema_version);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(component: &str, user_serial: i64, last_updated: i64) -> StoredRow {
        StoredRow {
            component: component.to_string(),
            user_serial,
            title: String::new(),
            content_description: String::new(),
            color: 0,
            icon: None,
            freshness: String::new(),
            last_updated,
        }
    }

    #[test]
    fn counts_packages_and_users() {
        let rows = vec![
            row("com.a/.Main", 0, 1_000),
            row("com.a/.", 0, 2_000),
            row("com.b/com.b.Main", 10, 3_000),
        ];
        let stats = CacheStats::from_rows(&rows, "icons.db".to_string(), 4096);

        assert_eq!(stats.entries, 3);
        assert_eq!(stats.package_entries, 1);
        assert_eq!(stats.packages, 2);
        assert_eq!(stats.users, 2);
        assert_eq!(stats.oldest.unwrap().timestamp_millis(), 1_000);
        assert_eq!(stats.newest.unwrap().timestamp_millis(), 3_000);
    }

    #[test]
    fn empty_database() {
        let stats = CacheStats::from_rows(&[], "icons.db".to_string(), 0);
        assert_eq!(stats.entries, 0);
        assert!(stats.oldest.is_none());
    }
}
