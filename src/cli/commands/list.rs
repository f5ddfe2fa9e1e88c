//! List command - show stored icon entries

use crate::cache::{IconStore, StoredRow};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::IconCacheResult;
use crate::ui::{self, UiContext};
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> IconCacheResult<()> {
    let store = super::open_store(config).await?;
    let rows = store.list(args.package.as_deref(), args.user_serial)?;

    if rows.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => ui::step_info(&UiContext::detect(), "No cached icons"),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Plain => print_plain(&rows),
    }

    Ok(())
}

#[derive(Serialize)]
struct EntryJson<'a> {
    component: &'a str,
    user_serial: i64,
    title: &'a str,
    content_description: &'a str,
    color: String,
    system_state: &'a str,
    last_updated: String,
}

fn format_time(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

fn print_table(rows: &[StoredRow]) {
    println!(
        "{:<48} {:<6} {:<24} {:<10} {:<16}",
        style("COMPONENT").bold(),
        style("USER").bold(),
        style("TITLE").bold(),
        style("COLOR").bold(),
        style("UPDATED").bold()
    );
    println!("{}", "-".repeat(108));

    for row in rows {
        let updated = format_time(row.last_updated)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let title = if row.title.is_empty() {
            style("(untitled)".to_string()).dim()
        } else {
            style(row.title.clone())
        };

        println!(
            "{:<48} {:<6} {:<24} {:<10} {:<16}",
            row.component,
            row.user_serial,
            title,
            format!("#{:08x}", row.color),
            updated
        );
    }

    println!();
    println!("{} entr{}", rows.len(), if rows.len() == 1 { "y" } else { "ies" });
}

fn print_json(rows: &[StoredRow]) -> IconCacheResult<()> {
    let entries: Vec<EntryJson<'_>> = rows
        .iter()
        .map(|row| EntryJson {
            component: &row.component,
            user_serial: row.user_serial,
            title: &row.title,
            content_description: &row.content_description,
            color: format!("#{:08x}", row.color),
            system_state: &row.freshness,
            last_updated: format_time(row.last_updated)
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn print_plain(rows: &[StoredRow]) {
    for row in rows {
        println!("{}\t{}", row.component, row.user_serial);
    }
}
