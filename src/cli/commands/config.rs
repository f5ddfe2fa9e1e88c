//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{IconCacheError, IconCacheResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Keys accepted by `config set`
const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "cache.db_path",
    "cache.in_memory_cache",
    "cache.shortcut_icon_cache",
    "icons.icon_size",
    "icons.badge_scale",
    "worker.thread_name",
    "worker.apply_os_priority",
    "worker.foreground_nice",
    "worker.background_nice",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    manager: &ConfigManager,
    config: &Config,
) -> IconCacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            set_value(&mut updated, &key, &value)?;
            manager.save(&updated).await?;
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> IconCacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> IconCacheResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}

/// Apply one dot-separated key to `config`
fn set_value(config: &mut Config, key: &str, value: &str) -> IconCacheResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(IconCacheError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )))
            }
        },

        ["cache", "db_path"] => config.cache.db_path = Some(PathBuf::from(value)),
        ["cache", "in_memory_cache"] => config.cache.in_memory_cache = parse_bool(value)?,
        ["cache", "shortcut_icon_cache"] => config.cache.shortcut_icon_cache = parse_bool(value)?,

        ["icons", "icon_size"] => config.icons.icon_size = parse_number(value)?,
        ["icons", "badge_scale"] => {
            let scale: f32 = parse_number(value)?;
            if !(0.0..=1.0).contains(&scale) {
                return Err(IconCacheError::User(format!(
                    "badge_scale must be between 0 and 1, got {}",
                    value
                )));
            }
            config.icons.badge_scale = scale;
        }

        ["worker", "thread_name"] => config.worker.thread_name = value.to_string(),
        ["worker", "apply_os_priority"] => config.worker.apply_os_priority = parse_bool(value)?,
        ["worker", "foreground_nice"] => config.worker.foreground_nice = parse_number(value)?,
        ["worker", "background_nice"] => config.worker.background_nice = parse_number(value)?,

        _ => {
            return Err(IconCacheError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

fn parse_bool(value: &str) -> IconCacheResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(IconCacheError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> IconCacheResult<T> {
    value
        .parse()
        .map_err(|_| IconCacheError::User(format!("Invalid number: {}", value)))
}
