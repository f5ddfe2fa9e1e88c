//! Confirmation prompt

use super::context::UiContext;
use crate::error::{IconCacheError, IconCacheResult};

/// Ask a yes/no question.
///
/// Auto-yes answers yes; non-interactive runs get `default` without asking.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> IconCacheResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }
    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    let answer = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message).initial_value(default).interact()
    })
    .await
    .map_err(|e| IconCacheError::Internal(format!("prompt task failed: {}", e)))?;

    answer.map_err(|e| IconCacheError::io("reading confirmation", e))
}
