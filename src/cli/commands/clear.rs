//! Clear command - drop every stored entry

use crate::cache::IconStore;
use crate::cli::args::ClearArgs;
use crate::config::Config;
use crate::error::IconCacheResult;
use crate::ui::{self, UiContext};

/// Execute the clear command
pub async fn execute(args: ClearArgs, config: &Config) -> IconCacheResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let mut store = super::open_store(config).await?;

    let count = store.count()?;
    if count == 0 {
        ui::step_info(&ctx, "Icon cache is already empty");
        return Ok(());
    }

    let question = format!("Remove all {} cached icon entries?", count);
    if !ui::confirm(&ctx, &question, false).await? {
        ui::step_warn_hint(&ctx, "Aborted", "Use --yes to clear without asking");
        return Ok(());
    }

    let removed = store.clear()?;
    ui::step_ok(&ctx, &format!("Cleared {} entries", removed));
    Ok(())
}
