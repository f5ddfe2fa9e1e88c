//! Purge command - drop one package's entries

use crate::cache::IconStore;
use crate::cli::args::PurgeArgs;
use crate::config::Config;
use crate::error::IconCacheResult;
use crate::ui::{self, UiContext};
use tracing::info;

/// Execute the purge command
pub async fn execute(args: PurgeArgs, config: &Config) -> IconCacheResult<()> {
    let ctx = UiContext::detect();
    let mut store = super::open_store(config).await?;

    let removed = store.delete_package(&args.package, args.user_serial)?;
    info!(
        "Purged {} entr(ies) for {} (user {})",
        removed, args.package, args.user_serial
    );

    if removed == 0 {
        ui::step_info(
            &ctx,
            &format!(
                "No entries for {} (user {})",
                args.package, args.user_serial
            ),
        );
    } else {
        ui::step_ok(
            &ctx,
            &format!(
                "Removed {} entr{} for {}",
                removed,
                if removed == 1 { "y" } else { "ies" },
                args.package
            ),
        );
    }

    Ok(())
}
