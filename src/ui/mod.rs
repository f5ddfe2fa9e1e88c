//! Terminal output for the iconcache CLI
//!
//! Interactive terminals get `cliclack` log lines and prompts; pipes and CI
//! get plain, prefixed lines that are easy to grep.

mod context;
mod output;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{intro, key_value, remark, step_info, step_ok, step_ok_detail, step_warn, step_warn_hint};
pub use prompts::confirm;
pub use theme::{init_theme, IconCacheTheme};
