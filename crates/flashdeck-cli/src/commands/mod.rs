//! Command handlers, one module per top-level subcommand

pub mod account;
pub mod auth;
pub mod cards;
pub mod config;
pub mod notifications;
pub mod profile;
pub mod review;
pub mod stats;
pub mod status;

use anyhow::{bail, Result};

use flashdeck_core::AppContext;

/// Fail early when there is no usable session
pub fn require_session(ctx: &AppContext) -> Result<()> {
    if !ctx.is_authenticated() {
        bail!("Not logged in. Run `flashdeck login <email>` first.");
    }
    Ok(())
}
