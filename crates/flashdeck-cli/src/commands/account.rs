//! Subscription and account deletion

use anyhow::{bail, Result};

use flashdeck_core::api::users;
use flashdeck_core::AppContext;

use super::require_session;
use crate::editor::confirm;
use crate::output::Output;

pub async fn cancel_subscription(ctx: &AppContext, force: bool, output: &Output) -> Result<()> {
    require_session(ctx)?;

    if !force && output.should_prompt() && !confirm("Cancel your premium subscription?")? {
        output.message("Cancelled.");
        return Ok(());
    }

    let response = users::cancel_subscription(ctx.client()).await?;
    let message = response
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Subscription cancelled");
    output.success(message);
    Ok(())
}

/// Permanently delete the account; asks first unless `force`
pub async fn delete(ctx: &AppContext, force: bool, output: &Output) -> Result<()> {
    require_session(ctx)?;

    if !force {
        if !output.should_prompt() {
            bail!("Refusing to delete the account without --force");
        }
        if !confirm("Delete your account and all cards? This cannot be undone.")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    users::delete_account(ctx.client()).await?;
    ctx.queries().clear();
    output.success("Account deleted");
    Ok(())
}
