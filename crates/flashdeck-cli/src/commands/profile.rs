//! Profile command handlers

use anyhow::{bail, Result};

use flashdeck_core::api::users;
use flashdeck_core::{AppContext, UserPatch};

use super::require_session;
use crate::output::Output;

pub async fn show(ctx: &AppContext, output: &Output) -> Result<()> {
    require_session(ctx)?;

    let user = users::profile(ctx.client()).await?;
    output.print_user(&user);
    Ok(())
}

pub async fn set(
    ctx: &AppContext,
    nickname: Option<String>,
    gender: Option<String>,
    output: &Output,
) -> Result<()> {
    require_session(ctx)?;

    let patch = UserPatch { nickname, gender };
    if patch.is_empty() {
        bail!("Nothing to change. Pass --nickname or --gender.");
    }

    let user = users::update_profile(ctx.client(), &patch).await?;
    output.success("Profile updated");
    output.print_user(&user);
    Ok(())
}
