//! Statistics command handler

use anyhow::Result;

use flashdeck_core::AppContext;

use super::require_session;
use crate::output::Output;

pub async fn show(ctx: &AppContext, output: &Output) -> Result<()> {
    require_session(ctx)?;

    let stats = ctx.statistics().fetch().await?;
    output.print_statistics(&stats);
    Ok(())
}
