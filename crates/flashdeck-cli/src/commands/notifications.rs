//! Notification settings command handlers

use anyhow::{Context, Result};

use flashdeck_core::api::users;
use flashdeck_core::{AppContext, NotificationSettings};

use super::require_session;
use crate::output::Output;

pub async fn show(ctx: &AppContext, output: &Output) -> Result<()> {
    require_session(ctx)?;

    let settings = users::notification_settings(ctx.client()).await?;
    output.print_notification_settings(&settings);
    Ok(())
}

/// Change one setting; the rest are sent back as the server reported them
pub async fn set(ctx: &AppContext, key: String, value: String, output: &Output) -> Result<()> {
    require_session(ctx)?;

    let mut settings = users::notification_settings(ctx.client()).await?;
    apply(&mut settings, &key, &value)?;

    let saved = users::update_notification_settings(ctx.client(), &settings).await?;
    output.success(&format!("Set {} = {}", key, value));
    output.print_notification_settings(&saved);
    Ok(())
}

fn apply(settings: &mut NotificationSettings, key: &str, value: &str) -> Result<()> {
    if key == "study_reminder_time" || key == "reminder_time" {
        settings.set_reminder_time(value)?;
        return Ok(());
    }

    let enabled = match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => true,
        "off" | "false" | "no" => false,
        _ => {
            return Err(anyhow::anyhow!("Use on or off")).with_context(|| {
                format!("Invalid value '{}' for {}", value, key)
            })
        }
    };
    settings.set_flag(key, enabled)?;
    Ok(())
}
