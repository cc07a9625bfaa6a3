//! Status command handler

use anyhow::Result;

use flashdeck_core::AppContext;

use crate::output::{Output, OutputFormat};

/// Show session and server information
///
/// The due count is only fetched with a session; a failed fetch is shown,
/// not returned, so status always prints.
pub async fn show(ctx: &AppContext, output: &Output) -> Result<()> {
    let config = ctx.config();
    let credentials = ctx.credentials();
    let authenticated = ctx.is_authenticated();

    let due = if authenticated {
        Some(ctx.cards().due_cards().fetch().await.map(|cards| cards.len()))
    } else {
        None
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "logged_in": authenticated,
                    "user_id": credentials.user_id(),
                    "session_expires": credentials.expires_at(),
                    "due_cards": due.as_ref().and_then(|d| d.as_ref().ok()),
                    "error": due.as_ref().and_then(|d| d.as_ref().err()).map(|e| e.user_message()),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", if authenticated { "logged-in" } else { "logged-out" });
        }
        OutputFormat::Human => {
            println!("flashdeck Status");
            println!("================");
            println!();
            println!("Server:  {}", config.api_url);
            println!(
                "Session: {}",
                match credentials.expires_at() {
                    Some(expires) if authenticated =>
                        format!("logged in until {}", expires.format("%Y-%m-%d %H:%M")),
                    _ => "logged out".to_string(),
                }
            );
            if let Some(user_id) = credentials.user_id() {
                println!("User ID: {}", user_id);
            }
            match due {
                Some(Ok(count)) => println!("Due now: {}", count),
                Some(Err(e)) => println!("Due now: unavailable ({})", e.user_message()),
                None => {}
            }
            println!();
            println!("Theme:   {} / {}", config.theme_mode, config.color_theme);
            println!("Data:    {}", config.data_dir.display());
        }
    }

    Ok(())
}
