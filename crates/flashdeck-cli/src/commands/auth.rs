//! Login, registration and logout

use anyhow::{bail, Result};

use flashdeck_core::api::auth;
use flashdeck_core::{AppContext, RegistrationForm};

use crate::editor::prompt_password;
use crate::output::Output;

pub async fn login(
    ctx: &AppContext,
    email: String,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password")?,
    };

    auth::login(ctx.client(), &email, &password).await?;

    let expires = ctx
        .credentials()
        .expires_at()
        .map(|t| t.format(" until %Y-%m-%d").to_string())
        .unwrap_or_default();
    output.success(&format!("Logged in as {}{}", email, expires));
    Ok(())
}

/// Create an account; every problem with the form is reported at once
pub async fn register(ctx: &AppContext, email: String, output: &Output) -> Result<()> {
    let password = prompt_password("Password")?;
    let confirm_password = prompt_password("Confirm password")?;

    let form = RegistrationForm::new(&email, &password, &confirm_password);
    if let Err(errors) = form.validate() {
        bail!("{}", errors.join("\n"));
    }

    let user = auth::register(ctx.client(), &form).await?;
    output.success(&format!(
        "Registered {}. Check your inbox for the activation link.",
        user.email
    ));
    Ok(())
}

pub async fn activate(ctx: &AppContext, token: String, output: &Output) -> Result<()> {
    auth::activate(ctx.client(), &token).await?;
    output.success("Account activated. You can log in now.");
    Ok(())
}

pub fn logout(ctx: &AppContext, output: &Output) -> Result<()> {
    if !ctx.is_authenticated() {
        output.message("Not logged in.");
        return Ok(());
    }
    ctx.logout()?;
    output.success("Logged out");
    Ok(())
}
