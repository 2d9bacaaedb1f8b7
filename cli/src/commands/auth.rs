//! Account commands: sign-up, sign-in, sign-out, password reset and whoami.

use anyhow::{Context as _, Result, bail};
use cabinet_business::{AuthFailure, Identity, Notice};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::{info, instrument};

use crate::context::CliContext;
use crate::output::Output;

struct Credentials {
    email: String,
    password: String,
}

fn prompt_credentials(confirm_password: bool) -> Result<Credentials> {
    let email = Text::new("Email:")
        .prompt()
        .context("Failed to read email")?;

    let mut password = Password::new("Password:").with_display_mode(PasswordDisplayMode::Masked);
    if confirm_password {
        password = password
            .with_custom_confirmation_message("Confirm password:")
            .with_help_message("At least 6 characters");
    } else {
        password = password.without_confirmation();
    }
    let password = password.prompt().context("Failed to read password")?;

    Ok(Credentials {
        email: email.trim().to_owned(),
        password,
    })
}

fn finish_sign_in(
    ctx: &CliContext,
    out: &Output,
    result: Result<Identity, AuthFailure>,
) -> Result<()> {
    match result {
        Ok(identity) => {
            ctx.persist(&identity)?;
            info!(user_id = %identity.user_id, "Session saved");
            out.success(format!("Signed in as {}", identity.email));
            Ok(())
        }
        Err(failure) => {
            out.error(Notice::from(failure));
            bail!("authentication failed")
        }
    }
}

#[instrument(skip_all, name = "signup")]
pub async fn run_signup(ctx: &CliContext) -> Result<()> {
    let out = Output::new();
    out.header("Create a cabinet account");

    let credentials = prompt_credentials(true)?;
    let result = ctx
        .session()
        .sign_up(&credentials.email, &credentials.password)
        .await;
    finish_sign_in(ctx, &out, result)
}

#[instrument(skip_all, name = "signin")]
pub async fn run_signin(ctx: &CliContext) -> Result<()> {
    let out = Output::new();
    out.header("Sign in to cabinet");

    let credentials = prompt_credentials(false)?;
    let result = ctx
        .session()
        .sign_in(&credentials.email, &credentials.password)
        .await;
    finish_sign_in(ctx, &out, result)
}

#[instrument(skip_all, name = "signout")]
pub async fn run_signout(ctx: &CliContext) -> Result<()> {
    let out = Output::new();

    let Some(identity) = ctx.restore().await? else {
        out.dim("Not signed in.");
        return Ok(());
    };

    if let Err(failure) = ctx.session().sign_out().await {
        out.error(Notice::from(failure));
        bail!("sign-out failed");
    }

    ctx.store().clear()?;
    out.success(format!("Signed out {}", identity.email));
    Ok(())
}

#[instrument(skip_all, name = "reset_password")]
pub async fn run_reset_password(ctx: &CliContext, email: &str) -> Result<()> {
    let out = Output::new();

    if let Err(failure) = ctx.session().send_password_reset(email.trim()).await {
        out.error(Notice::from(failure));
        bail!("password reset failed");
    }

    out.success(format!("Password reset email sent to {}", email.trim()));
    Ok(())
}

#[instrument(skip_all, name = "whoami")]
pub async fn run_whoami(ctx: &CliContext) -> Result<()> {
    let out = Output::new();

    match ctx.restore().await? {
        Some(identity) => {
            out.success(format!("Signed in as {}", identity.email));
            out.labeled("User ID", &identity.user_id);
            out.labeled("Session file", ctx.store().path().display());
        }
        None => {
            out.dim("Not signed in.");
            out.dim("Use `cabinet signin` to sign in.");
        }
    }
    Ok(())
}
