//! Session command handlers: login, logout, whoami, register, password.

use std::fmt::Write as _;

use dialoguer::Input;
use rollcall_api::{Identity, Registration, User};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::cli::{LoginArgs, RegisterArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Detail views ────────────────────────────────────────────────────

pub(super) fn user_detail(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:      {}", user.id);
    let _ = writeln!(out, "Name:    {}", user.full_name);
    let _ = writeln!(out, "Email:   {}", user.email);
    let _ = writeln!(out, "Role:    {}", user.role);
    let _ = write!(out, "Active:  {}", output::yes_no(user.is_active));
    out
}

fn identity_detail(identity: &Identity) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "ID:      {}",
        identity.user_id.map(|id| id.to_string()).unwrap_or_default()
    );
    let _ = writeln!(out, "Name:    {}", util::or_dash(identity.display_name.as_deref()));
    let _ = writeln!(out, "Email:   {}", util::or_dash(identity.email.as_deref()));
    let _ = write!(out, "Role:    {}", util::or_dash(identity.role.as_deref()));
    out
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for a new password twice and check the entries match.
fn prompt_new_password() -> Result<SecretString, CliError> {
    let first = util::prompt_secret("New password: ")?;
    let second = util::prompt_secret("Repeat new password: ")?;
    if first.expose_secret() != second.expose_secret() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "passwords do not match".into(),
        });
    }
    Ok(first)
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn login(ctx: &Context<'_>, args: LoginArgs) -> Result<(), CliError> {
    let email = match args.email.or_else(|| ctx.profile.email.clone()) {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_err)?,
    };

    let password = match config::resolve_password(ctx.profile, ctx.profile_name) {
        Ok(secret) => secret,
        Err(rollcall_config::ConfigError::NoCredentials { .. }) => {
            debug!("no stored password, prompting");
            util::prompt_secret("Password: ")?
        }
        Err(other) => return Err(other.into()),
    };

    let user = util::settle(ctx.client().auth().login(&email, &password).await)?;
    output::print_status(
        &format!("✓ Signed in as {} ({})", user.full_name, user.role),
        ctx.global.quiet,
    );
    Ok(())
}

pub async fn logout(ctx: &Context<'_>) -> Result<(), CliError> {
    let ack = util::settle(ctx.client().auth().logout().await)?;
    output::print_status(&format!("✓ {}", ack.message), ctx.global.quiet);
    Ok(())
}

pub async fn whoami(ctx: &Context<'_>, cached: bool) -> Result<(), CliError> {
    if cached {
        let identity = ctx.client().auth().cached_identity();
        if !identity.is_confirmed() {
            return Err(CliError::NotLoggedIn {
                profile: ctx.profile_name.to_owned(),
            });
        }
        let out = output::render_single(&ctx.global.output, &identity, identity_detail, |i| {
            i.user_id.map(|id| id.to_string()).unwrap_or_default()
        });
        output::print_output(&out, ctx.global.quiet);
        return Ok(());
    }

    let client = ctx.require_login()?;
    let user = util::settle(client.auth().current_user().await)?;
    let out = output::render_single(&ctx.global.output, &user, user_detail, |u| {
        u.id.to_string()
    });
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

pub async fn register(ctx: &Context<'_>, args: RegisterArgs) -> Result<(), CliError> {
    let password = prompt_new_password()?;
    let registration = Registration {
        email: args.email,
        password: password.expose_secret().to_owned(),
        full_name: args.name,
        role: args.role,
    };

    let user = util::settle(ctx.client().auth().register(&registration).await)?;
    let out = output::render_single(&ctx.global.output, &user, user_detail, |u| {
        u.id.to_string()
    });
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

pub async fn change_password(ctx: &Context<'_>) -> Result<(), CliError> {
    let client = ctx.require_login()?;
    let current = util::prompt_secret("Current password: ")?;
    let new = prompt_new_password()?;

    let ack = util::settle(client.auth().change_password(&current, &new).await)?;
    output::print_status(&format!("✓ {}", ack.message), ctx.global.quiet);
    Ok(())
}
