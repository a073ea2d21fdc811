//! Account and profile commands

use clap::{Args, Subcommand};
use colored::*;
use inquire::{Confirm, Password, PasswordDisplayMode};

use konto_client::api::{RegisterRequest, SelfUpdateRequest};
use konto_client::UserStatus;

use super::context::AppContext;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (or registered email address)
    pub username: String,
    /// Password; prompted interactively when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    pub username: String,
    /// Email address to attach to the account
    #[arg(long)]
    pub email: Option<String>,
    /// Password; prompted interactively (with confirmation) when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    /// Update profile fields; unset flags keep their current values
    Update(ProfileUpdateArgs),
    /// (Re)generate the personal access token
    RegenToken,
    /// Delete your account
    Delete,
}

#[derive(Debug, Args)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Set a new password
    #[arg(long)]
    pub password: Option<String>,
}

fn prompt_password(confirm: bool) -> anyhow::Result<String> {
    let mut prompt = Password::new("Password:").with_display_mode(PasswordDisplayMode::Masked);
    if !confirm {
        prompt = prompt.without_confirmation();
    }
    Ok(prompt.prompt()?)
}

pub async fn handle_login(ctx: &AppContext, args: LoginArgs) -> anyhow::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password(false)?,
    };

    let identity = ctx.account().login(&args.username, &password).await?;
    ctx.session.establish(identity.clone()).await?;

    println!(
        "✅ Logged in as {} ({})",
        identity.display_label().green(),
        identity.role
    );
    Ok(())
}

pub async fn handle_logout(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.session.clear(&ctx.gateway).await;
    println!("👋 Logged out");
    Ok(())
}

pub async fn handle_register(ctx: &AppContext, args: RegisterArgs) -> anyhow::Result<()> {
    let password = match args.password {
        // confirmation prompt rejects mismatched entries locally
        Some(password) => password,
        None => prompt_password(true)?,
    };

    ctx.account()
        .register(RegisterRequest {
            username: args.username.clone(),
            password,
            email: args.email,
        })
        .await?;

    println!(
        "✅ Account {} created - run `konto login` to sign in",
        args.username.green()
    );
    Ok(())
}

pub fn handle_whoami(ctx: &AppContext) -> anyhow::Result<()> {
    let identity = ctx.require_authenticated()?;

    println!("{:>13}: {}", "id", identity.id);
    println!("{:>13}: {}", "username", identity.username);
    println!("{:>13}: {}", "display name", identity.display_label());
    println!(
        "{:>13}: {}",
        "email",
        identity.email.as_deref().unwrap_or("-")
    );
    println!("{:>13}: {}", "role", identity.role);
    println!(
        "{:>13}: {}",
        "status",
        match identity.status {
            UserStatus::Enabled => "enabled".green(),
            UserStatus::Disabled => "disabled".red(),
        }
    );
    println!(
        "{:>13}: {}",
        "access token",
        if identity.bearer_token().is_some() {
            "present"
        } else {
            "none"
        }
    );
    Ok(())
}

pub async fn handle_profile_command(
    ctx: &AppContext,
    command: ProfileCommands,
) -> anyhow::Result<()> {
    match command {
        ProfileCommands::Update(args) => {
            let current = ctx.require_authenticated()?;

            // merge flags over the current record; the backend replaces
            // every field it receives
            let request = SelfUpdateRequest {
                username: args.username.unwrap_or(current.username),
                display_name: args.display_name.or(current.display_name),
                email: args.email.or(current.email),
                password: args.password,
            };
            ctx.account().update_self(request).await?;

            // re-read server truth so the snapshot matches what was stored
            let updated = ctx.account().fetch_self().await?;
            ctx.session.refresh(updated).await?;

            println!("✅ Profile updated");
            Ok(())
        }
        ProfileCommands::RegenToken => {
            let mut current = ctx.require_authenticated()?;

            let token = ctx.account().regenerate_access_token().await?;
            current.access_token = Some(token.clone());
            ctx.session.refresh(current).await?;

            println!("🔑 New access token (replaces any previous one):");
            println!("   {}", token.yellow());
            Ok(())
        }
        ProfileCommands::Delete => {
            ctx.require_authenticated()?;

            let confirmed = Confirm::new("Delete your account? This cannot be undone.")
                .with_default(false)
                .prompt()?;
            if !confirmed {
                println!("Aborted");
                return Ok(());
            }

            ctx.account().delete_self().await?;
            ctx.session.invalidate().await;
            println!("✅ Account deleted");
            Ok(())
        }
    }
}
