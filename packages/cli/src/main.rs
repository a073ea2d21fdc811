use clap::{Parser, Subcommand};
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::account::{LoginArgs, ProfileCommands, RegisterArgs};
use cli::context::AppContext;
use cli::tokens::TokenCommands;
use cli::users::UserCommands;
use konto_client::AuthEvent;

#[derive(Parser)]
#[command(name = "konto")]
#[command(about = "Konto CLI - account console client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login(LoginArgs),
    /// Log out and clear the persisted session
    Logout,
    /// Create a new account
    Register(RegisterArgs),
    /// Show the current identity
    Whoami,
    /// Manage your own profile
    #[command(subcommand)]
    Profile(ProfileCommands),
    /// Manage your API tokens
    #[command(subcommand)]
    Token(TokenCommands),
    /// Administer user accounts (admin only)
    #[command(subcommand)]
    User(UserCommands),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        eprintln!("{} {}", "❌".red(), e);
        process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let ctx = AppContext::init().await?;

    // subscribe after hydration so only in-command authorization loss is
    // reported here
    let mut auth_events = ctx.gateway.subscribe();

    let result = match command {
        Commands::Login(args) => cli::account::handle_login(&ctx, args).await,
        Commands::Logout => cli::account::handle_logout(&ctx).await,
        Commands::Register(args) => cli::account::handle_register(&ctx, args).await,
        Commands::Whoami => cli::account::handle_whoami(&ctx),
        Commands::Profile(command) => cli::account::handle_profile_command(&ctx, command).await,
        Commands::Token(command) => cli::tokens::handle_token_command(&ctx, command).await,
        Commands::User(command) => cli::users::handle_user_command(&ctx, command).await,
    };

    if matches!(auth_events.try_recv(), Ok(AuthEvent::AuthorizationLost)) {
        eprintln!(
            "{}",
            "Session expired - run `konto login` to sign in again.".yellow()
        );
    }

    result
}
