//! API token commands

use clap::{Args, Subcommand};
use colored::*;
use comfy_table::{presets::UTF8_FULL, Table};
use inquire::Confirm;

use konto_client::api::TokenCreateRequest;
use konto_client::{ApiToken, Page, Quota, TokenStatus};

use super::context::AppContext;
use super::PageArgs;

#[derive(Debug, Subcommand)]
pub enum TokenCommands {
    /// List your API tokens
    List(PageArgs),
    /// Search your API tokens by name or key
    Search(SearchArgs),
    /// Create a new API token
    Create(TokenCreateArgs),
    /// Re-enable a disabled token
    Enable { id: i64 },
    /// Disable a token without deleting it
    Disable { id: i64 },
    /// Delete a token
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub keyword: String,
    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Args)]
pub struct TokenCreateArgs {
    pub name: String,
    /// Initial usage quota
    #[arg(long, default_value = "0", conflicts_with = "unlimited")]
    pub quota: i64,
    /// Ignore the numeric quota and allow unlimited usage
    #[arg(long)]
    pub unlimited: bool,
}

fn status_label(status: TokenStatus) -> ColoredString {
    match status {
        TokenStatus::Enabled => "enabled".green(),
        TokenStatus::Disabled => "disabled".red(),
        TokenStatus::Expired => "expired".yellow(),
        TokenStatus::Exhausted => "exhausted".yellow(),
    }
}

fn print_token_page(page: &Page<ApiToken>) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "ID", "Name", "Key", "Status", "Quota", "Created",
    ]);
    for token in &page.items {
        table.add_row(vec![
            token.id.to_string(),
            token.name.clone(),
            token.key.clone(),
            status_label(token.status).to_string(),
            token.quota().to_string(),
            token.created_time.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{table}");
    println!(
        "page {} of {} ({} tokens)",
        page.page,
        page.total_pages().max(1),
        page.total
    );
}

pub async fn handle_token_command(ctx: &AppContext, command: TokenCommands) -> anyhow::Result<()> {
    ctx.require_authenticated()?;
    let tokens = ctx.tokens();

    match command {
        TokenCommands::List(args) => {
            let page = tokens.list(args.page, args.page_size).await?;
            print_token_page(&page);
            Ok(())
        }
        TokenCommands::Search(args) => {
            let page = tokens
                .search(&args.keyword, args.page.page, args.page.page_size)
                .await?;
            print_token_page(&page);
            Ok(())
        }
        TokenCommands::Create(args) => {
            let quota = if args.unlimited {
                Quota::Unlimited
            } else {
                Quota::Remaining(args.quota)
            };
            let created = tokens
                .create(TokenCreateRequest::new(args.name, quota))
                .await?;

            println!("✅ Token {} created (quota: {})", created.name, created.quota());
            println!("🔑 Secret key - shown only once, store it now:");
            println!("   {}", created.key.yellow());
            Ok(())
        }
        TokenCommands::Enable { id } => {
            let token = tokens.get(id).await?;
            tokens.set_status(&token, TokenStatus::Enabled).await?;
            println!("✅ Token {} enabled", token.name);
            Ok(())
        }
        TokenCommands::Disable { id } => {
            let token = tokens.get(id).await?;
            tokens.set_status(&token, TokenStatus::Disabled).await?;
            println!("✅ Token {} disabled", token.name);
            Ok(())
        }
        TokenCommands::Delete { id } => {
            let token = tokens.get(id).await?;
            let confirmed = Confirm::new(&format!("Delete token '{}'?", token.name))
                .with_default(false)
                .prompt()?;
            if !confirmed {
                println!("Aborted");
                return Ok(());
            }
            tokens.delete(id).await?;
            println!("✅ Token {} deleted", token.name);
            Ok(())
        }
    }
}
