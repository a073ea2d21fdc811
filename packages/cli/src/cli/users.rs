//! Admin user-management commands

use anyhow::anyhow;
use clap::{Args, Subcommand};
use colored::*;
use comfy_table::{presets::UTF8_FULL, Table};
use inquire::Confirm;

use konto_client::api::{UserCreateRequest, UserUpdateRequest};
use konto_client::{Identity, Page, Role, UserStatus};

use super::context::AppContext;
use super::PageArgs;

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// List user accounts
    List(PageArgs),
    /// Search accounts by username, display name or email
    Search(UserSearchArgs),
    /// Show one account
    Get { id: i64 },
    /// Create an account
    Create(UserCreateArgs),
    /// Update an account; unset flags keep their current values
    Update(UserUpdateArgs),
    /// Delete an account
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct UserSearchArgs {
    pub keyword: String,
    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Args)]
pub struct UserCreateArgs {
    pub username: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Role tier (0 guest, 1 user, 10 admin, 100 root)
    #[arg(long, default_value = "1")]
    pub role: i32,
}

#[derive(Debug, Args)]
pub struct UserUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// Role tier (0 guest, 1 user, 10 admin, 100 root)
    #[arg(long)]
    pub role: Option<i32>,
    /// Account status: enabled or disabled
    #[arg(long)]
    pub status: Option<String>,
}

fn parse_role(tier: i32) -> anyhow::Result<Role> {
    Role::try_from(tier).map_err(|e| anyhow!(e))
}

fn parse_status(value: &str) -> anyhow::Result<UserStatus> {
    match value.to_lowercase().as_str() {
        "enabled" => Ok(UserStatus::Enabled),
        "disabled" => Ok(UserStatus::Disabled),
        other => Err(anyhow!("unknown status '{}', expected enabled or disabled", other)),
    }
}

fn print_user_page(page: &Page<Identity>) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "ID", "Username", "Display name", "Email", "Role", "Status",
    ]);
    for user in &page.items {
        table.add_row(vec![
            user.id.to_string(),
            user.username.clone(),
            user.display_name.clone().unwrap_or_else(|| "-".to_string()),
            user.email.clone().unwrap_or_else(|| "-".to_string()),
            user.role.to_string(),
            match user.status {
                UserStatus::Enabled => "enabled".green().to_string(),
                UserStatus::Disabled => "disabled".red().to_string(),
            },
        ]);
    }
    println!("{table}");
    println!(
        "page {} of {} ({} users)",
        page.page,
        page.total_pages().max(1),
        page.total
    );
}

pub async fn handle_user_command(ctx: &AppContext, command: UserCommands) -> anyhow::Result<()> {
    ctx.require_role(Role::Admin)?;
    let admin = ctx.admin();

    match command {
        UserCommands::List(args) => {
            let page = admin.list(args.page, args.page_size).await?;
            print_user_page(&page);
            Ok(())
        }
        UserCommands::Search(args) => {
            let page = admin
                .search(&args.keyword, args.page.page, args.page.page_size)
                .await?;
            print_user_page(&page);
            Ok(())
        }
        UserCommands::Get { id } => {
            let user = admin.get(id).await?;
            println!("{:>13}: {}", "id", user.id);
            println!("{:>13}: {}", "username", user.username);
            println!("{:>13}: {}", "display name", user.display_label());
            println!("{:>13}: {}", "email", user.email.as_deref().unwrap_or("-"));
            println!("{:>13}: {}", "role", user.role);
            println!(
                "{:>13}: {}",
                "status",
                match user.status {
                    UserStatus::Enabled => "enabled".green(),
                    UserStatus::Disabled => "disabled".red(),
                }
            );
            Ok(())
        }
        UserCommands::Create(args) => {
            let request = UserCreateRequest {
                username: args.username.clone(),
                password: args.password,
                display_name: args.display_name,
                email: args.email,
                role: parse_role(args.role)?,
                status: UserStatus::Enabled,
            };
            admin.create(request).await?;
            println!("✅ User {} created", args.username.green());
            Ok(())
        }
        UserCommands::Update(args) => {
            let current = admin.get(args.id).await?;

            let request = UserUpdateRequest {
                id: args.id,
                username: args.username.unwrap_or(current.username),
                display_name: args.display_name.or(current.display_name),
                email: args.email.or(current.email),
                password: args.password,
                role: match args.role {
                    Some(tier) => parse_role(tier)?,
                    None => current.role,
                },
                status: match args.status.as_deref() {
                    Some(value) => parse_status(value)?,
                    None => current.status,
                },
            };
            admin.update(request).await?;
            println!("✅ User {} updated", args.id);
            Ok(())
        }
        UserCommands::Delete { id } => {
            let user = admin.get(id).await?;
            let confirmed = Confirm::new(&format!("Delete user '{}'?", user.username))
                .with_default(false)
                .prompt()?;
            if !confirmed {
                println!("Aborted");
                return Ok(());
            }
            admin.delete(id).await?;
            println!("✅ User {} deleted", user.username);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_accepts_both_states() {
        assert_eq!(parse_status("enabled").unwrap(), UserStatus::Enabled);
        assert_eq!(parse_status("Disabled").unwrap(), UserStatus::Disabled);
        assert!(parse_status("banned").is_err());
    }

    #[test]
    fn role_parsing_rejects_unknown_tiers() {
        assert_eq!(parse_role(10).unwrap(), Role::Admin);
        assert!(parse_role(7).is_err());
    }
}
