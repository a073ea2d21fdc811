//! CLI command handlers

use clap::Args;

pub mod account;
pub mod context;
pub mod tokens;
pub mod users;

/// Pagination flags shared by listing commands
#[derive(Debug, Args)]
pub struct PageArgs {
    #[arg(long, default_value = "1")]
    pub page: u32,
    #[arg(long, default_value = "10")]
    pub page_size: u32,
}
