//! Konto client core
//!
//! Session and authorization model for the Konto account console: a
//! persisted session store reconciled with server truth once per process,
//! and an authorized request gateway that injects the bearer credential and
//! tears the session down when the backend rejects it. The typed REST
//! surfaces (account, admin users, API tokens) sit on top of the gateway.

pub mod account;
pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod tokens;
pub mod types;
pub mod users;

// Re-export commonly used types
pub use account::AccountApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use gateway::{AuthEvent, Gateway};
pub use session::{SessionPhase, SessionStore};
pub use tokens::TokenApi;
pub use types::{ApiToken, Identity, Page, Quota, Role, TokenStatus, UserStatus};
pub use users::AdminApi;
