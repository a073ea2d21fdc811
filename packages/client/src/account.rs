//! Account lifecycle operations: login, registration, self-service profile

use std::sync::Arc;

use crate::api::{routes, ApiEnvelope, LoginRequest, RegisterRequest, SelfUpdateRequest};
use crate::error::ClientResult;
use crate::gateway::Gateway;
use crate::types::Identity;

/// Account operations for the current principal
pub struct AccountApi {
    gateway: Arc<Gateway>,
}

impl AccountApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Authenticate with username and password.
    ///
    /// Returns the authenticated identity; the caller is expected to feed it
    /// into [`SessionStore::establish`](crate::session::SessionStore::establish).
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Identity> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        request.validate()?;
        let envelope: ApiEnvelope<Identity> =
            self.gateway.post(routes::USER_LOGIN, &request).await?;
        envelope.into_data()
    }

    /// Create a new account. Validation failures are rejected locally
    /// before any request is dispatched.
    pub async fn register(&self, request: RegisterRequest) -> ClientResult<()> {
        request.validate()?;
        let envelope: ApiEnvelope<serde_json::Value> =
            self.gateway.post(routes::USER_REGISTER, &request).await?;
        envelope.ok()
    }

    /// Fetch the authoritative record for the current principal
    pub async fn fetch_self(&self) -> ClientResult<Identity> {
        self.gateway.fetch_self().await
    }

    /// Update the current principal's profile
    pub async fn update_self(&self, request: SelfUpdateRequest) -> ClientResult<()> {
        request.validate()?;
        let envelope: ApiEnvelope<serde_json::Value> =
            self.gateway.put(routes::USER_SELF, &request).await?;
        envelope.ok()
    }

    /// Delete the current principal's account
    pub async fn delete_self(&self) -> ClientResult<()> {
        let envelope: ApiEnvelope<serde_json::Value> =
            self.gateway.delete(routes::USER_SELF).await?;
        envelope.ok()
    }

    /// (Re)generate the personal access token, replacing any prior token.
    /// Returns the new opaque token string.
    pub async fn regenerate_access_token(&self) -> ClientResult<String> {
        let envelope: ApiEnvelope<String> =
            self.gateway.get(routes::USER_ACCESS_TOKEN, &[]).await?;
        envelope.into_data()
    }
}
