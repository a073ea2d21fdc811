//! API token management for the current principal.
//!
//! API tokens are distinct from the personal access token embedded in the
//! identity: they are named, individually revocable, and carry their own
//! quota. Only the owning user can read or mutate them.

use std::sync::Arc;

use crate::api::{routes, ApiEnvelope, TokenCreateRequest, TokenUpdateRequest};
use crate::error::ClientResult;
use crate::gateway::Gateway;
use crate::types::{ApiToken, Page, TokenStatus};

/// CRUD over the caller's own API tokens
pub struct TokenApi {
    gateway: Arc<Gateway>,
}

impl TokenApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// List the caller's tokens, newest first
    pub async fn list(&self, page: u32, page_size: u32) -> ClientResult<Page<ApiToken>> {
        self.gateway.get_page(routes::TOKENS, &[], page, page_size).await
    }

    /// Search the caller's tokens by name or key
    pub async fn search(
        &self,
        keyword: &str,
        page: u32,
        page_size: u32,
    ) -> ClientResult<Page<ApiToken>> {
        self.gateway
            .get_page(
                routes::TOKENS_SEARCH,
                &[("keyword", keyword.to_string())],
                page,
                page_size,
            )
            .await
    }

    /// Fetch a single token by id
    pub async fn get(&self, id: i64) -> ClientResult<ApiToken> {
        let path = format!("{}/{}", routes::TOKENS, id);
        let envelope: ApiEnvelope<ApiToken> = self.gateway.get(&path, &[]).await?;
        envelope.into_data()
    }

    /// Create a token. The returned record carries the secret key, which is
    /// only shown once.
    pub async fn create(&self, request: TokenCreateRequest) -> ClientResult<ApiToken> {
        request.validate()?;
        let envelope: ApiEnvelope<ApiToken> =
            self.gateway.post(routes::TOKENS, &request).await?;
        envelope.into_data()
    }

    pub async fn update(&self, request: TokenUpdateRequest) -> ClientResult<()> {
        request.validate()?;
        let envelope: ApiEnvelope<serde_json::Value> =
            self.gateway.put(routes::TOKENS, &request).await?;
        envelope.ok()
    }

    /// Flip a token between enabled and disabled, keeping every other field
    pub async fn set_status(&self, token: &ApiToken, status: TokenStatus) -> ClientResult<()> {
        let mut request = TokenUpdateRequest::from_token(token);
        request.status = status;
        self.update(request).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        let path = format!("{}/{}", routes::TOKENS, id);
        let envelope: ApiEnvelope<serde_json::Value> = self.gateway.delete(&path).await?;
        envelope.ok()
    }
}
