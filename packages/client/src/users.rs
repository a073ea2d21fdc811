//! Admin user directory: list, search and mutate other accounts.
//!
//! All of these require an admin-tier principal; enforcement lives in the
//! backend, the client only pre-checks role where a consumer asks it to.

use std::sync::Arc;

use crate::api::{routes, ApiEnvelope, UserCreateRequest, UserUpdateRequest};
use crate::error::ClientResult;
use crate::gateway::Gateway;
use crate::types::{Identity, Page};

/// Administrator operations over the user directory
pub struct AdminApi {
    gateway: Arc<Gateway>,
}

impl AdminApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// List users, newest first
    pub async fn list(&self, page: u32, page_size: u32) -> ClientResult<Page<Identity>> {
        self.gateway.get_page(routes::USERS, &[], page, page_size).await
    }

    /// Search users by username, display name or email
    pub async fn search(
        &self,
        keyword: &str,
        page: u32,
        page_size: u32,
    ) -> ClientResult<Page<Identity>> {
        self.gateway
            .get_page(
                routes::USERS_SEARCH,
                &[("keyword", keyword.to_string())],
                page,
                page_size,
            )
            .await
    }

    /// Fetch a single user by id
    pub async fn get(&self, id: i64) -> ClientResult<Identity> {
        let path = format!("{}/{}", routes::USERS, id);
        let envelope: ApiEnvelope<Identity> = self.gateway.get(&path, &[]).await?;
        envelope.into_data()
    }

    pub async fn create(&self, request: UserCreateRequest) -> ClientResult<()> {
        request.validate()?;
        let envelope: ApiEnvelope<serde_json::Value> =
            self.gateway.post(routes::USERS, &request).await?;
        envelope.ok()
    }

    pub async fn update(&self, request: UserUpdateRequest) -> ClientResult<()> {
        request.validate()?;
        let envelope: ApiEnvelope<serde_json::Value> =
            self.gateway.put(routes::USERS, &request).await?;
        envelope.ok()
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        let path = format!("{}/{}", routes::USERS, id);
        let envelope: ApiEnvelope<serde_json::Value> = self.gateway.delete(&path).await?;
        envelope.ok()
    }
}
