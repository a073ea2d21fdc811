//! Shared command context: configured client stack with a hydrated session

use std::sync::Arc;

use anyhow::{bail, Context as _};

use konto_client::{
    AccountApi, AdminApi, ClientConfig, Gateway, Identity, Role, SessionStore, TokenApi,
};

/// Handles shared by every command
pub struct AppContext {
    pub session: Arc<SessionStore>,
    pub gateway: Arc<Gateway>,
}

impl AppContext {
    /// Build the client stack and reconcile the persisted session with the
    /// backend. Role-gated commands must not run before this resolves.
    pub async fn init() -> anyhow::Result<Self> {
        let config = ClientConfig::resolve().await?;
        let session = Arc::new(SessionStore::open_default()?);
        let gateway = Arc::new(Gateway::new(&config, session.clone())?);
        session.hydrate(&gateway).await;
        Ok(Self { session, gateway })
    }

    pub fn account(&self) -> AccountApi {
        AccountApi::new(self.gateway.clone())
    }

    pub fn tokens(&self) -> TokenApi {
        TokenApi::new(self.gateway.clone())
    }

    pub fn admin(&self) -> AdminApi {
        AdminApi::new(self.gateway.clone())
    }

    /// Require an authenticated session
    pub fn require_authenticated(&self) -> anyhow::Result<Identity> {
        self.session
            .identity()
            .context("not logged in - run `konto login` first")
    }

    /// Require an authenticated session at or above the given role tier
    pub fn require_role(&self, min_role: Role) -> anyhow::Result<Identity> {
        let identity = self.require_authenticated()?;
        if identity.role < min_role {
            bail!("this command requires {} privileges", min_role);
        }
        Ok(identity)
    }
}
