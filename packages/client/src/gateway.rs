//! Authorized request gateway
//!
//! Every outbound call to the backend goes through here. The gateway
//! attaches the bearer credential from the session store when one is
//! present, and reacts to a 401 by tearing the local session down and
//! broadcasting [`AuthEvent::AuthorizationLost`] so the application layer
//! can route the user back to login. All other error classes pass through
//! to the caller untouched.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use url::Url;

use crate::api::{routes, ApiEnvelope};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;
use crate::types::{Identity, Page};

/// Authorization lifecycle notifications emitted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// The backend rejected the credential; the local session has already
    /// been invalidated
    AuthorizationLost,
}

/// Uniform request dispatch with credential attachment and session teardown
pub struct Gateway {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
    auth_events: broadcast::Sender<AuthEvent>,
}

impl Gateway {
    /// Create a gateway against the configured backend.
    ///
    /// The cookie store is enabled so cookie-based session auth flows
    /// independently of the bearer header.
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ClientError::config(format!("Invalid API URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let (auth_events, _) = broadcast::channel(16);

        Ok(Self {
            http,
            base_url,
            session,
            auth_events,
        })
    }

    /// Subscribe to authorization lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::config(format!("Invalid endpoint {}: {}", path, e)))
    }

    /// Attach the bearer credential, dispatch, and decode the envelope.
    ///
    /// A 401 invalidates the session store (local-only, no logout call) and
    /// emits [`AuthEvent::AuthorizationLost`] exactly once before the error
    /// is returned to the caller.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ClientResult<ApiEnvelope<T>> {
        let request = match self.session.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("credential rejected, invalidating session");
            self.session.invalidate().await;
            let _ = self.auth_events.send(AuthEvent::AuthorizationLost);
            return Err(ClientError::auth("credential rejected by backend"));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ClientError::Http(error_text));
        }

        response
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<ApiEnvelope<T>> {
        let url = self.endpoint(path)?;
        self.send(self.http.get(url).query(query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiEnvelope<T>> {
        let url = self.endpoint(path)?;
        self.send(self.http.post(url).json(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiEnvelope<T>> {
        let url = self.endpoint(path)?;
        self.send(self.http.put(url).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiEnvelope<T>> {
        let url = self.endpoint(path)?;
        self.send(self.http.delete(url)).await
    }

    /// Fetch one page of a listing endpoint
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        extra_query: &[(&str, String)],
        page: u32,
        page_size: u32,
    ) -> ClientResult<Page<T>> {
        let mut query: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
        ];
        query.extend(extra_query.iter().map(|(k, v)| (*k, v.clone())));

        let envelope: ApiEnvelope<Vec<T>> = self.get(path, &query).await?;
        let (items, total) = envelope.into_listing()?;
        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Authoritative self-lookup used by session hydration
    pub async fn fetch_self(&self) -> ClientResult<Identity> {
        let envelope: ApiEnvelope<Identity> = self.get(routes::USER_SELF, &[]).await?;
        envelope.into_data()
    }
}
