//! Session store: the process-wide source of "who is the current user"
//!
//! The store caches the authenticated [`Identity`] across runs in a TOML
//! snapshot and reconciles it with server truth exactly once per process,
//! via [`SessionStore::hydrate`]. Until that first reconciliation resolves,
//! consumers must treat the session as loading and keep role-gated surfaces
//! closed.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::fs;

use crate::api::routes;
use crate::error::{ClientError, ClientResult};
use crate::gateway::Gateway;
use crate::types::Identity;

/// Lifecycle of the session across the initial validation round-trip.
///
/// `Tentative` is the optimistic window where a cached identity is shown as
/// authenticated before the backend has confirmed it. There is no path back
/// out of `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Hydration has not started
    Uninitialized,
    /// Hydration in flight, no cached identity to show
    Validating,
    /// Hydration in flight, cached identity speculatively authenticated
    Tentative,
    /// First reconciliation has resolved, successfully or not
    Ready,
}

#[derive(Debug)]
struct SessionState {
    identity: Option<Identity>,
    phase: SessionPhase,
    initialized: bool,
}

/// Client-local cache of the current [`Identity`]
pub struct SessionStore {
    snapshot_path: PathBuf,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Create a store persisting its snapshot at the given path
    pub fn new(snapshot_path: PathBuf) -> Self {
        Self {
            snapshot_path,
            state: RwLock::new(SessionState {
                identity: None,
                phase: SessionPhase::Uninitialized,
                initialized: false,
            }),
        }
    }

    /// Create a store at the default snapshot location
    pub fn open_default() -> ClientResult<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Default snapshot location under the user's home directory
    pub fn default_path() -> ClientResult<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| ClientError::config("Could not determine home directory"))?;
        Ok(home_dir.join(".konto").join("session.toml"))
    }

    fn state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Reconcile the persisted snapshot with server truth.
    ///
    /// Runs at most once per store: a second call after the first resolution
    /// is a no-op. Every failure path (unreadable snapshot, network error,
    /// rejected session) degrades to a clean logged-out state; hydration
    /// itself never fails.
    pub async fn hydrate(&self, gateway: &Gateway) {
        {
            let state = self.state();
            if state.initialized {
                return;
            }
        }

        let cached = match self.load_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::debug!("discarding unreadable session snapshot: {}", e);
                self.remove_snapshot().await;
                None
            }
        };

        {
            let mut state = self.state_mut();
            state.phase = if cached.is_some() {
                SessionPhase::Tentative
            } else {
                SessionPhase::Validating
            };
            state.identity = cached;
        }

        match gateway.fetch_self().await {
            Ok(identity) => {
                if let Err(e) = self.save_snapshot(&identity).await {
                    tracing::debug!("could not persist session snapshot: {}", e);
                }
                self.state_mut().identity = Some(identity);
            }
            Err(e) => {
                tracing::debug!("session validation failed: {}", e);
                self.remove_snapshot().await;
                self.state_mut().identity = None;
            }
        }

        let mut state = self.state_mut();
        state.phase = SessionPhase::Ready;
        state.initialized = true;
    }

    /// Set the current identity and persist the snapshot; used after login
    pub async fn establish(&self, identity: Identity) -> ClientResult<()> {
        self.save_snapshot(&identity).await?;
        self.state_mut().identity = Some(identity);
        Ok(())
    }

    /// Replace the current identity after a profile edit or access-token
    /// regeneration. Callers merge partial fields before calling this; the
    /// store always does a full replace.
    pub async fn refresh(&self, identity: Identity) -> ClientResult<()> {
        self.establish(identity).await
    }

    /// Log out: best-effort server-side session teardown, then unconditional
    /// local teardown. Idempotent.
    pub async fn clear(&self, gateway: &Gateway) {
        match gateway.get::<serde_json::Value>(routes::USER_LOGOUT, &[]).await {
            Ok(envelope) if !envelope.is_success() => {
                tracing::warn!("logout rejected by backend: {}", envelope.message);
            }
            Err(e) => {
                tracing::warn!("logout request failed: {}", e);
            }
            Ok(_) => {}
        }
        self.invalidate().await;
    }

    /// Local-only teardown. Used by the gateway when the backend rejects the
    /// credential; no logout call is attempted here.
    pub async fn invalidate(&self) {
        self.remove_snapshot().await;
        self.state_mut().identity = None;
    }

    /// The cached identity, if any
    pub fn identity(&self) -> Option<Identity> {
        self.state().identity.clone()
    }

    /// True iff an identity is present
    pub fn is_authenticated(&self) -> bool {
        self.state().identity.is_some()
    }

    /// True until the initial validation round-trip completes
    pub fn is_loading(&self) -> bool {
        matches!(
            self.state().phase,
            SessionPhase::Validating | SessionPhase::Tentative
        )
    }

    /// True once the first hydration has resolved, regardless of outcome
    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    pub fn phase(&self) -> SessionPhase {
        self.state().phase
    }

    /// Bearer credential of the current identity, if present and non-empty
    pub fn access_token(&self) -> Option<String> {
        self.state()
            .identity
            .as_ref()
            .and_then(|i| i.bearer_token().map(str::to_string))
    }

    async fn load_snapshot(&self) -> ClientResult<Option<Identity>> {
        if !self.snapshot_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.snapshot_path).await?;
        let identity: Identity = toml::from_str(&content)
            .map_err(|e| ClientError::Serialization(format!("invalid session snapshot: {}", e)))?;
        Ok(Some(identity))
    }

    async fn save_snapshot(&self, identity: &Identity) -> ClientResult<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(identity).map_err(|e| {
            ClientError::Serialization(format!("failed to serialize session snapshot: {}", e))
        })?;
        fs::write(&self.snapshot_path, content).await?;
        Ok(())
    }

    async fn remove_snapshot(&self) {
        if self.snapshot_path.exists() {
            if let Err(e) = fs::remove_file(&self.snapshot_path).await {
                tracing::debug!("could not remove session snapshot: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, UserStatus};

    fn identity(username: &str) -> Identity {
        Identity {
            id: 1,
            username: username.to_string(),
            display_name: None,
            email: None,
            role: Role::User,
            status: UserStatus::Enabled,
            access_token: None,
            quota: None,
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("session.toml"))
    }

    #[tokio::test]
    async fn establish_then_read_returns_same_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.establish(identity("alice")).await.unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.identity().unwrap().username, "alice");
        assert!(dir.path().join("session.toml").exists());
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.establish(identity("alice")).await.unwrap();
        store.invalidate().await;
        assert!(!store.is_authenticated());
        assert!(!dir.path().join("session.toml").exists());

        store.invalidate().await;
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn snapshot_survives_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = store_in(&dir);
            store.establish(identity("alice")).await.unwrap();
        }
        let store = store_in(&dir);
        let snapshot = store.load_snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.username, "alice");
    }

    #[tokio::test]
    async fn corrupt_snapshot_reads_as_error_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("session.toml"), "{{{not toml").unwrap();
        let store = store_in(&dir);
        assert!(store.load_snapshot().await.is_err());
    }

    #[test]
    fn fresh_store_is_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.phase(), SessionPhase::Uninitialized);
        assert!(!store.is_initialized());
        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
    }
}
