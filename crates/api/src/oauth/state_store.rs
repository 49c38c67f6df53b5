use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use djpersona_core::error::CoreError;
use tokio::sync::RwLock;

use super::ProviderData;

/// Number of random bytes in a state token.
const STATE_TOKEN_BYTES: usize = 16;

struct PendingState {
    provider: String,
    issued_at: Instant,
}

struct ConnectedSession {
    provider: String,
    data: ProviderData,
    connected_at: Instant,
}

/// In-memory store of OAuth state tokens.
///
/// A token is *pending* from [`issue`](Self::issue) until it is consumed by
/// the callback, and *connected* once provider data has been attached to it.
/// Both kinds expire after their own TTL. Thread-safe via interior `RwLock`;
/// designed to be wrapped in `Arc`.
pub struct OAuthStateStore {
    state_ttl: Duration,
    session_ttl: Duration,
    pending: RwLock<HashMap<String, PendingState>>,
    connected: RwLock<HashMap<String, ConnectedSession>>,
}

impl OAuthStateStore {
    pub fn new(state_ttl: Duration, session_ttl: Duration) -> Self {
        Self {
            state_ttl,
            session_ttl,
            pending: RwLock::new(HashMap::new()),
            connected: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a fresh state token for `provider`.
    pub async fn issue(&self, provider: &str) -> String {
        let state = URL_SAFE_NO_PAD.encode(rand::random::<[u8; STATE_TOKEN_BYTES]>());
        self.pending.write().await.insert(
            state.clone(),
            PendingState {
                provider: provider.to_string(),
                issued_at: Instant::now(),
            },
        );
        state
    }

    /// Consume a pending token. Succeeds at most once per token.
    ///
    /// Unknown tokens and tokens issued for another provider leave the store
    /// untouched. Expired tokens are removed and rejected.
    pub async fn consume(&self, state: &str, provider: &str) -> Result<(), CoreError> {
        let mut pending = self.pending.write().await;

        let Some(entry) = pending.get(state) else {
            return Err(CoreError::InvalidState);
        };
        if entry.provider != provider {
            return Err(CoreError::InvalidState);
        }
        let expired = entry.issued_at.elapsed() >= self.state_ttl;

        pending.remove(state);
        if expired {
            tracing::debug!(provider, "Rejected expired OAuth state");
            return Err(CoreError::InvalidState);
        }
        Ok(())
    }

    /// Store provider data under a consumed state token.
    pub async fn attach_profile(&self, state: &str, provider: &str, data: ProviderData) {
        self.connected.write().await.insert(
            state.to_string(),
            ConnectedSession {
                provider: provider.to_string(),
                data,
                connected_at: Instant::now(),
            },
        );
    }

    /// Provider data for a connected session, if present and not expired.
    pub async fn profile(&self, session_id: &str, provider: &str) -> Option<ProviderData> {
        let connected = self.connected.read().await;
        connected
            .get(session_id)
            .filter(|s| s.provider == provider && s.connected_at.elapsed() < self.session_ttl)
            .map(|s| s.data.clone())
    }

    /// Drop expired pending and connected entries. Returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let mut removed = 0;

        {
            let mut pending = self.pending.write().await;
            let before = pending.len();
            pending.retain(|_, p| p.issued_at.elapsed() < self.state_ttl);
            removed += before - pending.len();
        }
        {
            let mut connected = self.connected.write().await;
            let before = connected.len();
            connected.retain(|_, s| s.connected_at.elapsed() < self.session_ttl);
            removed += before - connected.len();
        }

        removed
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    pub async fn connected_count(&self) -> usize {
        self.connected.read().await.len()
    }
}
