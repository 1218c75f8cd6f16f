//! Holder for the current session.

use crate::client::Session;
use crate::config::SessionConfig;
use crate::error::{CmlError, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps at most one authenticated [`Session`] and hands it out on request.
///
/// Cloning the slot shares the same underlying session. The lock is never
/// held across network I/O: `initialize` authenticates first and only then
/// swaps the new session in, so a failed attempt leaves the previous session
/// in place.
#[derive(Clone, Default)]
pub struct SessionSlot {
    current: Arc<RwLock<Option<Arc<Session>>>>,
}

impl SessionSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate with `config` and make the result the current session.
    pub async fn initialize(&self, config: SessionConfig) -> Result<Arc<Session>> {
        let session = Session::initialize(config).await?;
        Ok(self.install(session).await)
    }

    /// Replace the current session with `session`.
    pub async fn install(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let previous = self.current.write().await.replace(Arc::clone(&session));
        if let Some(prev) = previous {
            tracing::info!(
                previous = %prev.base_url(),
                current = %session.base_url(),
                "Replaced CML session"
            );
        }
        session
    }

    /// The current session, or [`CmlError::Unauthenticated`] if none.
    pub async fn current(&self) -> Result<Arc<Session>> {
        self.current
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(CmlError::Unauthenticated)
    }

    /// Whether a session has been installed.
    pub async fn is_initialized(&self) -> bool {
        self.current.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_slot_is_unauthenticated() {
        let slot = SessionSlot::new();
        assert!(!slot.is_initialized().await);
        assert!(matches!(slot.current().await, Err(CmlError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_failed_initialize_keeps_slot_empty() {
        let slot = SessionSlot::new();
        // Port 9 (discard) on localhost is closed on any sane test host.
        let config = SessionConfig::builder()
            .base_url("http://127.0.0.1:9")
            .username("admin")
            .password("secret")
            .build()
            .unwrap();
        let err = slot.initialize(config).await.unwrap_err();
        assert!(matches!(err, CmlError::AuthenticationFailed(_)));
        assert!(!slot.is_initialized().await);
    }
}
