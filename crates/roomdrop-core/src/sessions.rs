//! Login session operations.
//!
//! A session is an opaque bearer token mapped to a user. Tokens are minted on
//! login, resolved on every authenticated call, and removed on logout. There
//! is no TTL; logout is the only invalidation path.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::codes::generate_session_token;
use crate::error::CoreError;
use crate::store::{IdentityStore, SessionStore};
use crate::types::{Session, User};

/// Session lifecycle over injected stores.
#[derive(Clone)]
pub struct Sessions {
    sessions: Arc<dyn SessionStore>,
    identity: Arc<dyn IdentityStore>,
}

impl Sessions {
    /// Create the component over its stores.
    pub fn new(sessions: Arc<dyn SessionStore>, identity: Arc<dyn IdentityStore>) -> Self {
        Self { sessions, identity }
    }

    /// Mint a token for an authenticated user and record the session.
    #[instrument(skip_all, name = "rd.session.open")]
    pub async fn open(&self, user: &User) -> Result<String, CoreError> {
        let token = generate_session_token()?;
        self.sessions
            .insert_session(Session {
                token: token.clone(),
                user_id: user.id,
                created_at: Utc::now(),
            })
            .await?;
        info!(target: "rd.core.sessions", user_id = %user.id, "Session opened");
        Ok(token)
    }

    /// Resolve a bearer token to its user.
    ///
    /// Fails with `Unauthorized` when the token is unknown (never issued, or
    /// closed by logout) or its user no longer resolves.
    pub async fn resolve(&self, token: &str) -> Result<User, CoreError> {
        let session = self
            .sessions
            .session_by_token(token)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("invalid session token".to_string()))?;

        self.identity
            .user_by_id(session.user_id)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("invalid session token".to_string()))
    }

    /// Drop a session. Idempotent: closing an unknown or already-closed
    /// token succeeds silently. This is the one deliberate swallow in the
    /// core's error policy.
    #[instrument(skip_all, name = "rd.session.close")]
    pub async fn close(&self, token: &str) -> Result<(), CoreError> {
        self.sessions.delete_session(token).await?;
        debug!(target: "rd.core.sessions", "Session closed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::store::MemoryStore;

    struct Fixture {
        identity: Identity,
        sessions: Sessions,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            identity: Identity::new(store.clone()),
            sessions: Sessions::new(store.clone(), store),
        }
    }

    #[tokio::test]
    async fn test_open_resolve_close_roundtrip() {
        let fx = fixture();
        let user = fx.identity.create("a@b.com", "pw", None).await.unwrap();

        let token = fx.sessions.open(&user).await.unwrap();
        let resolved = fx.sessions.resolve(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);

        fx.sessions.close(&token).await.unwrap();
        assert!(matches!(
            fx.sessions.resolve(&token).await.unwrap_err(),
            CoreError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token_is_unauthorized() {
        let fx = fixture();
        assert!(matches!(
            fx.sessions.resolve("not-a-token").await.unwrap_err(),
            CoreError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let fx = fixture();
        let user = fx.identity.create("a@b.com", "pw", None).await.unwrap();
        let token = fx.sessions.open(&user).await.unwrap();

        fx.sessions.close(&token).await.unwrap();
        fx.sessions.close(&token).await.unwrap();
        fx.sessions.close("never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn test_tokens_are_unique_per_login() {
        let fx = fixture();
        let user = fx.identity.create("a@b.com", "pw", None).await.unwrap();

        let first = fx.sessions.open(&user).await.unwrap();
        let second = fx.sessions.open(&user).await.unwrap();
        assert_ne!(first, second);

        // Both are live until closed
        assert_eq!(fx.sessions.resolve(&first).await.unwrap().id, user.id);
        assert_eq!(fx.sessions.resolve(&second).await.unwrap().id, user.id);

        // Closing one leaves the other
        fx.sessions.close(&first).await.unwrap();
        assert!(fx.sessions.resolve(&first).await.is_err());
        assert!(fx.sessions.resolve(&second).await.is_ok());
    }
}
