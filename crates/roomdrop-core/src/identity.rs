//! User account operations.
//!
//! Accounts are created once and never mutated. Credentials are stored and
//! compared verbatim; this system does not harden them.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::CoreError;
use crate::store::IdentityStore;
use crate::types::{User, UserId};

/// Account creation and authentication over an injected store.
#[derive(Clone)]
pub struct Identity {
    store: Arc<dyn IdentityStore>,
}

impl Identity {
    /// Create the component over a store.
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Register a new account.
    ///
    /// The display name falls back to the local part of the email when the
    /// caller supplies none (or only whitespace). Fails with `Conflict` when
    /// the email is already registered.
    #[instrument(skip_all, name = "rd.identity.create")]
    pub async fn create(
        &self,
        email: &str,
        credential: &str,
        display_name: Option<&str>,
    ) -> Result<User, CoreError> {
        if email.is_empty() {
            return Err(CoreError::Validation("email is required".to_string()));
        }
        if credential.is_empty() {
            return Err(CoreError::Validation("password is required".to_string()));
        }

        let display_name = match display_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => local_part(email).to_string(),
        };

        let user = User {
            id: UserId::new(),
            email: email.to_string(),
            credential: credential.to_string(),
            display_name,
            created_at: Utc::now(),
        };

        let user = self.store.insert_user(user).await?;
        info!(
            target: "rd.core.identity",
            user_id = %user.id,
            email = %user.email,
            "User registered"
        );
        Ok(user)
    }

    /// Authenticate by exact credential match.
    ///
    /// Fails with `Unauthorized` when nothing matches; whether the email or
    /// the credential was wrong is not distinguished.
    #[instrument(skip_all, name = "rd.identity.authenticate")]
    pub async fn authenticate(&self, email: &str, credential: &str) -> Result<User, CoreError> {
        self.store
            .user_by_credentials(email, credential)
            .await?
            .ok_or_else(|| {
                tracing::debug!(target: "rd.core.identity", email = %email, "Login rejected");
                CoreError::Unauthorized("invalid credentials".to_string())
            })
    }

    /// Fetch a user by id. Fails with `NotFound` for unknown ids.
    pub async fn get(&self, id: UserId) -> Result<User, CoreError> {
        self.store
            .user_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("unknown user".to_string()))
    }
}

/// Everything before the first `@`, or the whole string when there is none.
fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
