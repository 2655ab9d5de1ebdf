//! In-memory session and expiration stores.
//!
//! Both stores are cheap to clone; clones share the same state, which makes
//! them convenient for wiring one store into several components.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokenwarden_domain::{Session, TokenExpiration};

use crate::ports::{SessionStore, StoreError, TokenExpirationStore};

/// Thread-safe in-memory session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    session: Arc<RwLock<Session>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Session, StoreError> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.session.write().await = session.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.session.write().await = Session::default();
        Ok(())
    }
}

/// Thread-safe in-memory access-token expiry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenExpirationStore {
    expires_at: Arc<RwLock<TokenExpiration>>,
}

impl InMemoryTokenExpirationStore {
    /// Creates a store holding [`TokenExpiration::UNSET`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `expires_at`.
    #[must_use]
    pub fn with_expiration(expires_at: TokenExpiration) -> Self {
        Self {
            expires_at: Arc::new(RwLock::new(expires_at)),
        }
    }
}

#[async_trait]
impl TokenExpirationStore for InMemoryTokenExpirationStore {
    async fn access_token_expires_at(&self) -> Result<TokenExpiration, StoreError> {
        Ok(*self.expires_at.read().await)
    }

    async fn set_access_token_expires_at(
        &self,
        expires_at: TokenExpiration,
    ) -> Result<(), StoreError> {
        *self.expires_at.write().await = expires_at;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.expires_at.write().await = TokenExpiration::UNSET;
        Ok(())
    }
}
