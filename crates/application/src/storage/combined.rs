//! A single value acting as both session and expiration store.

use async_trait::async_trait;
use tokenwarden_domain::{Session, TokenExpiration};

use crate::ports::{SessionStore, StoreError, TokenExpirationStore};

/// Owns a session store and an expiration store and forwards to them.
///
/// Clearing through the [`SessionStore`] side clears both, so code that only
/// knows about sessions still drops a stale expiry on logout.
#[derive(Debug, Clone, Default)]
pub struct CombinedStore<S, E> {
    session: S,
    expiration: E,
}

impl<S, E> CombinedStore<S, E>
where
    S: SessionStore,
    E: TokenExpirationStore,
{
    /// Combines the two stores.
    #[must_use]
    pub const fn new(session: S, expiration: E) -> Self {
        Self {
            session,
            expiration,
        }
    }

    /// Returns the wrapped session store.
    #[must_use]
    pub const fn session_store(&self) -> &S {
        &self.session
    }

    /// Returns the wrapped expiration store.
    #[must_use]
    pub const fn expiration_store(&self) -> &E {
        &self.expiration
    }

    /// Clears both stores.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the expiration store is still cleared when
    /// the session store fails.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let session = self.session.clear().await;
        let expiration = self.expiration.clear().await;
        session.and(expiration)
    }
}

#[async_trait]
impl<S, E> SessionStore for CombinedStore<S, E>
where
    S: SessionStore,
    E: TokenExpirationStore,
{
    async fn load(&self) -> Result<Session, StoreError> {
        self.session.load().await
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.session.save(session).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.clear_all().await
    }
}

#[async_trait]
impl<S, E> TokenExpirationStore for CombinedStore<S, E>
where
    S: SessionStore,
    E: TokenExpirationStore,
{
    async fn access_token_expires_at(&self) -> Result<TokenExpiration, StoreError> {
        self.expiration.access_token_expires_at().await
    }

    async fn set_access_token_expires_at(
        &self,
        expires_at: TokenExpiration,
    ) -> Result<(), StoreError> {
        self.expiration.set_access_token_expires_at(expires_at).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.expiration.clear().await
    }
}
