//! Session storage ports

use async_trait::async_trait;
use thiserror::Error;
use tokenwarden_domain::{Session, TokenExpiration};

/// Errors raised by session and expiration stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O failed: {0}")]
    Io(String),

    /// Stored data could not be decoded.
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

/// Persistent holder of the signed-in user's session.
///
/// Implementations must make [`SessionStore::clear`] observable as a single
/// step: a concurrent reader sees either the old session or the empty one.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the current session, empty when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    async fn load(&self) -> Result<Session, StoreError>;

    /// Replaces the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Resets every field to the empty string. Clearing twice equals clearing once.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Returns the stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    async fn refresh_token(&self) -> Result<String, StoreError> {
        Ok(self.load().await?.refresh_token)
    }

    /// Returns the stored user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    async fn user_id(&self) -> Result<String, StoreError> {
        Ok(self.load().await?.user_id)
    }
}

/// Persistent holder of the access token's absolute expiry.
#[async_trait]
pub trait TokenExpirationStore: Send + Sync {
    /// Returns the stored expiry, [`TokenExpiration::UNSET`] when never set.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    async fn access_token_expires_at(&self) -> Result<TokenExpiration, StoreError>;

    /// Stores a new expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    async fn set_access_token_expires_at(
        &self,
        expires_at: TokenExpiration,
    ) -> Result<(), StoreError>;

    /// Resets the expiry to [`TokenExpiration::UNSET`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    async fn clear(&self) -> Result<(), StoreError>;
}
