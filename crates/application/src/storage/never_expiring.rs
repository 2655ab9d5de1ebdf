//! Expiration store for deployments without expiry tracking.

use async_trait::async_trait;
use tokenwarden_domain::TokenExpiration;

use crate::ports::{StoreError, TokenExpirationStore};

/// Always reports [`TokenExpiration::NEVER`]; writes are ignored.
///
/// With this store the expiration gate never triggers, so refreshes only
/// happen in reaction to 401 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverExpiringTokenExpirationStore;

#[async_trait]
impl TokenExpirationStore for NeverExpiringTokenExpirationStore {
    async fn access_token_expires_at(&self) -> Result<TokenExpiration, StoreError> {
        Ok(TokenExpiration::NEVER)
    }

    async fn set_access_token_expires_at(&self, _: TokenExpiration) -> Result<(), StoreError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
