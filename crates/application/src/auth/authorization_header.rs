//! Derives the `Authorization` header from the stored session.

use std::sync::Arc;

use tokenwarden_domain::{HttpRequest, Session, request::AUTHORIZATION};

use crate::ports::{SessionStore, StoreError};

/// Attaches `"{token_type} {access_token}"` to requests.
///
/// The value is read from the session store on every call, so a request
/// decorated after a refresh always carries the newest token.
#[derive(Clone)]
pub struct AuthorizationHeader {
    session_store: Arc<dyn SessionStore>,
}

impl AuthorizationHeader {
    /// Creates the header function for `session_store`.
    #[must_use]
    pub fn new(session_store: Arc<dyn SessionStore>) -> Self {
        Self { session_store }
    }

    /// Returns a copy of `request` with the current `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded.
    pub async fn apply(&self, request: &HttpRequest) -> Result<HttpRequest, StoreError> {
        let session = self.session_store.load().await?;
        Ok(Self::apply_session(request, &session))
    }

    /// Returns true if `request` already carries exactly the header
    /// [`AuthorizationHeader::apply`] would set.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded.
    pub async fn is_same(&self, request: &HttpRequest) -> Result<bool, StoreError> {
        let session = self.session_store.load().await?;
        Ok(request.authorization() == Some(session.authorization_header().as_str()))
    }

    fn apply_session(request: &HttpRequest, session: &Session) -> HttpRequest {
        request
            .clone()
            .with_header(AUTHORIZATION, session.authorization_header())
    }
}

impl std::fmt::Debug for AuthorizationHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationHeader").finish_non_exhaustive()
    }
}
