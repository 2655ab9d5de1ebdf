//! Synchronized token refresh.
//!
//! The [`Authenticator`] is the single place where the session changes. Every
//! caller that believes its token is stale goes through
//! [`Authenticator::authenticate`], which holds an async mutex across the
//! whole refresh so that at most one refresh call is in flight. Callers that
//! queued behind a successful refresh notice their header is outdated and get
//! the new token without another network call.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tokenwarden_domain::{
    AuthFinishedInvalidation, HttpRequest, RefreshOutcome, Session, TokenExpiration,
    is_marked_for_invalidation, token_preview,
};
use tracing::{debug, info, warn};

use super::{AuthorizationHeader, DefaultSessionExpiredClassifier, SessionExpiredClassifier};
use crate::ports::{
    Clock, RefreshTransport, SessionExpiredNotifier, SessionStore, StoreError,
    TokenExpirationStore,
};

/// Number of refresh calls attempted before giving up.
pub const REFRESH_TOKEN_RETRY_COUNT: usize = 3;

/// Errors raised by [`Authenticator::authenticate`].
#[derive(Debug, Error)]
pub enum AuthenticateError {
    /// The tokens were refreshed for a request marked for invalidation.
    #[error("request invalidated after token refresh")]
    InvalidatedAfterRefresh(#[source] AuthFinishedInvalidation),

    /// A store could not be read or written.
    #[error("session storage failed: {0}")]
    Storage(#[from] StoreError),
}

/// Refreshes the session on behalf of requests whose token went stale.
pub struct Authenticator {
    session_store: Arc<dyn SessionStore>,
    expiration_store: Option<Arc<dyn TokenExpirationStore>>,
    refresh_transport: Arc<dyn RefreshTransport>,
    classifier: Arc<dyn SessionExpiredClassifier>,
    notifier: Arc<dyn SessionExpiredNotifier>,
    clock: Arc<dyn Clock>,
    authorization: AuthorizationHeader,
    lock: Mutex<()>,
}

impl Authenticator {
    /// Starts building an authenticator from its required collaborators.
    #[must_use]
    pub fn builder(
        session_store: Arc<dyn SessionStore>,
        refresh_transport: Arc<dyn RefreshTransport>,
        notifier: Arc<dyn SessionExpiredNotifier>,
        clock: Arc<dyn Clock>,
    ) -> AuthenticatorBuilder {
        AuthenticatorBuilder {
            session_store,
            refresh_transport,
            notifier,
            clock,
            expiration_store: None,
            classifier: None,
        }
    }

    /// Returns the header function bound to this authenticator's session store.
    #[must_use]
    pub const fn authorization(&self) -> &AuthorizationHeader {
        &self.authorization
    }

    /// Returns the configured expiration store, if any.
    #[must_use]
    pub fn expiration_store(&self) -> Option<&Arc<dyn TokenExpirationStore>> {
        self.expiration_store.as_ref()
    }

    /// Brings `request` up to date with a valid token, refreshing if needed.
    ///
    /// - If the session changed since `request` was decorated, the request is
    ///   re-decorated without any network call.
    /// - Without a refresh token nothing can be done: `RefreshFailed`.
    /// - Otherwise up to [`REFRESH_TOKEN_RETRY_COUNT`] refresh calls are made.
    ///   Transient failures are retried; a failure the classifier marks as
    ///   session-expired clears both stores, fires the notifier once and
    ///   returns `Expired`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticateError::InvalidatedAfterRefresh`] when the refresh
    /// succeeded for a request carrying the invalidation marker, and
    /// [`AuthenticateError::Storage`] when the session cannot be persisted.
    pub async fn authenticate(
        &self,
        request: &HttpRequest,
    ) -> Result<RefreshOutcome, AuthenticateError> {
        let outcome = {
            let _guard = self.lock.lock().await;
            self.authenticate_locked(request).await?
        };

        if matches!(outcome, RefreshOutcome::Expired) {
            self.notifier.on_session_expired();
        }
        debug!(outcome = outcome.label(), "authentication finished");
        Ok(outcome)
    }

    async fn authenticate_locked(
        &self,
        request: &HttpRequest,
    ) -> Result<RefreshOutcome, AuthenticateError> {
        if !self.authorization.is_same(request).await? {
            debug!("session changed since the request was sent, reusing current token");
            return Ok(RefreshOutcome::Refreshed(
                self.authorization.apply(request).await?,
            ));
        }

        let refresh_token = self.session_store.refresh_token().await?;
        if refresh_token.is_empty() {
            debug!("no refresh token stored, skipping refresh");
            return Ok(RefreshOutcome::RefreshFailed);
        }

        for attempt in 1..=REFRESH_TOKEN_RETRY_COUNT {
            debug!(
                attempt,
                refresh_token = %token_preview(&refresh_token),
                "refreshing access token"
            );
            match self.refresh_transport.refresh(&refresh_token).await {
                Ok(payload) => {
                    let expires_in = payload.expires_in;
                    let session = Session::from(payload);
                    self.session_store.save(&session).await?;
                    if let (Some(seconds), Some(store)) = (expires_in, &self.expiration_store) {
                        let expires_at =
                            TokenExpiration::after(self.clock.now_millis(), seconds);
                        store.set_access_token_expires_at(expires_at).await?;
                    }
                    info!(
                        attempt,
                        access_token = %token_preview(&session.access_token),
                        "access token refreshed"
                    );

                    if is_marked_for_invalidation(request) {
                        return Err(AuthenticateError::InvalidatedAfterRefresh(
                            AuthFinishedInvalidation,
                        ));
                    }
                    return Ok(RefreshOutcome::Refreshed(
                        self.authorization.apply(request).await?,
                    ));
                }
                Err(error) if self.classifier.is_session_expired(&error) => {
                    warn!(attempt, error = %error, "refresh token rejected, session expired");
                    self.clear_stores().await;
                    return Ok(RefreshOutcome::Expired);
                }
                Err(error) => {
                    warn!(attempt, error = %error, "token refresh failed");
                }
            }
        }

        warn!(
            attempts = REFRESH_TOKEN_RETRY_COUNT,
            "giving up on token refresh"
        );
        Ok(RefreshOutcome::RefreshFailed)
    }

    // Both clears are attempted even if the first fails.
    async fn clear_stores(&self) {
        if let Err(error) = self.session_store.clear().await {
            warn!(error = %error, "failed to clear session store");
        }
        if let Some(store) = &self.expiration_store
            && let Err(error) = store.clear().await
        {
            warn!(error = %error, "failed to clear token expiration store");
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("tracks_expiration", &self.expiration_store.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Authenticator`].
pub struct AuthenticatorBuilder {
    session_store: Arc<dyn SessionStore>,
    refresh_transport: Arc<dyn RefreshTransport>,
    notifier: Arc<dyn SessionExpiredNotifier>,
    clock: Arc<dyn Clock>,
    expiration_store: Option<Arc<dyn TokenExpirationStore>>,
    classifier: Option<Arc<dyn SessionExpiredClassifier>>,
}

impl AuthenticatorBuilder {
    /// Records access-token expiry after each refresh and clears it on expiry.
    #[must_use]
    pub fn expiration_store(mut self, store: Arc<dyn TokenExpirationStore>) -> Self {
        self.expiration_store = Some(store);
        self
    }

    /// Replaces [`DefaultSessionExpiredClassifier`].
    #[must_use]
    pub fn classifier(mut self, classifier: Arc<dyn SessionExpiredClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Builds the authenticator.
    #[must_use]
    pub fn build(self) -> Authenticator {
        Authenticator {
            authorization: AuthorizationHeader::new(Arc::clone(&self.session_store)),
            session_store: self.session_store,
            expiration_store: self.expiration_store,
            refresh_transport: self.refresh_transport,
            classifier: self
                .classifier
                .unwrap_or_else(|| Arc::new(DefaultSessionExpiredClassifier)),
            notifier: self.notifier,
            clock: self.clock,
            lock: Mutex::new(()),
        }
    }
}
