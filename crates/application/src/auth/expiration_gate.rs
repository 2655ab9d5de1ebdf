//! Proactive refresh before sending requests with a known-expired token.

use std::sync::Arc;

use tokenwarden_domain::{HttpRequest, HttpResponse, RefreshOutcome};
use tracing::{debug, info};

use super::{AuthenticateError, Authenticator};
use crate::ports::{Clock, TokenExpirationStore};

/// What to do with a request after the expiration check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Send this request.
    Proceed(HttpRequest),
    /// Do not send anything; hand this response to the caller.
    ShortCircuit(HttpResponse),
}

/// Checks the cached expiry before a request goes out.
///
/// The expiry is read without taking the authenticator's lock. A stale read
/// only costs an extra call to [`Authenticator::authenticate`], which then
/// takes its fast path.
pub struct ExpirationGate {
    authenticator: Arc<Authenticator>,
    expiration_store: Arc<dyn TokenExpirationStore>,
    clock: Arc<dyn Clock>,
}

impl ExpirationGate {
    /// Creates a gate reading `expiration_store`.
    #[must_use]
    pub fn new(
        authenticator: Arc<Authenticator>,
        expiration_store: Arc<dyn TokenExpirationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authenticator,
            expiration_store,
            clock,
        }
    }

    /// Decides whether `request` can be sent as is.
    ///
    /// Unexpired tokens pass through untouched. For an expired token the
    /// authenticator runs first: a refreshed request proceeds, an expired
    /// session yields a local 401 and a transient failure lets the original
    /// request proceed.
    ///
    /// # Errors
    ///
    /// Propagates [`AuthenticateError`] from the store read or the
    /// authenticator.
    pub async fn before_request(
        &self,
        request: HttpRequest,
    ) -> Result<GateDecision, AuthenticateError> {
        let expires_at = self.expiration_store.access_token_expires_at().await?;
        if !expires_at.is_expired_at(self.clock.now_millis()) {
            return Ok(GateDecision::Proceed(request));
        }

        debug!(
            expires_at = expires_at.as_millis(),
            "access token expired, refreshing before sending"
        );
        match self.authenticator.authenticate(&request).await? {
            RefreshOutcome::Refreshed(updated) => Ok(GateDecision::Proceed(updated)),
            RefreshOutcome::Expired => {
                info!(url = %request.url, "session expired, answering locally");
                Ok(GateDecision::ShortCircuit(HttpResponse::session_expired()))
            }
            RefreshOutcome::RefreshFailed => Ok(GateDecision::Proceed(request)),
        }
    }
}

impl std::fmt::Debug for ExpirationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirationGate").finish_non_exhaustive()
    }
}
