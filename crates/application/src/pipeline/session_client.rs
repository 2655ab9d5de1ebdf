//! Pipeline for endpoints that require a session.

use std::sync::Arc;

use thiserror::Error;
use tokenwarden_domain::{HttpRequest, HttpResponse, RefreshOutcome};
use tracing::{debug, info};

use crate::auth::{AuthenticateError, Authenticator, ExpirationGate, GateDecision};
use crate::ports::{HttpClient, HttpClientError};

/// Default number of times a 401 response triggers a refresh and resend.
pub const DEFAULT_MAX_AUTH_FOLLOW_UPS: usize = 3;

/// Errors raised by [`SessionClient::execute`].
#[derive(Debug, Error)]
pub enum SessionClientError {
    /// No response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] HttpClientError),

    /// Authentication failed in a way that must reach the caller.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthenticateError),
}

/// Sends authenticated requests.
///
/// Each request is decorated with the current token, checked against the
/// cached expiry and sent. A 401 answer hands the sent request to the
/// authenticator; a refreshed request is sent again, up to the follow-up
/// limit. Any other outcome returns the 401 to the caller.
pub struct SessionClient {
    http: Arc<dyn HttpClient>,
    authenticator: Arc<Authenticator>,
    gate: Option<ExpirationGate>,
    max_auth_follow_ups: usize,
}

impl SessionClient {
    /// Creates the pipeline without an expiration gate.
    #[must_use]
    pub fn new(http: Arc<dyn HttpClient>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            http,
            authenticator,
            gate: None,
            max_auth_follow_ups: DEFAULT_MAX_AUTH_FOLLOW_UPS,
        }
    }

    /// Checks `gate` before every request.
    #[must_use]
    pub fn with_gate(mut self, gate: ExpirationGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Limits how many times a 401 may trigger a refresh for one call.
    #[must_use]
    pub const fn with_max_auth_follow_ups(mut self, max: usize) -> Self {
        self.max_auth_follow_ups = max;
        self
    }

    /// Returns the shared authenticator.
    #[must_use]
    pub const fn authenticator(&self) -> &Arc<Authenticator> {
        &self.authenticator
    }

    /// Sends `request` with authentication.
    ///
    /// # Errors
    ///
    /// Returns [`SessionClientError::Http`] if no response was received and
    /// [`SessionClientError::Auth`] for storage failures or a marked request
    /// whose tokens were refreshed.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, SessionClientError> {
        let mut request = self
            .authenticator
            .authorization()
            .apply(&request)
            .await
            .map_err(AuthenticateError::from)?;

        if let Some(gate) = &self.gate {
            match gate.before_request(request).await? {
                GateDecision::Proceed(updated) => request = updated,
                GateDecision::ShortCircuit(response) => return Ok(response),
            }
        }

        let mut response = self.http.execute(&request).await?;
        let mut follow_ups = 0;
        while response.is_unauthorized() && follow_ups < self.max_auth_follow_ups {
            follow_ups += 1;
            debug!(follow_ups, url = %request.url, "received 401, authenticating");
            match self.authenticator.authenticate(&request).await? {
                RefreshOutcome::Refreshed(updated) => {
                    request = updated;
                    response = self.http.execute(&request).await?;
                }
                outcome @ (RefreshOutcome::Expired | RefreshOutcome::RefreshFailed) => {
                    info!(outcome = outcome.label(), "returning 401 to caller");
                    break;
                }
            }
        }
        Ok(response)
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("gated", &self.gate.is_some())
            .field("max_auth_follow_ups", &self.max_auth_follow_ups)
            .finish_non_exhaustive()
    }
}
