//! Wires the pipelines, the authenticator and the adapters together.

use std::sync::Arc;

use thiserror::Error;
use tokenwarden_application::ports::{
    Clock, HttpClient, HttpClientError, RefreshTransport, SessionExpiredNotifier, SessionStore,
    TokenExpirationStore,
};
use tokenwarden_application::{
    Authenticator, ClientIdParameter, DEFAULT_MAX_AUTH_FOLLOW_UPS, ExpirationGate,
    InMemorySessionStore, InMemoryTokenExpirationStore, NeverExpiringTokenExpirationStore,
    SessionClient, SessionExpiredClassifier, SessionlessClient,
};
use tracing::info;
use url::Url;

use crate::adapters::{ReqwestHttpClient, SystemClock};
use crate::auth::{FormRefreshTransport, RefreshEndpoint, RefreshFieldProvider};
use crate::persistence::{FileSessionStore, FileTokenExpirationStore};
use crate::settings::{HttpSettings, TokenwardenSettings};

/// Errors raised by [`OAuthClientBuilder::build`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// A required collaborator was not provided.
    #[error("missing {0}")]
    Missing(&'static str),

    /// The base URL or refresh path is not a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP adapter could not be created.
    #[error("HTTP client could not be created: {0}")]
    Http(#[from] HttpClientError),
}

/// The two pipelines sharing one authenticator.
#[derive(Debug, Clone)]
pub struct OAuthClients {
    /// Pipeline for endpoints requiring a session.
    pub session: Arc<SessionClient>,
    /// Pipeline for endpoints callable without a session.
    pub sessionless: Arc<SessionlessClient>,
    /// The authenticator behind the session pipeline.
    pub authenticator: Arc<Authenticator>,
}

/// Builder for [`OAuthClients`].
pub struct OAuthClientBuilder {
    client_id: String,
    base_url: Option<Url>,
    session_store: Option<Arc<dyn SessionStore>>,
    expiration_store: Option<Arc<dyn TokenExpirationStore>>,
    notifier: Option<Arc<dyn SessionExpiredNotifier>>,
    classifier: Option<Arc<dyn SessionExpiredClassifier>>,
    endpoint: RefreshEndpoint,
    field_provider: Option<Arc<dyn RefreshFieldProvider>>,
    refresh_transport: Option<Arc<dyn RefreshTransport>>,
    clock: Option<Arc<dyn Clock>>,
    http: Option<Arc<dyn HttpClient>>,
    http_settings: HttpSettings,
    max_auth_follow_ups: usize,
}

impl OAuthClientBuilder {
    /// Starts a builder for `client_id`.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            base_url: None,
            session_store: None,
            expiration_store: None,
            notifier: None,
            classifier: None,
            endpoint: RefreshEndpoint::default(),
            field_provider: None,
            refresh_transport: None,
            clock: None,
            http: None,
            http_settings: HttpSettings::default(),
            max_auth_follow_ups: DEFAULT_MAX_AUTH_FOLLOW_UPS,
        }
    }

    /// Starts a builder from loaded settings.
    ///
    /// Stores are file-backed when `storage.directory` is set and in-memory
    /// otherwise. A real expiration store is only created when
    /// `session.token_expiration` is on.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is set but invalid.
    pub fn from_settings(settings: &TokenwardenSettings) -> Result<Self, ClientBuildError> {
        let mut builder = Self::new(settings.client_id.clone())
            .refresh_endpoint(settings.refresh.clone())
            .max_auth_follow_ups(settings.session.max_auth_follow_ups);
        builder.http_settings = settings.http.clone();
        if let Some(base_url) = &settings.base_url {
            builder = builder.base_url(Url::parse(base_url)?);
        }

        match &settings.storage.directory {
            Some(directory) => {
                builder = builder.session_store(Arc::new(FileSessionStore::new(directory)));
                if settings.session.token_expiration {
                    builder = builder
                        .expiration_store(Arc::new(FileTokenExpirationStore::new(directory)));
                }
            }
            None => {
                builder = builder.session_store(Arc::new(InMemorySessionStore::new()));
                if settings.session.token_expiration {
                    builder =
                        builder.expiration_store(Arc::new(InMemoryTokenExpirationStore::new()));
                }
            }
        }
        Ok(builder)
    }

    /// Sets the URL the refresh path is resolved against.
    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the session store.
    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Enables proactive refresh backed by `store`.
    #[must_use]
    pub fn expiration_store(mut self, store: Arc<dyn TokenExpirationStore>) -> Self {
        self.expiration_store = Some(store);
        self
    }

    /// Disables proactive refresh; the expiry reads as never expiring.
    #[must_use]
    pub fn without_token_expiration(mut self) -> Self {
        self.expiration_store = None;
        self
    }

    /// Sets the handler called when the session cannot be recovered.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn SessionExpiredNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replaces the default session-expired classifier.
    #[must_use]
    pub fn classifier(mut self, classifier: Arc<dyn SessionExpiredClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Configures the form posted to the token endpoint.
    #[must_use]
    pub fn refresh_endpoint(mut self, endpoint: RefreshEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Adds per-call form fields to the refresh request.
    #[must_use]
    pub fn field_provider(mut self, provider: Arc<dyn RefreshFieldProvider>) -> Self {
        self.field_provider = Some(provider);
        self
    }

    /// Uses a hand-written transport instead of the form transport.
    #[must_use]
    pub fn refresh_transport(mut self, transport: Arc<dyn RefreshTransport>) -> Self {
        self.refresh_transport = Some(transport);
        self
    }

    /// Replaces the system clock.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replaces the reqwest adapter.
    #[must_use]
    pub fn http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Limits how many times a 401 may trigger a refresh for one call.
    #[must_use]
    pub const fn max_auth_follow_ups(mut self, max: usize) -> Self {
        self.max_auth_follow_ups = max;
        self
    }

    /// Builds both pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError::Missing`] without a session store, a
    /// notifier, or (when no custom transport is set) a base URL.
    pub fn build(self) -> Result<OAuthClients, ClientBuildError> {
        let session_store = self
            .session_store
            .ok_or(ClientBuildError::Missing("session store"))?;
        let notifier = self
            .notifier
            .ok_or(ClientBuildError::Missing("session expired notifier"))?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        let http: Arc<dyn HttpClient> = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::with_options(
                self.http_settings.timeout_ms,
                &self.http_settings.user_agent,
            )?),
        };

        let sessionless = Arc::new(SessionlessClient::new(
            Arc::clone(&http),
            ClientIdParameter::new(self.client_id),
        ));

        let refresh_transport: Arc<dyn RefreshTransport> = match self.refresh_transport {
            Some(transport) => transport,
            None => {
                let base_url = self
                    .base_url
                    .as_ref()
                    .ok_or(ClientBuildError::Missing("base URL"))?;
                let mut transport =
                    FormRefreshTransport::new(sessionless.clone(), base_url, self.endpoint)?;
                if let Some(provider) = self.field_provider {
                    transport = transport.with_field_provider(provider);
                }
                Arc::new(transport)
            }
        };

        // Without tracking the expiry is pinned to MAX, so the gate never fires
        // even when the token endpoint omits `expires_in`.
        let tracks_expiration = self.expiration_store.is_some();
        let expiration_store = self
            .expiration_store
            .unwrap_or_else(|| Arc::new(NeverExpiringTokenExpirationStore));

        let mut authenticator =
            Authenticator::builder(session_store, refresh_transport, notifier, Arc::clone(&clock))
                .expiration_store(Arc::clone(&expiration_store));
        if let Some(classifier) = self.classifier {
            authenticator = authenticator.classifier(classifier);
        }
        let authenticator = Arc::new(authenticator.build());

        let session = SessionClient::new(http, Arc::clone(&authenticator))
            .with_max_auth_follow_ups(self.max_auth_follow_ups)
            .with_gate(ExpirationGate::new(
                Arc::clone(&authenticator),
                expiration_store,
                clock,
            ));

        info!(
            tracks_expiration,
            max_auth_follow_ups = self.max_auth_follow_ups,
            "OAuth clients ready"
        );
        Ok(OAuthClients {
            session: Arc::new(session),
            sessionless,
            authenticator,
        })
    }
}

impl std::fmt::Debug for OAuthClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClientBuilder")
            .field("client_id", &self.client_id)
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokenwarden_domain::TokenExpiration;

    #[test]
    fn test_session_store_is_required() {
        let error = OAuthClientBuilder::new("app")
            .notifier(Arc::new(|| {}))
            .base_url(Url::parse("https://api.example.com/").unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(error, ClientBuildError::Missing("session store")));
    }

    #[test]
    fn test_base_url_is_required_for_form_transport() {
        let error = OAuthClientBuilder::new("app")
            .session_store(Arc::new(InMemorySessionStore::new()))
            .notifier(Arc::new(|| {}))
            .build()
            .unwrap_err();
        assert!(matches!(error, ClientBuildError::Missing("base URL")));
    }

    async fn stored_expiry(settings: &TokenwardenSettings) -> TokenExpiration {
        let clients = OAuthClientBuilder::from_settings(settings)
            .unwrap()
            .notifier(Arc::new(|| {}))
            .build()
            .unwrap();
        clients
            .authenticator
            .expiration_store()
            .unwrap()
            .access_token_expires_at()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_expiry_never_expires_by_default() {
        let settings = TokenwardenSettings {
            base_url: Some("https://api.example.com/".to_string()),
            client_id: "app".to_string(),
            ..TokenwardenSettings::default()
        };
        assert_eq!(stored_expiry(&settings).await, TokenExpiration::NEVER);
    }

    #[tokio::test]
    async fn test_enabled_tracking_starts_unset() {
        let mut settings = TokenwardenSettings {
            base_url: Some("https://api.example.com/".to_string()),
            ..TokenwardenSettings::default()
        };
        settings.session.token_expiration = true;
        assert_eq!(stored_expiry(&settings).await, TokenExpiration::UNSET);
    }

    #[tokio::test]
    async fn test_without_token_expiration_drops_configured_store() {
        let clients = OAuthClientBuilder::new("app")
            .base_url(Url::parse("https://api.example.com/").unwrap())
            .session_store(Arc::new(InMemorySessionStore::new()))
            .expiration_store(Arc::new(InMemoryTokenExpirationStore::new()))
            .without_token_expiration()
            .notifier(Arc::new(|| {}))
            .build()
            .unwrap();
        let expiry = clients
            .authenticator
            .expiration_store()
            .unwrap()
            .access_token_expires_at()
            .await
            .unwrap();
        assert_eq!(expiry, TokenExpiration::NEVER);
    }
}
