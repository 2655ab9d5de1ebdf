//! Refresh transport posting a form to the token endpoint.
//!
//! The request is `application/x-www-form-urlencoded`, built from (in order)
//! the extra fields, the refresh token under its configured field name and
//! the grant type. A later field with the same name replaces an earlier one
//! in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokenwarden_application::ports::{HttpClient, HttpStatusError, RefreshError, RefreshTransport};
use tokenwarden_domain::{HttpRequest, SessionPayload, token_preview};
use tracing::debug;
use url::Url;

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Default path of the token endpoint, relative to the base URL.
pub const DEFAULT_REFRESH_PATH: &str = "oauth/token";

/// Default form field carrying the refresh token.
pub const DEFAULT_REFRESH_TOKEN_FIELD: &str = "refresh_token";

/// Default `grant_type` value.
pub const DEFAULT_GRANT_TYPE: &str = "refresh_token";

const GRANT_TYPE_FIELD: &str = "grant_type";

/// Token endpoint success body.
#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    #[serde(default)]
    user_id: String,
    access_token: String,
    refresh_token: String,
    token_type: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl From<RefreshTokenResponse> for SessionPayload {
    fn from(response: RefreshTokenResponse) -> Self {
        Self {
            user_id: response.user_id,
            token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
        }
    }
}

/// Where and how the refresh form is posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshEndpoint {
    /// Path of the token endpoint, joined onto the base URL.
    pub path: String,
    /// Name of the field carrying the refresh token.
    pub refresh_token_field: String,
    /// `grant_type` value; `None` omits the field.
    pub grant_type: Option<String>,
    /// Static fields sent ahead of the refresh token.
    pub extra_fields: BTreeMap<String, String>,
}

impl Default for RefreshEndpoint {
    fn default() -> Self {
        Self {
            path: DEFAULT_REFRESH_PATH.to_string(),
            refresh_token_field: DEFAULT_REFRESH_TOKEN_FIELD.to_string(),
            grant_type: Some(DEFAULT_GRANT_TYPE.to_string()),
            extra_fields: BTreeMap::new(),
        }
    }
}

/// Supplies additional form fields computed from the refresh token.
pub trait RefreshFieldProvider: Send + Sync {
    /// Returns the fields to add for `refresh_token`.
    fn fields(&self, refresh_token: &str) -> Vec<(String, String)>;
}

impl<F> RefreshFieldProvider for F
where
    F: Fn(&str) -> Vec<(String, String)> + Send + Sync,
{
    fn fields(&self, refresh_token: &str) -> Vec<(String, String)> {
        self(refresh_token)
    }
}

fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: &str) {
    match fields.iter_mut().find(|(existing, _)| existing == name) {
        Some((_, existing)) => value.clone_into(existing),
        None => fields.push((name.to_string(), value.to_string())),
    }
}

/// Posts the refresh form through an [`HttpClient`].
///
/// Point it at the session-less pipeline so the client id travels with the
/// refresh call.
pub struct FormRefreshTransport {
    http: Arc<dyn HttpClient>,
    url: Url,
    endpoint: RefreshEndpoint,
    field_provider: Option<Arc<dyn RefreshFieldProvider>>,
}

impl FormRefreshTransport {
    /// Creates the transport for `endpoint` relative to `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint path cannot be joined onto `base_url`.
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: &Url,
        endpoint: RefreshEndpoint,
    ) -> Result<Self, url::ParseError> {
        let url = base_url.join(&endpoint.path)?;
        Ok(Self {
            http,
            url,
            endpoint,
            field_provider: None,
        })
    }

    /// Adds fields computed per call.
    #[must_use]
    pub fn with_field_provider(mut self, provider: Arc<dyn RefreshFieldProvider>) -> Self {
        self.field_provider = Some(provider);
        self
    }

    /// Returns the resolved token endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Builds the ordered form fields for `refresh_token`.
    #[must_use]
    pub fn form_fields(&self, refresh_token: &str) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .endpoint
            .extra_fields
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if let Some(provider) = &self.field_provider {
            for (name, value) in provider.fields(refresh_token) {
                set_field(&mut fields, &name, &value);
            }
        }
        set_field(&mut fields, &self.endpoint.refresh_token_field, refresh_token);
        if let Some(grant_type) = &self.endpoint.grant_type {
            set_field(&mut fields, GRANT_TYPE_FIELD, grant_type);
        }
        fields
    }
}

#[async_trait]
impl RefreshTransport for FormRefreshTransport {
    async fn refresh(&self, refresh_token: &str) -> Result<SessionPayload, RefreshError> {
        let body = serde_urlencoded::to_string(self.form_fields(refresh_token))
            .map_err(|e| RefreshError::Decode(format!("Failed to encode form: {e}")))?;
        let request = HttpRequest::post(self.url.clone()).with_body(FORM_CONTENT_TYPE, body);

        debug!(
            url = %self.url,
            refresh_token = %token_preview(refresh_token),
            "posting refresh form"
        );
        let response = self.http.execute(&request).await?;

        if !response.status.is_success() {
            return Err(HttpStatusError::new(response.status, response.text()).into());
        }

        let token_response: RefreshTokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| RefreshError::Decode(format!("Failed to parse token response: {e}")))?;
        Ok(token_response.into())
    }
}

impl std::fmt::Debug for FormRefreshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormRefreshTransport")
            .field("url", &self.url.as_str())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
