//! Outbound request type

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Name of the header carrying the access token.
pub const AUTHORIZATION: &str = "Authorization";

/// Name of the content type header.
pub const CONTENT_TYPE: &str = "Content-Type";

/// An HTTP request as it travels through the authentication pipeline.
///
/// Requests are values: every decorator returns an updated copy and the
/// caller's original stays untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute target URL including query string.
    pub url: Url,
    /// Request headers.
    #[serde(default)]
    pub headers: Headers,
    /// Raw body bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub const fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Parses `url` and creates a request for it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if `url` is not an absolute URL.
    pub fn parse(method: HttpMethod, url: &str) -> DomainResult<Self> {
        let url = Url::parse(url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {url}")))?;
        Ok(Self::new(method, url))
    }

    /// Creates a GET request.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request.
    #[must_use]
    pub const fn post(url: Url) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Returns a copy with `name` set to `value`, replacing earlier values.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Returns a copy carrying `body` with the given content type.
    #[must_use]
    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.headers.set(CONTENT_TYPE, content_type);
        self.body = Some(body.into());
        self
    }

    /// Returns a copy with `name=value` appended to the query string.
    #[must_use]
    pub fn with_query_param(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Returns the first value of header `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns the current `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION)
    }

    /// Returns the value of query parameter `name`, if present.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}
