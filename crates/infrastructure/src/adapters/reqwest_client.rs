//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Every request the pipelines build ends up here.

use std::time::Duration;

use reqwest::{Client, Method};
use tokenwarden_application::ports::{HttpClient, HttpClientError, HttpFuture};
use tokenwarden_domain::{Headers, HttpMethod, HttpRequest, HttpResponse, StatusCode};
use tracing::{debug, warn};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("tokenwarden/", env!("CARGO_PKG_VERSION"));

const MAX_REDIRECTS: usize = 10;

/// HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// Default configuration:
    /// - Request timeout: 30 seconds
    /// - Follow redirects: up to 10
    /// - User-Agent: "tokenwarden/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::with_options(DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT)
    }

    /// Creates a client with a custom timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn with_options(timeout_ms: u64, user_agent: &str) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client, timeout_ms })
    }

    /// Creates a new HTTP client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn host_of(error: &reqwest::Error) -> String {
        error
            .url()
            .and_then(|u| u.host_str())
            .unwrap_or("unknown")
            .to_string()
    }

    /// Maps reqwest errors to the port's `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: Self::host_of(error),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: Self::host_of(error),
                    port: error
                        .url()
                        .and_then(reqwest::Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        if error.is_builder() {
            return HttpClientError::InvalidUrl(error.to_string());
        }

        HttpClientError::Other(error.to_string())
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: &HttpRequest) -> HttpFuture<'_> {
        let request = request.clone();
        let timeout_ms = self.timeout_ms;

        Box::pin(async move {
            let mut builder = self
                .client
                .request(Self::to_reqwest_method(request.method), request.url.clone());

            for header in request.headers.iter() {
                builder = builder.header(&header.name, &header.value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                let mapped = Self::map_error(&e, timeout_ms);
                warn!(url = %request.url, error = %mapped, "request failed");
                mapped
            })?;

            let status = StatusCode::new(response.status().as_u16());
            let message = response
                .status()
                .canonical_reason()
                .unwrap_or_else(|| status.reason_phrase())
                .to_string();
            let mut headers = Headers::new();
            for (name, value) in response.headers() {
                headers.append(
                    name.as_str(),
                    value.to_str().unwrap_or("<binary>").to_string(),
                );
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?
                .to_vec();

            debug!(
                method = %request.method,
                url = %request.url,
                status = status.as_u16(),
                "response received"
            );

            Ok(HttpResponse {
                status,
                message,
                headers,
                body,
                local: false,
            })
        })
    }
}
