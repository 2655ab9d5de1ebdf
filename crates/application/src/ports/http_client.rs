//! HTTP Client port

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tokenwarden_domain::{HttpRequest, HttpResponse};

/// Errors raised when a request never produced a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Applied timeout in milliseconds.
        timeout_ms: u64,
    },

    /// Host name resolution failed.
    #[error("DNS lookup failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying message.
        message: String,
    },

    /// The remote end refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// Connecting failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was reached.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// The request URL was rejected by the client.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Boxed future returned by [`HttpClient::execute`].
pub type HttpFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError>> + Send + 'a>>;

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation so request decorators
/// can wrap one another and tests can script responses.
pub trait HttpClient: Send + Sync {
    /// Sends `request` and returns whatever response the server produced,
    /// including error statuses.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    fn execute(&self, request: &HttpRequest) -> HttpFuture<'_>;
}
