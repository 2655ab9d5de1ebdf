//! Refresh transport port

use async_trait::async_trait;
use thiserror::Error;
use tokenwarden_domain::{SessionPayload, StatusCode};

use super::HttpClientError;

/// The refresh endpoint answered with a non-success status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("refresh endpoint answered {status}: {body}")]
pub struct HttpStatusError {
    /// Status of the refresh response.
    pub status: StatusCode,
    /// Body of the refresh response, decoded lossily.
    pub body: String,
}

impl HttpStatusError {
    /// Creates a new status error.
    #[must_use]
    pub fn new(status: impl Into<StatusCode>, body: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            body: body.into(),
        }
    }
}

/// Errors raised by a [`RefreshTransport`].
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The endpoint rejected the refresh.
    #[error("refresh rejected: {0}")]
    Status(#[from] HttpStatusError),

    /// The refresh request never produced a response.
    #[error("refresh request failed: {0}")]
    Transport(#[from] HttpClientError),

    /// The success body did not contain a session.
    #[error("refresh response could not be decoded: {0}")]
    Decode(String),
}

/// Exchanges a refresh token for a new session.
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// Performs one refresh call.
    ///
    /// # Errors
    ///
    /// Non-success responses surface as [`RefreshError::Status`] so the
    /// session-expired classifier can inspect status and body.
    async fn refresh(&self, refresh_token: &str) -> Result<SessionPayload, RefreshError>;
}
