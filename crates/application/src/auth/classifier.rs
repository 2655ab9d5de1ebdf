//! Decides whether a refresh failure ends the session.

use std::error::Error;

use tokenwarden_domain::{StatusCode, find_cause};

use crate::ports::HttpStatusError;

/// Body marker of a 400 response rejecting the refresh token.
pub const INVALID_REFRESH_TOKEN_MARKER: &str = "\"Invalid refresh token:";

/// Body marker of a 401 response rejecting an expired refresh token.
pub const EXPIRED_REFRESH_TOKEN_MARKER: &str = "\"Invalid refresh token (expired):";

/// Classifies refresh failures as permanent (`true`) or transient (`false`).
pub trait SessionExpiredClassifier: Send + Sync {
    /// Returns true if `error` means the session can never be refreshed again.
    fn is_session_expired(&self, error: &(dyn Error + 'static)) -> bool;
}

impl<F> SessionExpiredClassifier for F
where
    F: Fn(&(dyn Error + 'static)) -> bool + Send + Sync,
{
    fn is_session_expired(&self, error: &(dyn Error + 'static)) -> bool {
        self(error)
    }
}

/// Recognizes the refresh-token rejections of the standard token endpoint.
///
/// Looks for an [`HttpStatusError`] anywhere in the cause chain: a 400 whose
/// body contains [`INVALID_REFRESH_TOKEN_MARKER`] or a 401 whose body contains
/// [`EXPIRED_REFRESH_TOKEN_MARKER`]. Everything else is transient.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSessionExpiredClassifier;

impl SessionExpiredClassifier for DefaultSessionExpiredClassifier {
    fn is_session_expired(&self, error: &(dyn Error + 'static)) -> bool {
        find_cause::<HttpStatusError>(error).is_some_and(|status_error| {
            match status_error.status {
                StatusCode::BAD_REQUEST => status_error.body.contains(INVALID_REFRESH_TOKEN_MARKER),
                StatusCode::UNAUTHORIZED => {
                    status_error.body.contains(EXPIRED_REFRESH_TOKEN_MARKER)
                }
                _ => false,
            }
        })
    }
}
