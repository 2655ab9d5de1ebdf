//! Result of a refresh attempt.

use crate::request::HttpRequest;

/// What a call to the authenticator produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The session holds a usable token; the request carries it.
    Refreshed(HttpRequest),
    /// The session is permanently invalid. Stores were cleared and the
    /// expiry notifier fired.
    Expired,
    /// Refreshing failed transiently. Nothing changed.
    RefreshFailed,
}

impl RefreshOutcome {
    /// Returns the updated request for [`RefreshOutcome::Refreshed`].
    #[must_use]
    pub fn into_request(self) -> Option<HttpRequest> {
        match self {
            Self::Refreshed(request) => Some(request),
            Self::Expired | Self::RefreshFailed => None,
        }
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Refreshed(_) => "refreshed",
            Self::Expired => "expired",
            Self::RefreshFailed => "refresh_failed",
        }
    }
}
