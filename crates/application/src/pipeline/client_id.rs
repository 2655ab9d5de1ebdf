//! Client identifier for calls made without a session.

use tokenwarden_domain::HttpRequest;

/// Query parameter names carrying the client id. Both spellings are sent
/// because backends disagree on which one they read.
pub const CLIENT_ID_PARAMETERS: [&str; 2] = ["client_id", "clientId"];

/// Appends the client id to a request's query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdParameter {
    client_id: String,
}

impl ClientIdParameter {
    /// Creates the decorator for `client_id`.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }

    /// Returns the configured client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns a copy of `request` with `client_id` and `clientId` appended.
    #[must_use]
    pub fn apply(&self, request: HttpRequest) -> HttpRequest {
        CLIENT_ID_PARAMETERS
            .iter()
            .fold(request, |request, name| {
                request.with_query_param(name, &self.client_id)
            })
    }
}
