//! Session data held by the session store.

use serde::{Deserialize, Serialize};

/// The credentials of the signed-in user.
///
/// All fields are empty strings when no session exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Identifier of the signed-in user.
    #[serde(default)]
    pub user_id: String,
    /// Access token sent with every authenticated request.
    #[serde(default)]
    pub access_token: String,
    /// Token type used as the `Authorization` scheme (e.g. "Bearer").
    #[serde(default)]
    pub token_type: String,
    /// Token exchanged for a new access token.
    #[serde(default)]
    pub refresh_token: String,
}

impl Session {
    /// Returns the value of the `Authorization` header for this session.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Returns true when every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user_id.is_empty()
            && self.access_token.is_empty()
            && self.token_type.is_empty()
            && self.refresh_token.is_empty()
    }

    /// Returns true if a refresh can be attempted with this session.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

impl From<SessionPayload> for Session {
    fn from(payload: SessionPayload) -> Self {
        Self {
            user_id: payload.user_id,
            access_token: payload.token,
            token_type: payload.token_type,
            refresh_token: payload.refresh_token,
        }
    }
}

/// Session data returned by a successful token refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Identifier of the signed-in user.
    pub user_id: String,
    /// New access token.
    pub token: String,
    /// New refresh token.
    pub refresh_token: String,
    /// Token type.
    pub token_type: String,
    /// Access token lifetime in seconds, when the server reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

/// Shortens a token for log output.
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 8 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}
