//! Response types
//!
//! Contains the status code newtype and the response value produced either by
//! the transport or locally by the authentication pipeline.

use serde::{Deserialize, Serialize};

use crate::request::{CONTENT_TYPE, Headers};

/// Message of the response synthesized when the session is known to be gone.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired!";

/// HTTP status code with semantic helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// 200 OK.
    pub const OK: Self = Self(200);
    /// 400 Bad Request.
    pub const BAD_REQUEST: Self = Self(400);
    /// 401 Unauthorized.
    pub const UNAUTHORIZED: Self = Self(401);

    /// Creates a new `StatusCode`.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns true if this is a 2xx success status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is a 4xx client error status.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Returns true if this is a 5xx server error status.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    /// Returns the canonical reason phrase for common status codes.
    #[must_use]
    pub const fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// An HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Status message (reason phrase or a local explanation).
    pub message: String,
    /// Response headers.
    #[serde(default)]
    pub headers: Headers,
    /// Raw body bytes.
    #[serde(default)]
    pub body: Vec<u8>,
    /// True when the response never left the process.
    #[serde(default)]
    pub local: bool,
}

impl HttpResponse {
    /// Creates a response with the canonical reason phrase as message.
    #[must_use]
    pub fn new(status: StatusCode, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            status,
            message: status.reason_phrase().to_string(),
            headers,
            body,
            local: false,
        }
    }

    /// The local 401 returned when the session expired before sending.
    ///
    /// It has an empty JSON body and is never sent over the network.
    #[must_use]
    pub fn session_expired() -> Self {
        let mut headers = Headers::new();
        headers.set(CONTENT_TYPE, "application/json");
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: SESSION_EXPIRED_MESSAGE.to_string(),
            headers,
            body: Vec::new(),
            local: true,
        }
    }

    /// Returns true for a 401 response.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status.0 == StatusCode::UNAUTHORIZED.0
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_categories() {
        assert!(StatusCode::new(204).is_success());
        assert!(StatusCode::UNAUTHORIZED.is_client_error());
        assert!(StatusCode::new(503).is_server_error());
        assert_eq!(StatusCode::UNAUTHORIZED.to_string(), "401 Unauthorized");
    }

    #[test]
    fn test_session_expired_response() {
        let response = HttpResponse::session_expired();
        assert!(response.is_unauthorized());
        assert!(response.local);
        assert_eq!(response.message, "Session expired!");
        assert_eq!(response.headers.get("content-type"), Some("application/json"));
        assert!(response.body.is_empty());
    }
}
