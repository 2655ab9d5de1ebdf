//! Absolute access-token expiry.

use serde::{Deserialize, Serialize};

/// Point in time (milliseconds since the Unix epoch) after which the access
/// token is considered expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenExpiration(i64);

impl TokenExpiration {
    /// Never set; any clock reading treats it as expired.
    pub const UNSET: Self = Self(i64::MIN);

    /// Expiration tracking disabled; never expires.
    pub const NEVER: Self = Self(i64::MAX);

    /// Wraps a raw epoch-millisecond timestamp.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the raw epoch-millisecond timestamp.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Expiry `expires_in_seconds` after `now_millis`.
    #[must_use]
    pub const fn after(now_millis: i64, expires_in_seconds: i64) -> Self {
        Self(now_millis.saturating_add(expires_in_seconds.saturating_mul(1000)))
    }

    /// Returns true if the token is expired at `now_millis`.
    ///
    /// The boundary is exclusive: a token expiring exactly now is still valid.
    #[must_use]
    pub const fn is_expired_at(self, now_millis: i64) -> bool {
        self.0 < now_millis
    }
}

impl Default for TokenExpiration {
    fn default() -> Self {
        Self::UNSET
    }
}

impl From<i64> for TokenExpiration {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}
