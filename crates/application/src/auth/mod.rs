//! Token refresh core
//!
//! - [`AuthorizationHeader`] decorates requests with the stored token.
//! - [`Authenticator`] performs the synchronized refresh.
//! - [`ExpirationGate`] triggers the authenticator before a request with a
//!   known-expired token is sent.

mod authenticator;
mod authorization_header;
mod classifier;
mod expiration_gate;

pub use authenticator::{
    AuthenticateError, Authenticator, AuthenticatorBuilder, REFRESH_TOKEN_RETRY_COUNT,
};
pub use authorization_header::AuthorizationHeader;
pub use classifier::{
    DefaultSessionExpiredClassifier, EXPIRED_REFRESH_TOKEN_MARKER, INVALID_REFRESH_TOKEN_MARKER,
    SessionExpiredClassifier,
};
pub use expiration_gate::{ExpirationGate, GateDecision};
