//! Tokenwarden Application - Ports, refresh core and request pipelines
//!
//! This crate holds the token refresh state machine and everything it talks
//! to through traits. Concrete HTTP, file and clock adapters live in the
//! infrastructure crate.

pub mod auth;
pub mod pipeline;
pub mod ports;
pub mod storage;

pub use auth::{
    AuthenticateError, Authenticator, AuthenticatorBuilder, AuthorizationHeader,
    DefaultSessionExpiredClassifier, ExpirationGate, GateDecision, REFRESH_TOKEN_RETRY_COUNT,
    SessionExpiredClassifier,
};
pub use pipeline::{
    ClientIdParameter, DEFAULT_MAX_AUTH_FOLLOW_UPS, SessionClient, SessionClientError,
    SessionlessClient,
};
pub use storage::{
    CombinedStore, InMemorySessionStore, InMemoryTokenExpirationStore,
    NeverExpiringTokenExpirationStore,
};
