//! Tokenwarden Domain - Core session authentication types
//!
//! This crate defines the requests, responses and session values that flow
//! through the authentication pipeline. All types here are pure Rust with no
//! I/O dependencies.

pub mod auth;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{
    AuthFinishedInvalidation, INVALIDATION_AFTER_REFRESH_HEADER_NAME,
    INVALIDATION_AFTER_REFRESH_HEADER_VALUE, RefreshOutcome, Session, SessionPayload,
    TokenExpiration, find_cause, is_caused_by_auth_invalidation, is_marked_for_invalidation,
    mark_for_invalidation, recover_auth_invalidation, token_preview,
};
pub use error::{DomainError, DomainResult};
pub use request::{Header, Headers, HttpMethod, HttpRequest};
pub use response::{HttpResponse, StatusCode};
