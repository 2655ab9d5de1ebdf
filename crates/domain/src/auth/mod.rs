//! Session and token types

mod expiration;
mod invalidation;
mod outcome;
mod session;

pub use expiration::TokenExpiration;
pub use invalidation::{
    AuthFinishedInvalidation, INVALIDATION_AFTER_REFRESH_HEADER_NAME,
    INVALIDATION_AFTER_REFRESH_HEADER_VALUE, find_cause, is_caused_by_auth_invalidation,
    is_marked_for_invalidation, mark_for_invalidation, recover_auth_invalidation,
};
pub use outcome::RefreshOutcome;
pub use session::{Session, SessionPayload, token_preview};
