//! Response types

mod spec;

pub use spec::{HttpResponse, SESSION_EXPIRED_MESSAGE, StatusCode};
