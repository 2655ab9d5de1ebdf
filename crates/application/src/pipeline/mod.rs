//! Request pipelines: the session-bound client and the session-less one.

mod client_id;
mod session_client;
mod sessionless_client;

pub use client_id::{CLIENT_ID_PARAMETERS, ClientIdParameter};
pub use session_client::{DEFAULT_MAX_AUTH_FOLLOW_UPS, SessionClient, SessionClientError};
pub use sessionless_client::SessionlessClient;
