//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the authentication core and external
//! systems. Each port is a trait implemented by adapters in the
//! infrastructure layer or by the caller.

mod clock;
mod file_system;
mod http_client;
mod notifier;
mod refresh_transport;
mod session_store;

pub use clock::Clock;
pub use file_system::{FileSystem, FileSystemError};
pub use http_client::{HttpClient, HttpClientError, HttpFuture};
pub use notifier::SessionExpiredNotifier;
pub use refresh_transport::{HttpStatusError, RefreshError, RefreshTransport};
pub use session_store::{SessionStore, StoreError, TokenExpirationStore};
