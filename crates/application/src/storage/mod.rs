//! Store implementations that need no I/O.

mod combined;
mod in_memory;
mod never_expiring;

pub use combined::CombinedStore;
pub use in_memory::{InMemorySessionStore, InMemoryTokenExpirationStore};
pub use never_expiring::NeverExpiringTokenExpirationStore;
