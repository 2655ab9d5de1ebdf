//! File-backed persistence

mod file_system;
mod session_store;

pub use file_system::TokioFileSystem;
pub use session_store::{
    FileSessionStore, FileTokenExpirationStore, SESSION_FILE_NAME, TOKEN_EXPIRATION_FILE_NAME,
};
