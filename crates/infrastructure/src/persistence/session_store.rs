//! File-backed session and expiration stores.
//!
//! Each store keeps one JSON document in the configured directory. A missing
//! document means "nothing stored", so clearing simply deletes it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokenwarden_application::ports::{
    FileSystem, FileSystemError, SessionStore, StoreError, TokenExpirationStore,
};
use tokenwarden_domain::{Session, TokenExpiration};
use tracing::debug;

use super::TokioFileSystem;
use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// File name of the session document.
pub const SESSION_FILE_NAME: &str = "session.json";

/// File name of the expiration document.
pub const TOKEN_EXPIRATION_FILE_NAME: &str = "token_expiration.json";

#[derive(Debug, Serialize, Deserialize)]
struct ExpirationDocument {
    access_token_expires_at: TokenExpiration,
}

fn io_error(error: &FileSystemError) -> StoreError {
    StoreError::Io(error.to_string())
}

fn corrupt(path: &Path, error: &SerializationError) -> StoreError {
    StoreError::Corrupt(format!("{}: {error}", path.display()))
}

async fn read_document<F, T>(fs: &F, path: &Path) -> Result<Option<T>, StoreError>
where
    F: FileSystem,
    T: serde::de::DeserializeOwned,
{
    match fs.read_file(path).await {
        Ok(bytes) => from_json_bytes(&bytes)
            .map(Some)
            .map_err(|e| corrupt(path, &e)),
        Err(FileSystemError::NotFound(_)) => Ok(None),
        Err(e) => Err(io_error(&e)),
    }
}

async fn write_document<F, T>(fs: &F, path: &Path, value: &T) -> Result<(), StoreError>
where
    F: FileSystem,
    T: Serialize + Sync,
{
    let bytes = to_json_stable_bytes(value).map_err(|e| corrupt(path, &e))?;
    fs.write_file(path, &bytes).await.map_err(|e| io_error(&e))
}

/// Session store persisting `session.json` in a directory.
#[derive(Debug)]
pub struct FileSessionStore<F: FileSystem = TokioFileSystem> {
    fs: F,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore<TokioFileSystem> {
    /// Creates a store under `directory` on the real file system.
    #[must_use]
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self::with_file_system(TokioFileSystem::new(), directory)
    }
}

impl<F: FileSystem> FileSessionStore<F> {
    /// Creates a store under `directory` on `fs`.
    #[must_use]
    pub fn with_file_system(fs: F, directory: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: directory.as_ref().join(SESSION_FILE_NAME),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path of the session document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<F: FileSystem> SessionStore for FileSessionStore<F> {
    async fn load(&self) -> Result<Session, StoreError> {
        Ok(read_document(&self.fs, &self.path)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        write_document(&self.fs, &self.path, session).await?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.fs
            .remove_file(&self.path)
            .await
            .map_err(|e| io_error(&e))?;
        debug!(path = %self.path.display(), "session cleared");
        Ok(())
    }
}

/// Expiration store persisting `token_expiration.json` in a directory.
#[derive(Debug)]
pub struct FileTokenExpirationStore<F: FileSystem = TokioFileSystem> {
    fs: F,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenExpirationStore<TokioFileSystem> {
    /// Creates a store under `directory` on the real file system.
    #[must_use]
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self::with_file_system(TokioFileSystem::new(), directory)
    }
}

impl<F: FileSystem> FileTokenExpirationStore<F> {
    /// Creates a store under `directory` on `fs`.
    #[must_use]
    pub fn with_file_system(fs: F, directory: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: directory.as_ref().join(TOKEN_EXPIRATION_FILE_NAME),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path of the expiration document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<F: FileSystem> TokenExpirationStore for FileTokenExpirationStore<F> {
    async fn access_token_expires_at(&self) -> Result<TokenExpiration, StoreError> {
        Ok(read_document::<_, ExpirationDocument>(&self.fs, &self.path)
            .await?
            .map_or(TokenExpiration::UNSET, |doc| doc.access_token_expires_at))
    }

    async fn set_access_token_expires_at(
        &self,
        expires_at: TokenExpiration,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let document = ExpirationDocument {
            access_token_expires_at: expires_at,
        };
        write_document(&self.fs, &self.path, &document).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.fs
            .remove_file(&self.path)
            .await
            .map_err(|e| io_error(&e))
    }
}
