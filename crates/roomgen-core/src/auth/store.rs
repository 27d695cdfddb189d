use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::SessionBackend;

use super::{FileSessionStore, KeyringSessionStore};

/// Fixed key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "userToken";

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable single-slot holder of the current bearer token.
///
/// Implementations must make `set` overwrite any previous token and make
/// `clear` succeed when nothing is stored.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self) -> Result<Option<String>, SessionStoreError>;

    async fn set(&self, token: &str) -> Result<(), SessionStoreError>;

    async fn clear(&self) -> Result<(), SessionStoreError>;
}

/// Build the configured store backend.
pub fn open_store(backend: SessionBackend, cache_dir: PathBuf) -> Arc<dyn SessionStore> {
    match backend {
        SessionBackend::Keyring => Arc::new(KeyringSessionStore::new()),
        SessionBackend::File => Arc::new(FileSessionStore::new(cache_dir)),
    }
}

/// In-process store with no durability. Used in tests and for one-off
/// clients that should never touch the keychain.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.token.read().await.clone())
    }

    async fn set(&self, token: &str) -> Result<(), SessionStoreError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        *self.token.write().await = None;
        Ok(())
    }
}
