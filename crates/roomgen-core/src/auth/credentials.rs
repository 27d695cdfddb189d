use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use super::store::{SessionStore, SessionStoreError, TOKEN_KEY};

const SERVICE_NAME: &str = "roomgen";

/// Session store backed by the OS keychain.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service: String,
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringSessionStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a different keychain service name, e.g. to isolate environments.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry, SessionStoreError> {
        Ok(Entry::new(&self.service, TOKEN_KEY)?)
    }
}

#[async_trait]
impl SessionStore for KeyringSessionStore {
    async fn get(&self) -> Result<Option<String>, SessionStoreError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, token: &str) -> Result<(), SessionStoreError> {
        self.entry()?.set_password(token)?;
        debug!(service = %self.service, "Stored session token in keychain");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
