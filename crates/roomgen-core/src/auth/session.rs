use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::{SessionStore, SessionStoreError};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

/// Session store persisted as a JSON file, for hosts without a keychain.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    cache_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<Option<String>, SessionStoreError> {
        let contents = match tokio::fs::read_to_string(self.session_path()).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let data: SessionData = serde_json::from_str(&contents)?;
        Ok(Some(data.token))
    }

    async fn set(&self, token: &str) -> Result<(), SessionStoreError> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let data = SessionData {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&data)?;
        tokio::fs::write(self.session_path(), contents).await?;
        debug!(path = %self.session_path().display(), "Saved session file");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        match tokio::fs::remove_file(self.session_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested"));

        assert_eq!(store.get().await.unwrap(), None);
        store.set("T1").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("T1"));

        // A second store over the same directory sees the persisted token
        let reopened = FileSessionStore::new(dir.path().join("nested"));
        assert_eq!(reopened.get().await.unwrap().as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_set_overwrites_and_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf());

        store.set("first").await.unwrap();
        store.set("second").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("second"));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "not json").unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf());
        assert!(matches!(store.get().await, Err(SessionStoreError::Serde(_))));
    }
}
