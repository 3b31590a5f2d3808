//! Durable session-token storage and the in-memory session cell.
//!
//! The backend hands out an opaque token at login; it is the only piece of
//! state shared across pipeline runs. It is loaded once at pipeline start
//! and mutated in exactly one place: the verifier clears it when the backend
//! rejects it, so later runs start unauthenticated.

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Durable storage for the session token.
///
/// Abstracted behind a trait so tests can inject arbitrary token states
/// without touching shared storage.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any. Whitespace-only entries count as absent.
    async fn load(&self) -> Result<Option<String>>;

    /// Persist a new token, replacing any previous one.
    async fn save(&self, token: &str) -> Result<()>;

    /// Delete the stored token. Clearing an absent token is not an error.
    async fn clear(&self) -> Result<()>;
}

/// File-backed token store: a single named entry holding the token as
/// plain text.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &str) -> Result<()> {
        self.ensure_parent_dir().await?;
        let mut file = fs::File::create(&self.path).await?;
        file.write_all(token.as_bytes()).await?;
        file.sync_all().await?;
        tracing::debug!(path = %self.path.display(), "Session token stored");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Session token cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory token store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            inner: Mutex::new(token),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, token: &str) -> Result<()> {
        *self.inner.lock().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.lock().await = None;
        Ok(())
    }
}

/// In-memory session state for one pipeline instance.
///
/// Single-owner credential cell: loaded from a [`TokenStore`] at pipeline
/// start, cleared by the verifier on invalidation. The verified flag only
/// ever refers to the current token value.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    verified: bool,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            verified: false,
        }
    }

    /// Load the session from durable storage.
    pub async fn from_store(store: &dyn TokenStore) -> Result<Self> {
        Ok(Self::new(store.load().await?))
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Record a successful verification of the current token.
    pub fn mark_verified(&mut self) {
        self.verified = self.token.is_some();
    }

    /// Replace the token, e.g. after a fresh login. Resets the verified flag.
    pub fn replace(&mut self, token: String) {
        self.token = Some(token);
        self.verified = false;
    }

    /// Drop the token after the backend rejected it.
    pub fn invalidate(&mut self) {
        self.token = None;
        self.verified = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token"));

        assert_eq!(store.load().await.unwrap(), None);

        store.save("tok-123").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("tok-123".to_string()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token"));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_trims_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        tokio::fs::write(&path, "  tok-9\n").await.unwrap();

        let store = FileTokenStore::new(&path);
        assert_eq!(store.load().await.unwrap(), Some("tok-9".to_string()));
    }

    #[tokio::test]
    async fn file_store_treats_blank_entry_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        tokio::fs::write(&path, "   \n").await.unwrap();

        let store = FileTokenStore::new(&path);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested/dir/token"));
        store.save("tok").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("tok".to_string()));
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryTokenStore::default();
        assert_eq!(store.load().await.unwrap(), None);
        store.save("tok").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("tok".to_string()));
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn session_loads_from_store() {
        let store = MemoryTokenStore::new(Some("tok".to_string()));
        let session = Session::from_store(&store).await.unwrap();
        assert_eq!(session.token(), Some("tok"));
        assert!(!session.is_verified());
    }

    #[test]
    fn session_invalidate_clears_everything() {
        let mut session = Session::new(Some("tok".to_string()));
        session.mark_verified();
        assert!(session.is_verified());

        session.invalidate();
        assert_eq!(session.token(), None);
        assert!(!session.is_verified());
    }

    #[test]
    fn session_replace_resets_verified_flag() {
        let mut session = Session::new(Some("old".to_string()));
        session.mark_verified();
        session.replace("new".to_string());
        assert_eq!(session.token(), Some("new"));
        assert!(!session.is_verified());
    }

    #[test]
    fn mark_verified_without_token_is_a_no_op() {
        let mut session = Session::new(None);
        session.mark_verified();
        assert!(!session.is_verified());
    }
}
