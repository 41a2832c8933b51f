//! Per-user document persistence.
//!
//! The editor treats storage as an opaque `load`/`save` pair. Both are
//! best-effort: callers log failures and carry on with whatever text they
//! have. Nothing here retries.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Owner of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors from a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The user id cannot name a document.
    #[error("invalid user id `{0}`")]
    InvalidUser(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The backing store refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Load/save of one text document per user.
pub trait DocumentStore {
    /// Load a user's document. A user with no document yet gets `""`.
    fn load(&self, user: &UserId) -> Result<String, StoreError>;

    /// Replace a user's document.
    fn save(&mut self, user: &UserId, text: &str) -> Result<(), StoreError>;
}

// ─── In-memory ───────────────────────────────────────────────────────────

/// Map-backed store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<UserId, String>,
    /// When set, every call fails with `Unavailable`.
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, user: impl Into<UserId>, text: impl Into<String>) -> Self {
        self.documents.insert(user.into(), text.into());
        self
    }

    /// Simulate an unreachable backend.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn get(&self, user: &UserId) -> Option<&str> {
        self.documents.get(user).map(String::as_str)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Unavailable("memory store is offline".into()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, user: &UserId) -> Result<String, StoreError> {
        self.check_online()?;
        Ok(self.get(user).unwrap_or_default().to_string())
    }

    fn save(&mut self, user: &UserId, text: &str) -> Result<(), StoreError> {
        self.check_online()?;
        self.documents.insert(user.clone(), text.to_string());
        Ok(())
    }
}

// ─── Filesystem ──────────────────────────────────────────────────────────

/// One `<user>.am` file per user under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub const EXTENSION: &'static str = "am";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a user's document. Rejects ids that could escape `root`.
    pub fn path_for(&self, user: &UserId) -> Result<PathBuf, StoreError> {
        let id = user.as_str();
        let invalid = id.is_empty()
            || id.contains('/')
            || id.contains('\\')
            || id.contains("..")
            || id.contains('\0');
        if invalid {
            return Err(StoreError::InvalidUser(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.{}", Self::EXTENSION)))
    }
}

impl DocumentStore for FileStore {
    fn load(&self, user: &UserId) -> Result<String, StoreError> {
        let path = self.path_for(user)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, user: &UserId, text: &str) -> Result<(), StoreError> {
        let path = self.path_for(user)?;
        fs::create_dir_all(&self.root)?;
        // Readers never see a half-written document.
        let tmp = path.with_extension(format!("{}.tmp", Self::EXTENSION));
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &path)?;
        log::debug!("saved {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_defaults_to_empty() {
        let mut store = MemoryStore::new();
        let alice = UserId::from("alice");
        assert_eq!(store.load(&alice).unwrap(), "");
        store.save(&alice, "A -> B").unwrap();
        assert_eq!(store.load(&alice).unwrap(), "A -> B");
    }

    #[test]
    fn memory_store_offline() {
        let mut store = MemoryStore::new().with_document("alice", "A");
        store.set_offline(true);
        let alice = UserId::from("alice");
        assert!(matches!(store.load(&alice), Err(StoreError::Unavailable(_))));
        assert!(store.save(&alice, "B").is_err());
        store.set_offline(false);
        assert_eq!(store.load(&alice).unwrap(), "A");
    }

    #[test]
    fn file_store_rejects_escaping_ids() {
        let store = FileStore::new("/tmp/appmaps");
        for bad in ["", "../etc", "a/b", "a\\b", ".."] {
            assert!(
                matches!(store.path_for(&UserId::from(bad)), Err(StoreError::InvalidUser(_))),
                "{bad:?} accepted"
            );
        }
        assert_eq!(
            store.path_for(&UserId::from("bob")).unwrap(),
            PathBuf::from("/tmp/appmaps/bob.am")
        );
    }
}
