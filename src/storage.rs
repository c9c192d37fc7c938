//! Persisted key/value storage for the session token, user id, display name, and theme.

use crate::domain::Credentials;
use secrecy::SecretString;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";
pub const NAME_KEY: &str = "name";
pub const THEME_KEY: &str = "theme";

/// Result type for storage access.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors returned while reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize session state: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("session storage lock poisoned")]
    Poisoned,
}

/// String key/value store shared by the session and theme state.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// TOML-backed storage that rewrites the whole file on each mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the store at `path`; a missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| StorageError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| StorageError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = toml::to_string(entries)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| StorageError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, content).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        guard.insert(key.to_owned(), value.to_owned());
        self.flush(&guard)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        if guard.remove(key).is_some() {
            self.flush(&guard)?;
        }
        Ok(())
    }
}

/// In-memory storage used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.to_owned(), value.to_owned()))
                    .collect(),
            ),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        guard.remove(key);
        Ok(())
    }
}

/// Signed-in user details read from storage at startup.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub credentials: Credentials,
    pub name: Option<String>,
}

impl Session {
    /// Reads the session keys; absent keys are not an error.
    pub fn load(storage: &dyn Storage) -> Result<Self> {
        Ok(Self {
            credentials: Credentials {
                token: storage.get(TOKEN_KEY)?.map(SecretString::from),
                user_id: storage.get(USER_ID_KEY)?,
            },
            name: storage.get(NAME_KEY)?,
        })
    }

    /// Greeting name, falling back to a generic label.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("User")
    }

    pub fn is_signed_in(&self) -> bool {
        self.credentials.usable_token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStorage, MemoryStorage, NAME_KEY, Session, Storage, TOKEN_KEY, USER_ID_KEY};

    #[test]
    fn file_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(USER_ID_KEY, "u1").unwrap();
        storage.remove(TOKEN_KEY).unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(reopened.get(USER_ID_KEY).unwrap().as_deref(), Some("u1"));
    }

    #[test]
    fn file_storage_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "token = [").unwrap();

        assert!(FileStorage::open(&path).is_err());
    }

    #[test]
    fn session_load_tolerates_missing_keys() {
        let storage = MemoryStorage::default();
        let session = Session::load(&storage).unwrap();

        assert!(!session.is_signed_in());
        assert_eq!(session.credentials.user_id, None);
        assert_eq!(session.display_name(), "User");
    }

    #[test]
    fn session_load_reads_all_keys() {
        let storage =
            MemoryStorage::with_entries([(TOKEN_KEY, "t"), (USER_ID_KEY, "u1"), (NAME_KEY, "Ada")]);
        let session = Session::load(&storage).unwrap();

        assert!(session.is_signed_in());
        assert_eq!(session.credentials.usable_user_id(), Some("u1"));
        assert_eq!(session.display_name(), "Ada");
    }
}
