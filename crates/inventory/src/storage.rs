//! Client-local key/value storage the inventory is mirrored to.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read key {key:?}: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write key {key:?}: {reason}")]
    Write { key: String, reason: String },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("storage location unavailable: {0}")]
    Unavailable(String),
}

/// Whole-value key/value storage.
///
/// Values are replaced wholesale on every `set`; there are no partial writes.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Copy whatever is stored under `key` to `backup_key`, byte for byte.
    ///
    /// Unlike `get` this must work even when the stored value is not valid
    /// text. Returns `false` when nothing is stored under `key`.
    fn copy_raw(&mut self, key: &str, backup_key: &str) -> Result<bool, StorageError> {
        match self.get(key)? {
            Some(value) => self.set(backup_key, &value).map(|()| true),
            None => Ok(false),
        }
    }
}

impl<S> KeyValueStorage for &mut S
where
    S: KeyValueStorage + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn copy_raw(&mut self, key: &str, backup_key: &str) -> Result<bool, StorageError> {
        (**self).copy_raw(key, backup_key)
    }
}

impl<S> KeyValueStorage for Box<S>
where
    S: KeyValueStorage + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn copy_raw(&mut self, key: &str, backup_key: &str) -> Result<bool, StorageError> {
        (**self).copy_raw(key, backup_key)
    }
}

/// In-memory storage for tests/embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    entries: HashMap<String, String>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a value, as if written by an earlier session.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed storage: one `<key>.json` file per key.
///
/// Writes go to a sibling temp file that is then renamed over the target, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            StorageError::Unavailable(format!("failed to create {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    /// `{app_data_dir}/wastetrack`, falling back to `~/.local/share/wastetrack`.
    pub fn default_dir() -> Result<PathBuf, StorageError> {
        let base = dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".local");
                    h.push("share");
                    h
                })
            })
            .ok_or_else(|| {
                StorageError::Unavailable(
                    "no OS data directory or home directory available".to_string(),
                )
            })?;
        Ok(base.join("wastetrack"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => {
                tracing::debug!(key, path = %path.display(), bytes = value.len(), "storage read");
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let write_err = |e: std::io::Error| StorageError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let mut file = fs::File::create(&tmp).map_err(write_err)?;
        file.write_all(value.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);
        fs::rename(&tmp, &path).map_err(write_err)?;

        tracing::debug!(key, path = %path.display(), bytes = value.len(), "storage write");
        Ok(())
    }

    fn copy_raw(&mut self, key: &str, backup_key: &str) -> Result<bool, StorageError> {
        let from = self.path_for(key)?;
        let to = self.path_for(backup_key)?;
        match fs::copy(&from, &to) {
            Ok(bytes) => {
                tracing::debug!(key, backup_key, bytes, "storage raw copy");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Write {
                key: backup_key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
