//! Key-value persistence for the session.
//!
//! A flat string map. `FileKvStore` keeps it as one JSON object on disk with
//! an in-memory cache; every mutation rewrites the file.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::debug;

use crate::error::{Result, ToolshareError};

/// Minimal async-storage style interface
pub trait KvStore: Send + Sync {
    /// Read one key
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write several keys in one go
    fn set_many(&self, entries: &[(&str, String)]) -> Result<()>;

    /// Remove several keys in one go; missing keys are ignored
    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

fn lock_error<E: std::fmt::Display>(e: E) -> ToolshareError {
    ToolshareError::Storage(e.to_string())
}

/// Volatile store, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().map_err(lock_error)?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = self.entries.write().map_err(lock_error)?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.write().map_err(lock_error)?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// JSON-file store with write-through cache
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, String>>,
}

impl FileKvStore {
    /// Open the store at `path`, creating parent directories. A missing or
    /// empty file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened key-value store at {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            cache: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the file from the given map
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let mut file = File::create(&self.path)?;
        restrict_permissions(&file)?;
        file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> Result<()> {
    Ok(())
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.read().map_err(lock_error)?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut cache = self.cache.write().map_err(lock_error)?;
        let mut next = cache.clone();
        for (key, value) in entries {
            next.insert(key.to_string(), value.clone());
        }
        // The cache only moves once the file holds the same state
        self.persist(&next)?;
        *cache = next;
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut cache = self.cache.write().map_err(lock_error)?;
        let mut next = cache.clone();
        for key in keys {
            next.remove(*key);
        }
        if next.len() == cache.len() && !self.path.exists() {
            return Ok(());
        }
        self.persist(&next)?;
        *cache = next;
        Ok(())
    }
}
