//! Durable key-value stores backing the persistence adapter
//!
//! The booth only needs string blobs under a handful of fixed keys, so the
//! store interface is deliberately small. Two backends are provided:
//! - [`MemoryStore`]: process-local, used by tests and throwaway sessions;
//!   can be told to fail writes
//! - [`FileStore`]: one `<key>.json` file per key in a data directory

use crate::{Result, storage_error};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// String-keyed blob store
pub trait KeyValueStore {
    /// Backend identifier for logs
    fn backend_name(&self) -> &'static str;

    /// Read a blob; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a blob, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a blob; deleting an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`remove` fail
    pub fn set_fail_writes(&mut self, fail_writes: bool) {
        self.fail_writes = fail_writes;
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.fail_writes {
            return Err(storage_error!("in-memory write rejected for key {}", key));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "in_memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_writable(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check_writable(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store
///
/// Writes go to a uniquely named temp file in the same directory and are
/// renamed over the target, so a crash never leaves a half-written blob.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!("File store opened at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(storage_error!("invalid store key: {:?}", key));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = self
            .dir
            .join(format!(".{key}.{}.tmp", uuid::Uuid::new_v4().simple()));

        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
