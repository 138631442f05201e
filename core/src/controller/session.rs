use crate::prelude::{AfcError, AfcResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key of the single "remember last state" slot.
pub const CACHE_KEY: &str = "afcConsoleCache";

/// Key-value slot store the controller persists its snapshot into.
pub trait SessionStorage {
    fn get(&self, key: &str) -> AfcResult<Option<String>>;
    fn set(&self, key: &str, value: String) -> AfcResult<()>;
    fn clear(&self, key: &str) -> AfcResult<()>;
}

/// Process-local storage, mostly for tests.
#[derive(Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> AfcResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| AfcError::Storage("slot lock poisoned".into()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> AfcResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| AfcError::Storage("slot lock poisoned".into()))?;
        slots.insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&self, key: &str) -> AfcResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| AfcError::Storage("slot lock poisoned".into()))?;
        slots.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a cache directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> AfcResult<Option<String>> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AfcError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: String) -> AfcResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| AfcError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.slot_path(key);
        fs::write(&path, value).map_err(|source| AfcError::Io { path, source })
    }

    fn clear(&self, key: &str) -> AfcResult<()> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AfcError::Io { path, source }),
        }
    }
}
