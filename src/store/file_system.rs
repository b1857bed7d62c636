use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::SessionStore;
use crate::config::SessionConfig;
use crate::error::StorageError;

/// File-backed store: one `<key>.json` file per key under a base directory
#[derive(Clone, Debug)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store with the default base directory ("./session")
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("./session"),
        }
    }

    /// Create a store with a custom base directory (for testing)
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Create a store rooted at the configured session directory
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new_with_base_dir(config.store_dir.clone())
    }

    /// Get the base directory path
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    /// Get the file path for a key, rejecting anything that could escape the base dir
    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        fs::create_dir_all(&self.base_path)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Removed session entry: {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
