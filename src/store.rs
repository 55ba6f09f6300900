use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::StoreError;

pub mod mock;

/// A synchronous, string-keyed key-value store, like a browser's local
/// storage. Values survive restarts until something clears them.
pub trait Store: Send + Sync {
    /// Gets the value stored under the given key, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the value stored under the given key. Either the whole
    /// value is written or none of it is.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the value stored under the given key, if any.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }
}

/// A store that keeps each key in its own file inside one directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a new instance, creating the directory if necessary.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(FileStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');

        if valid {
            Ok(self.root.join(format!("{}.json", key)))
        } else {
            Err(StoreError::InvalidKey(key.to_owned()))
        }
    }
}

impl Store for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;

        // write next to the target so the rename stays on one filesystem
        let mut file = NamedTempFile::new_in(&self.root)?;
        file.write_all(value.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&path).map_err(|e| e.error)?;

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
