// Local key -> JSON blob store.
//
// Collaborator-facing persistence (last opened chat, favorites and the
// like). One file per key under the platform config directory. The chat
// core never touches this; only the binary does.

use log::info;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine a config directory")]
    NoConfigDir,
    #[error("storage key {0:?} is not a valid file name")]
    InvalidKey(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

static STATE_DIR_OVERRIDE: OnceCell<PathBuf> = OnceCell::new();

/// Redirect all local state (blobs and the log file) to an explicit
/// directory. Takes effect only before the first store is opened.
pub fn set_state_dir_override(dir: PathBuf) {
    let _ = STATE_DIR_OVERRIDE.set(dir);
}

pub fn state_dir() -> Result<PathBuf, StorageError> {
    if let Some(dir) = STATE_DIR_OVERRIDE.get() {
        return Ok(dir.clone());
    }
    let dir = dirs::config_dir()
        .ok_or(StorageError::NoConfigDir)?
        .join("quadchat");
    Ok(dir)
}

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open the store under the default (or overridden) state directory,
    /// creating it if needed.
    pub fn open_default() -> Result<Self, StorageError> {
        Self::at(state_dir()?)
    }

    /// Open a store rooted at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.blob_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let path = self.blob_path(key)?;
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, value)?;
        info!("stored blob {:?} at {}", key, path.display());
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.blob_path(key)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys name flat files; anything that would escape the store
        // directory is rejected.
        if key.is_empty()
            || key
                .chars()
                .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
