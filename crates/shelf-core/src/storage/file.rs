//! JSON file persistence
//!
//! The collection lives in a single pretty-printed JSON file. Writes go
//! to a temporary file first and are renamed into place, so readers never
//! observe a partially written collection.
//!
//! There is no locking: two writers racing on the same file both succeed
//! and the last rename wins.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::transfer::to_pretty_json;
use super::{BookStore, LoadedBooks};
use crate::models::Book;

/// Book store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for the file at `path` (the file need not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the backing file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the file as raw JSON values, without checking their shape
    ///
    /// Missing, unreadable or non-array contents are all `Read` errors.
    pub fn read_values(&self) -> StoreResult<Vec<Value>> {
        let content = self.read_content()?;
        serde_json::from_str(&content).map_err(|e| StoreError::read(self.path.display(), e))
    }

    /// Replace the file with raw JSON values, without checking their shape
    pub fn write_values(&self, values: &[Value]) -> StoreResult<()> {
        let content = to_pretty_json(values)?;
        self.write_content(&content)
    }

    fn read_content(&self) -> StoreResult<String> {
        fs::read_to_string(&self.path).map_err(|e| StoreError::read(self.path.display(), e))
    }

    fn write_content(&self, content: &str) -> StoreResult<()> {
        atomic_write(&self.path, content.as_bytes())?;
        debug!("Wrote {} bytes to {:?}", content.len(), self.path);
        Ok(())
    }
}

impl BookStore for FileStore {
    fn get_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.load()?.books)
    }

    fn load(&self) -> StoreResult<LoadedBooks> {
        LoadedBooks::from_values(self.read_values()?)
            .map_err(|e| StoreError::read(self.path.display(), e))
    }

    fn save_all(&mut self, books: &[Book]) -> StoreResult<()> {
        let content = to_pretty_json(books)?;
        self.write_content(&content)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::write(parent.display(), e))?;
        }
    }

    // Same directory, so the rename cannot cross filesystems
    let temp_path = path.with_extension("json.tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StoreError::write(temp_path.display(), e))?;
    file.write_all(data)
        .map_err(|e| StoreError::write(temp_path.display(), e))?;
    file.sync_all()
        .map_err(|e| StoreError::write(temp_path.display(), e))?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
