//! Storage layer
//!
//! Every backend reads and writes the whole collection at once; there is
//! no patch protocol. Backends:
//!
//! - **FileStore**: the JSON file on disk, used by the HTTP server
//! - **RemoteStore**: client for the HTTP server's `/api/books` endpoints
//! - **LocalStore**: a key in the local SQLite key/value store
//!
//! Import and export are backend-independent transforms in [`transfer`].

pub mod error;
pub mod file;
pub mod local;
pub mod remote;
pub mod schema;
pub mod transfer;

use std::time::Duration;

use serde_json::Value;

use crate::config::{BackendKind, Config};
use crate::models::Book;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use local::{LocalStorage, LocalStore};
pub use remote::RemoteStore;

/// A collection as read from a store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedBooks {
    pub books: Vec<Book>,
    /// Records stored without an `id` that were given a fresh one on read
    pub assigned_ids: usize,
}

impl LoadedBooks {
    /// Decode stored records, counting those without a string `id`
    pub fn from_values(values: Vec<Value>) -> serde_json::Result<Self> {
        let assigned_ids = values
            .iter()
            .filter(|value| !value.get("id").is_some_and(Value::is_string))
            .count();
        let books = values
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<Book>>>()?;

        Ok(Self {
            books,
            assigned_ids,
        })
    }
}

/// Read-all / write-all access to a book collection
pub trait BookStore {
    /// Load the full collection
    fn get_all(&self) -> StoreResult<Vec<Book>>;

    /// Load the full collection, reporting records that had no stored ID
    ///
    /// Stores that always persist IDs can keep the default.
    fn load(&self) -> StoreResult<LoadedBooks> {
        Ok(LoadedBooks {
            books: self.get_all()?,
            assigned_ids: 0,
        })
    }

    /// Replace the full collection
    fn save_all(&mut self, books: &[Book]) -> StoreResult<()>;

    /// Human-readable location, for logs and status output
    fn describe(&self) -> String;
}

/// Open the backend selected in the configuration
pub fn open_store(config: &Config) -> StoreResult<Box<dyn BookStore>> {
    match config.backend {
        BackendKind::Local => {
            let storage = LocalStorage::open(&config.local_db_path())?;
            Ok(Box::new(LocalStore::new(storage)))
        }
        BackendKind::Remote => {
            let timeout = Duration::from_secs(config.request_timeout_secs);
            Ok(Box::new(RemoteStore::new(&config.api_url, timeout)?))
        }
        BackendKind::File => Ok(Box::new(FileStore::new(config.books_file_path()))),
    }
}
