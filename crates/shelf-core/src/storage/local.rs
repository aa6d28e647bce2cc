//! Local persistent storage
//!
//! `LocalStorage` is a small string key/value store in SQLite. It holds
//! the collection (`LocalStore`, under [`BOOKS_KEY`]) and the session flag
//! (see [`crate::session`]). Data stays on this device; nothing syncs.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{StoreError, StoreResult};
use super::schema::init_schema;
use super::transfer::to_pretty_json;
use super::{BookStore, LoadedBooks};
use crate::models::Book;

/// Key holding the serialized collection
pub const BOOKS_KEY: &str = "books";

/// Collection used when nothing has been stored yet
const DEFAULT_BOOKS: &str = include_str!("../../data/default_books.json");

/// String key/value store backed by SQLite
pub struct LocalStorage {
    conn: Connection,
    path: Option<PathBuf>,
}

impl LocalStorage {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a throwaway in-memory database (for tests)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove `key` (no-op if absent)
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Database location, `:memory:` for in-memory storage
    pub fn location(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string())
    }
}

/// Book store backed by local storage
pub struct LocalStore {
    storage: LocalStorage,
}

impl LocalStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Access the underlying key/value storage
    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }
}

impl BookStore for LocalStore {
    fn get_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.load()?.books)
    }

    /// Load the stored collection
    ///
    /// When nothing is stored yet, the bundled defaults are saved and
    /// returned so their IDs stay stable. Corrupt data is left in place
    /// and the defaults are returned without saving.
    fn load(&self) -> StoreResult<LoadedBooks> {
        let location = self.storage.location();
        let stored = self
            .storage
            .get(BOOKS_KEY)
            .map_err(|e| StoreError::read(&location, e))?;

        match stored {
            Some(raw) => {
                let parsed = serde_json::from_str::<Vec<Value>>(&raw)
                    .and_then(LoadedBooks::from_values);
                match parsed {
                    Ok(loaded) => Ok(loaded),
                    Err(e) => {
                        warn!(
                            "Stored collection in {} is corrupt ({}), using defaults",
                            location, e
                        );
                        Ok(LoadedBooks {
                            books: default_books(),
                            assigned_ids: 0,
                        })
                    }
                }
            }
            None => {
                let books = default_books();
                debug!("Seeding local storage with {} default books", books.len());
                self.storage
                    .set(BOOKS_KEY, &to_pretty_json(&books)?)
                    .map_err(|e| StoreError::write(&location, e))?;
                Ok(LoadedBooks {
                    books,
                    assigned_ids: 0,
                })
            }
        }
    }

    fn save_all(&mut self, books: &[Book]) -> StoreResult<()> {
        let content = to_pretty_json(books)?;
        self.storage
            .set(BOOKS_KEY, &content)
            .map_err(|e| StoreError::write(self.storage.location(), e))
    }

    fn describe(&self) -> String {
        format!("local {}", self.storage.location())
    }
}

/// The bundled default collection
pub fn default_books() -> Vec<Book> {
    serde_json::from_str(DEFAULT_BOOKS).unwrap_or_default()
}
