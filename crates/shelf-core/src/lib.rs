//! shelf Core Library
//!
//! This crate provides the core functionality for shelf, a personal book
//! catalog: a browsable, searchable list of books with an admin path to
//! add, edit, delete, import and export them.
//!
//! # Architecture
//!
//! - **Storage**: the whole collection is read and written at once through
//!   a `BookStore` backend (JSON file, HTTP API, or local SQLite storage)
//! - **Query**: filtering and sorting are pure functions over a collection
//! - **Catalog**: admin mutations; each one persists the full, re-sorted
//!   collection
//!
//! The collection is assumed to have a single operator. There is no
//! locking or versioning, so concurrent writers race and the last write
//! wins.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut catalog = Catalog::open(open_store(&config)?)?;
//!
//! // Add a book
//! catalog.add(BookDraft::new("Dune", "Frank Herbert", Some(1965)))?;
//!
//! // Query books
//! let books = catalog.search(&BookFilter::new().with_query("herbert"));
//! ```
//!
//! # Modules
//!
//! - `catalog`: Admin operations (main entry point)
//! - `models`: The `Book` record
//! - `query`: Letter and free-text filtering, title ordering
//! - `storage`: Backends, import/export, errors
//! - `session`: Admin login gate
//! - `server`: HTTP API over the JSON file
//! - `config`: Application configuration

pub mod catalog;
pub mod config;
pub mod models;
pub mod query;
pub mod server;
pub mod session;
pub mod storage;

pub use catalog::Catalog;
pub use config::{BackendKind, Config};
pub use models::{Book, BookDraft};
pub use query::{filter_books, BookFilter};
pub use session::{AdminCredentials, PasswordHash, SessionGate, SessionState};
pub use storage::{open_store, BookStore, LoadedBooks, StoreError, StoreResult};
