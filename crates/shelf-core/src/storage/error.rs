//! Storage error handling
//!
//! Provides typed errors for book store operations with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during book store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing store unreadable or its contents corrupt
    #[error("Failed to read books from '{location}': {details}")]
    Read { location: String, details: String },

    /// Persisting the collection failed
    #[error("Failed to write books to '{location}': {details}")]
    Write { location: String, details: String },

    /// Import file is valid JSON but has the wrong shape
    #[error("Invalid file format: {0}")]
    Format(String),

    /// Import file is not valid JSON
    #[error("Failed to parse JSON file: {0}")]
    Parse(#[from] serde_json::Error),

    /// No book with the given ID
    #[error("Book not found: {0}")]
    NotFound(Uuid),

    /// Book fields failed validation
    #[error("Invalid book: {0}")]
    Invalid(String),

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Read failure at a location
    pub fn read(location: impl ToString, details: impl ToString) -> Self {
        StoreError::Read {
            location: location.to_string(),
            details: details.to_string(),
        }
    }

    /// Write failure at a location
    pub fn write(location: impl ToString, details: impl ToString) -> Self {
        StoreError::Write {
            location: location.to_string(),
            details: details.to_string(),
        }
    }

    /// True for the import-file errors (`Format`, `Parse`)
    pub fn is_import_error(&self) -> bool {
        matches!(self, StoreError::Format(_) | StoreError::Parse(_))
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Read { .. } => {
                Some("Check that the books file exists and contains a JSON array, or that the API server is running.")
            }
            StoreError::Write { .. } | StoreError::AtomicWriteFailed { .. } => {
                Some("Check disk space and write permissions for the data directory.")
            }
            StoreError::Format(_) | StoreError::Parse(_) => {
                Some("The import file must be a JSON array of objects with title, author and year.")
            }
            _ => None,
        }
    }
}

/// Result type for book store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_display() {
        let err = StoreError::read("/data/books.json", "No such file or directory");
        let msg = err.to_string();
        assert!(msg.contains("Failed to read books"));
        assert!(msg.contains("/data/books.json"));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_parse_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = StoreError::from(serde_err);
        assert!(matches!(err, StoreError::Parse(_)));
        assert!(err.is_import_error());
        assert!(err.to_string().starts_with("Failed to parse JSON file"));
    }

    #[test]
    fn test_format_error_display() {
        let err = StoreError::Format("must be a JSON array".to_string());
        assert_eq!(err.to_string(), "Invalid file format: must be a JSON array");
        assert!(err.is_import_error());
    }

    #[test]
    fn test_not_found_has_no_suggestion() {
        let err = StoreError::NotFound(Uuid::nil());
        assert!(err.recovery_suggestion().is_none());
        assert!(!err.is_import_error());
    }
}
