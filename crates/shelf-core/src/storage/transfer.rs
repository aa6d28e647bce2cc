//! Import and export
//!
//! Export serializes a collection with stable 3-space indentation, the
//! same layout the file store writes. Import parses text into raw JSON
//! values and checks only that the top level is an array; turning those
//! values into books is a separate, lenient step.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use crate::models::Book;

/// File name used for exported collections
pub const EXPORT_FILE_NAME: &str = "books-export.json";

const INDENT: &[u8] = b"   ";

/// Serialize any value as pretty JSON with the collection's indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> StoreResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Serialize a collection for download
pub fn export_books(books: &[Book]) -> StoreResult<String> {
    to_pretty_json(books)
}

/// Write an export into `dir` as `books-export.json`
///
/// Returns the path of the written file.
pub fn write_export(dir: &Path, books: &[Book]) -> StoreResult<PathBuf> {
    let content = export_books(books)?;
    fs::create_dir_all(dir)?;

    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, content).map_err(|e| StoreError::write(path.display(), e))?;
    Ok(path)
}

/// Parse import text
///
/// Fails with `Parse` on malformed JSON and `Format` when the top-level
/// value is not an array. Entries are not validated.
pub fn import_books(text: &str) -> StoreResult<Vec<Value>> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(entries) => Ok(entries),
        _ => Err(StoreError::Format("must be a JSON array".to_string())),
    }
}

/// Read and parse an import file
pub fn read_import_file(path: &Path) -> StoreResult<Vec<Value>> {
    let text = fs::read_to_string(path)?;
    import_books(&text)
}

/// Keep the entries that look like books
///
/// An entry needs a non-empty string `title` and `author`. A `year` that
/// is not an integer is dropped; an `id` that is not a UUID, or repeats an
/// earlier entry's, is replaced.
pub fn books_from_import(entries: Vec<Value>) -> Vec<Book> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(book_from_value)
        .map(|mut book| {
            while !seen.insert(book.id) {
                book.id = Uuid::new_v4();
            }
            book
        })
        .collect()
}

fn book_from_value(value: &Value) -> Option<Book> {
    let object = value.as_object()?;

    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let title = text("title")?;
    let author = text("author")?;
    let year = object
        .get("year")
        .and_then(Value::as_i64)
        .and_then(|y| i32::try_from(y).ok());
    let id = object
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    Some(Book::with_id(id, title, author, year))
}
