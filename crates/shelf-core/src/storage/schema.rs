//! SQLite schema for local storage
//!
//! A single key/value table; the book collection and the session flag
//! each live under their own key.

use rusqlite::{Connection, Result};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS local_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
}

/// Check if the schema has been created
pub fn needs_init(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'local_storage'",
        [],
        |row| row.get(0),
    )?;
    Ok(count == 0)
}
