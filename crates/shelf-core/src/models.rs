//! Data models for shelf
//!
//! Defines the only entity in the catalog: `Book`, plus `BookDraft`,
//! the editable subset of fields used when adding or editing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{StoreError, StoreResult};

/// A book in the collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// Stable identifier, assigned on creation
    ///
    /// Files written before ids existed have none; a fresh one is
    /// assigned when such a record is read, and `Catalog` saves it.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Display title, primary sort key (not unique)
    pub title: String,
    /// Author name
    pub author: String,
    /// Publication year, if known
    #[serde(default)]
    pub year: Option<i32>,
}

impl Book {
    /// Create a new book with a freshly generated ID
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Create a book with a specific ID (for loading from storage)
    pub fn with_id(
        id: Uuid,
        title: impl Into<String>,
        author: impl Into<String>,
        year: Option<i32>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Build a book from a validated draft
    pub fn from_draft(draft: BookDraft) -> StoreResult<Self> {
        let draft = draft.validated()?;
        Ok(Self::new(draft.title, draft.author, draft.year))
    }

    /// Replace the editable fields, keeping the ID
    pub fn apply(&mut self, draft: BookDraft) -> StoreResult<()> {
        let draft = draft.validated()?;
        self.title = draft.title;
        self.author = draft.author;
        self.year = draft.year;
        Ok(())
    }

    /// The editable fields of this book
    pub fn draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year,
        }
    }

    /// Year as decimal text, empty when unknown
    pub fn year_text(&self) -> String {
        self.year.map(|y| y.to_string()).unwrap_or_default()
    }
}

/// The editable fields of a book
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Trim text fields and reject empty title or author
    pub fn validated(self) -> StoreResult<Self> {
        let title = self.title.trim().to_string();
        let author = self.author.trim().to_string();

        if title.is_empty() {
            return Err(StoreError::Invalid("title must not be empty".to_string()));
        }
        if author.is_empty() {
            return Err(StoreError::Invalid("author must not be empty".to_string()));
        }

        Ok(Self {
            title,
            author,
            year: self.year,
        })
    }
}
