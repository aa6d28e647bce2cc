//! Collection queries
//!
//! Derives the visible subset of a collection from a [`BookFilter`]:
//! an optional first-letter filter and a free-text search, combined with
//! logical AND, followed by a stable sort on title.
//!
//! Everything here is a pure function of its inputs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::Book;

/// Filter applied to a collection before display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFilter {
    /// Free-text search over title, author and year
    #[serde(default)]
    pub query: String,
    /// Keep only titles starting with this letter
    #[serde(default)]
    pub letter: Option<char>,
}

impl BookFilter {
    /// A filter that keeps everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search query
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set the first-letter filter (stored uppercased)
    pub fn with_letter(mut self, letter: Option<char>) -> Self {
        self.letter = letter.map(|c| c.to_uppercase().next().unwrap_or(c));
        self
    }

    /// True when neither filter is active
    pub fn is_empty(&self) -> bool {
        self.letter.is_none() && self.query.trim().is_empty()
    }

    /// Check a single book against both filters
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(letter) = self.letter {
            if !matches_letter(book, letter) {
                return false;
            }
        }

        let query = self.query.trim();
        query.is_empty() || matches_query(book, query)
    }
}

/// Filter and sort a collection
///
/// Returns a new vector; the input order is not modified.
pub fn filter_books(books: &[Book], filter: &BookFilter) -> Vec<Book> {
    let mut visible: Vec<Book> = books
        .iter()
        .filter(|book| filter.matches(book))
        .cloned()
        .collect();
    sort_by_title(&mut visible);
    visible
}

/// True if the uppercased title starts with `letter`
pub fn matches_letter(book: &Book, letter: char) -> bool {
    let letter: String = letter.to_uppercase().collect();
    book.title.to_uppercase().starts_with(&letter)
}

/// Case-insensitive substring match on title, author or year
pub fn matches_query(book: &Book, query: &str) -> bool {
    let query = query.to_lowercase();

    book.title.to_lowercase().contains(&query)
        || book.author.to_lowercase().contains(&query)
        || book
            .year
            .map(|year| year.to_string().contains(&query))
            .unwrap_or(false)
}

/// Sort books by title in place (stable)
pub fn sort_by_title(books: &mut [Book]) {
    books.sort_by(|a, b| compare_titles(&a.title, &b.title));
}

/// Total order on titles, close to a locale-aware comparison
///
/// Letters compare case-insensitively first; on a tie lowercase sorts
/// before uppercase, then raw code points decide.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();

    fold(a)
        .cmp(&fold(b))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}
