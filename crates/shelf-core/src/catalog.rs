//! Admin catalog
//!
//! `Catalog` keeps an in-memory copy of the collection and applies admin
//! mutations to it. Every mutation builds a new full collection, sorts it
//! by title, persists it through the [`BookStore`], and only then replaces
//! the in-memory copy. A failed write therefore leaves memory and store in
//! agreement.
//!
//! ## Usage
//!
//! ```ignore
//! let mut catalog = Catalog::open(open_store(&config)?)?;
//!
//! let book = catalog.add(BookDraft::new("Dune", "Frank Herbert", Some(1965)))?;
//! let visible = catalog.search(&BookFilter::new().with_letter(Some('D')));
//! ```

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Book, BookDraft};
use crate::query::{filter_books, sort_by_title, BookFilter};
use crate::storage::transfer::{books_from_import, export_books, import_books};
use crate::storage::{BookStore, LoadedBooks, StoreError, StoreResult};

/// In-memory collection bound to a book store
pub struct Catalog {
    store: Box<dyn BookStore>,
    books: Vec<Book>,
}

impl Catalog {
    /// Load the collection from `store`, sorted by title
    ///
    /// Records stored without an ID get one on read; those IDs are saved
    /// right away so they stay valid for later edits and deletes.
    pub fn open(store: Box<dyn BookStore>) -> StoreResult<Self> {
        let loaded = store.load()?;
        let mut catalog = Self {
            store,
            books: Vec::new(),
        };
        catalog.adopt(loaded);
        debug!(
            "Loaded {} books from {}",
            catalog.books.len(),
            catalog.store.describe()
        );
        Ok(catalog)
    }

    /// Re-read the collection from the store
    pub fn reload(&mut self) -> StoreResult<()> {
        let loaded = self.store.load()?;
        self.adopt(loaded);
        Ok(())
    }

    /// The collection, sorted by title
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Where the collection is stored
    pub fn location(&self) -> String {
        self.store.describe()
    }

    /// Get a book by ID
    pub fn get(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// Books whose ID starts with `prefix`
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Book> {
        let prefix = prefix.to_ascii_lowercase();
        self.books
            .iter()
            .filter(|book| book.id.to_string().starts_with(&prefix))
            .collect()
    }

    /// Filtered, sorted view of the collection
    pub fn search(&self, filter: &BookFilter) -> Vec<Book> {
        filter_books(&self.books, filter)
    }

    /// Add a new book
    pub fn add(&mut self, draft: BookDraft) -> StoreResult<Book> {
        let book = Book::from_draft(draft)?;

        let mut books = self.books.clone();
        books.push(book.clone());
        self.commit(books)?;

        info!("Added book {} ({})", book.id, book.title);
        Ok(book)
    }

    /// Replace the editable fields of an existing book
    pub fn update(&mut self, id: Uuid, draft: BookDraft) -> StoreResult<Book> {
        let mut books = self.books.clone();
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(StoreError::NotFound(id))?;
        book.apply(draft)?;
        let updated = book.clone();

        self.commit(books)?;

        info!("Updated book {} ({})", updated.id, updated.title);
        Ok(updated)
    }

    /// Delete a book, returning it
    pub fn delete(&mut self, id: Uuid) -> StoreResult<Book> {
        let position = self
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let mut books = self.books.clone();
        let removed = books.remove(position);
        self.commit(books)?;

        info!("Deleted book {} ({})", removed.id, removed.title);
        Ok(removed)
    }

    /// Replace the whole collection with the books in an import file
    ///
    /// Entries without a title or author are skipped. Returns the number
    /// of books imported. On any error the collection is unchanged.
    pub fn import_json(&mut self, text: &str) -> StoreResult<usize> {
        let books = books_from_import(import_books(text)?);
        self.replace_all(books)
    }

    /// Replace the whole collection, returning the number of books
    ///
    /// An empty replacement is refused.
    pub fn replace_all(&mut self, books: Vec<Book>) -> StoreResult<usize> {
        if books.is_empty() {
            return Err(StoreError::Format(
                "No valid books found in the file".to_string(),
            ));
        }

        let count = books.len();
        self.commit(books)?;

        info!("Replaced collection with {} books", count);
        Ok(count)
    }

    /// Serialize the collection for download
    pub fn export_json(&self) -> StoreResult<String> {
        export_books(&self.books)
    }

    /// Take a freshly loaded collection, saving any IDs assigned on read
    ///
    /// A failed save is logged and the collection is still used, so a
    /// read-only store stays browsable.
    fn adopt(&mut self, loaded: LoadedBooks) {
        let mut books = loaded.books;
        sort_by_title(&mut books);

        if loaded.assigned_ids > 0 {
            match self.store.save_all(&books) {
                Ok(()) => info!(
                    "Saved new IDs for {} books in {}",
                    loaded.assigned_ids,
                    self.store.describe()
                ),
                Err(e) => warn!(
                    "Could not save new IDs for {} books in {}: {}",
                    loaded.assigned_ids,
                    self.store.describe(),
                    e
                ),
            }
        }

        self.books = books;
    }

    /// Sort, persist, then adopt `books` as the current collection
    fn commit(&mut self, mut books: Vec<Book>) -> StoreResult<()> {
        sort_by_title(&mut books);
        self.store.save_all(&books)?;
        self.books = books;
        Ok(())
    }
}
