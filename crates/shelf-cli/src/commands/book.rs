//! Book command handlers

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use shelf_core::{Book, BookDraft, BookFilter, Catalog};

use crate::output::Output;
use crate::prompt::{confirm, prompt_with_default};

/// Field changes requested by `shelf edit`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BookEdits {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub clear_year: bool,
}

impl BookEdits {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none() && !self.clear_year
    }

    /// Overlay the requested changes on the current fields
    fn apply_to(self, mut draft: BookDraft) -> BookDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(author) = self.author {
            draft.author = author;
        }
        if self.clear_year {
            draft.year = None;
        } else if self.year.is_some() {
            draft.year = self.year;
        }
        draft
    }
}

/// List books, optionally narrowed by a search query and/or initial letter
pub fn list(
    catalog: &Catalog,
    query: Option<String>,
    letter: Option<char>,
    output: &Output,
) -> Result<()> {
    let filter = BookFilter::new()
        .with_query(query.unwrap_or_default())
        .with_letter(letter);

    let books = catalog.search(&filter);
    output.print_books(&books, catalog.len());
    Ok(())
}

/// Show a single book
pub fn show(catalog: &Catalog, id: String, output: &Output) -> Result<()> {
    let uuid = parse_book_id(&id, catalog)?;
    let book = catalog
        .get(uuid)
        .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?;

    output.print_book(book);
    Ok(())
}

/// Add a new book
pub fn add(
    catalog: &mut Catalog,
    title: String,
    author: String,
    year: Option<i32>,
    output: &Output,
) -> Result<()> {
    let book = catalog
        .add(BookDraft::new(title, author, year))
        .context("Failed to add book")?;

    report(output, &format!("Added book: {}", book.id), &book);
    Ok(())
}

/// Edit a book
///
/// With no field flags in an interactive session, prompts for each field.
pub fn edit(catalog: &mut Catalog, id: String, edits: BookEdits, output: &Output) -> Result<()> {
    let uuid = parse_book_id(&id, catalog)?;
    let current = catalog
        .get(uuid)
        .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?
        .clone();

    let edits = if edits.is_empty() && output.should_prompt() {
        prompt_edits(&current)?
    } else {
        edits
    };

    let draft = edits.apply_to(current.draft());
    if draft == current.draft() {
        output.message("Nothing to change.");
        return Ok(());
    }

    let book = catalog
        .update(uuid, draft)
        .context("Failed to update book")?;

    report(output, "Book updated", &book);
    Ok(())
}

/// Delete a book
pub fn delete(catalog: &mut Catalog, id: String, yes: bool, output: &Output) -> Result<()> {
    let uuid = parse_book_id(&id, catalog)?;
    let book = catalog
        .get(uuid)
        .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?
        .clone();

    if !yes && output.should_prompt() {
        println!("Delete book: {} - {}", &book.id.to_string()[..8], book.title);
        if !confirm("Are you sure you want to delete this book?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    catalog.delete(uuid).context("Failed to delete book")?;

    output.success(&format!("Deleted book: {}", book.title));
    Ok(())
}

/// Success line followed by the book; JSON mode prints only the book
fn report(output: &Output, message: &str, book: &Book) {
    if !output.is_json() {
        output.success(message);
    }
    output.print_book(book);
}

fn prompt_edits(current: &Book) -> Result<BookEdits> {
    println!("Editing book: {}", current.id);
    println!("Press Enter to keep the current value. Enter '-' to clear the year.\n");

    let title = prompt_with_default("Title", &current.title)?;
    let author = prompt_with_default("Author", &current.author)?;

    let (year, clear_year) = match prompt_with_default("Year", &current.year_text())? {
        Some(text) if text == "-" => (None, true),
        Some(text) => (Some(parse_year(&text)?), false),
        None => (None, false),
    };

    Ok(BookEdits {
        title,
        author,
        year,
        clear_year,
    })
}

fn parse_year(text: &str) -> Result<i32> {
    text.trim()
        .parse()
        .with_context(|| format!("Year must be a whole number, got '{}'", text.trim()))
}

/// Parse a book ID (supports full UUID or prefix)
fn parse_book_id(id: &str, catalog: &Catalog) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let matches = catalog.find_by_prefix(id);

    match matches.len() {
        0 => bail!("No book found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple books match '{}':", id);
            for book in &matches {
                eprintln!("  {} - {}", book.id, book.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::storage::{FileStore, StoreError};
    use shelf_core::BookStore;
    use tempfile::TempDir;

    use crate::output::OutputFormat;

    fn catalog_with(dir: &TempDir, books: &[Book]) -> Catalog {
        let mut store = FileStore::new(dir.path().join("books.json"));
        store.save_all(books).unwrap();
        Catalog::open(Box::new(store)).unwrap()
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    fn id(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    #[test]
    fn test_edits_overlay() {
        let draft = BookDraft::new("Dune", "Frank Herbert", Some(1965));

        let edits = BookEdits {
            title: Some("Dune Messiah".to_string()),
            year: Some(1969),
            ..Default::default()
        };
        assert_eq!(
            edits.apply_to(draft.clone()),
            BookDraft::new("Dune Messiah", "Frank Herbert", Some(1969))
        );

        let clear = BookEdits {
            clear_year: true,
            ..Default::default()
        };
        assert_eq!(
            clear.apply_to(draft.clone()),
            BookDraft::new("Dune", "Frank Herbert", None)
        );

        assert!(BookEdits::default().is_empty());
        assert_eq!(BookEdits::default().apply_to(draft.clone()), draft);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(" 1965 ").unwrap(), 1965);
        assert_eq!(parse_year("-800").unwrap(), -800);
        assert!(parse_year("nineteen").is_err());
        assert!(parse_year("19.5").is_err());
    }

    #[test]
    fn test_parse_book_id_prefix() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog_with(
            &dir,
            &[
                Book::with_id(id("aa000000-0000-4000-8000-000000000001"), "Dune", "Frank Herbert", None),
                Book::with_id(id("ab000000-0000-4000-8000-000000000002"), "Emma", "Jane Austen", None),
            ],
        );

        assert_eq!(
            parse_book_id("ab", &catalog).unwrap(),
            id("ab000000-0000-4000-8000-000000000002")
        );
        assert!(parse_book_id("a", &catalog).is_err());
        assert!(parse_book_id("ff", &catalog).is_err());
        // Full UUIDs are taken as-is
        assert_eq!(
            parse_book_id("cc000000-0000-4000-8000-000000000003", &catalog).unwrap(),
            id("cc000000-0000-4000-8000-000000000003")
        );
    }

    #[test]
    fn test_add_edit_delete() {
        let dir = TempDir::new().unwrap();
        let mut catalog = catalog_with(&dir, &[]);

        add(&mut catalog, "Dune".into(), "Frank Herbert".into(), Some(1965), &quiet()).unwrap();
        let dune_id = catalog.books()[0].id.to_string();

        let edits = BookEdits {
            author: Some("F. Herbert".to_string()),
            clear_year: true,
            ..Default::default()
        };
        edit(&mut catalog, dune_id[..8].to_string(), edits, &quiet()).unwrap();
        assert_eq!(catalog.books()[0].author, "F. Herbert");
        assert_eq!(catalog.books()[0].year, None);

        // Quiet output never prompts
        delete(&mut catalog, dune_id, false, &quiet()).unwrap();
        assert!(catalog.is_empty());

        // Changes reached the file
        let stored = FileStore::new(dir.path().join("books.json")).get_all().unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn test_add_rejects_blank_title() {
        let dir = TempDir::new().unwrap();
        let mut catalog = catalog_with(&dir, &[]);

        let err = add(&mut catalog, "  ".into(), "Someone".into(), None, &quiet()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Invalid(_))
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_edit_unknown_id() {
        let dir = TempDir::new().unwrap();
        let mut catalog = catalog_with(&dir, &[Book::new("Dune", "Frank Herbert", None)]);

        let edits = BookEdits {
            title: Some("Other".to_string()),
            ..Default::default()
        };
        assert!(edit(&mut catalog, "zz".to_string(), edits, &quiet()).is_err());
        assert_eq!(catalog.books()[0].title, "Dune");
    }
}
