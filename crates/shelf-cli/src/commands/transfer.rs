//! Import and export command handlers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use shelf_core::storage::transfer::{books_from_import, read_import_file, write_export};
use shelf_core::Catalog;

use crate::output::{Output, OutputFormat};
use crate::prompt::confirm;

/// Replace the collection with the books in a JSON file
pub fn import(catalog: &mut Catalog, file: &Path, yes: bool, output: &Output) -> Result<()> {
    let entries =
        read_import_file(file).with_context(|| format!("Failed to import {:?}", file))?;
    let total = entries.len();

    let books = books_from_import(entries);
    if books.is_empty() {
        bail!("No valid books found in the file");
    }

    let skipped = total - books.len();
    if skipped > 0 {
        output.message(&format!(
            "Skipping {} entries without a title and author",
            skipped
        ));
    }

    if !yes && output.should_prompt() {
        let prompt = format!(
            "Import {} books? This will replace your current collection.",
            books.len()
        );
        if !confirm(&prompt)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let count = catalog
        .replace_all(books)
        .context("Failed to save imported books")?;

    output.success(&format!("Imported {} books", count));
    Ok(())
}

/// Write the collection to `books-export.json`, or to stdout
pub fn export(
    catalog: &Catalog,
    dir: Option<PathBuf>,
    stdout: bool,
    output: &Output,
) -> Result<()> {
    if stdout {
        println!("{}", catalog.export_json()?);
        return Ok(());
    }

    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    let path = write_export(&dir, catalog.books())
        .with_context(|| format!("Failed to export to {:?}", dir))?;

    match output.format {
        OutputFormat::Quiet => println!("{}", path.display()),
        _ => output.success(&format!(
            "Exported {} books to {}",
            catalog.len(),
            path.display()
        )),
    }

    Ok(())
}
