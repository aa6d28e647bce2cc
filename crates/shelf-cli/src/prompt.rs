//! Interactive prompts
//!
//! Line prompts for login and confirmation. Passwords are read without
//! echo. All of them refuse to block when stdin is not a terminal.

use anyhow::{bail, Result};
use console::Term;
use std::io::{self, BufRead, Write};

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let input = read_line(io::stdin().lock())?;
    Ok(is_yes(&input))
}

/// Prompt for a required value
pub fn prompt_line(prompt: &str) -> Result<String> {
    if !atty::is(atty::Stream::Stdin) {
        bail!("{} is required (stdin is not a terminal)", prompt);
    }

    print!("{}: ", prompt);
    io::stdout().flush()?;

    read_line(io::stdin().lock())
}

/// Prompt for a secret without echoing it
pub fn prompt_secret(prompt: &str) -> Result<String> {
    if !atty::is(atty::Stream::Stdin) {
        bail!("{} is required (stdin is not a terminal)", prompt);
    }

    let term = Term::stderr();
    term.write_str(&format!("{}: ", prompt))?;
    Ok(term.read_secure_line()?)
}

/// Prompt with a current value shown, returns None if the user keeps it
pub fn prompt_with_default(prompt: &str, current: &str) -> Result<Option<String>> {
    if current.is_empty() {
        print!("{}: ", prompt);
    } else {
        print!("{} [{}]: ", prompt, current);
    }
    io::stdout().flush()?;

    let input = read_line(io::stdin().lock())?;
    Ok(non_empty(&input))
}

fn non_empty(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}

fn read_line(mut reader: impl BufRead) -> Result<String> {
    let mut input = String::new();
    reader.read_line(&mut input)?;
    Ok(input.trim_end_matches(&['\r', '\n'][..]).to_string())
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}
