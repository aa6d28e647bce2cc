//! Status command handler

use anyhow::Result;

use shelf_core::{open_store, Config, SessionState};

use crate::output::{Output, OutputFormat};

use super::session::open_gate;

/// Show backend, collection size and session state
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let store = open_store(config)?;
    let location = store.describe();
    let books = store.get_all();

    let gate = open_gate(config)?;
    let session = match gate.state() {
        SessionState::Authenticated => "logged in",
        SessionState::Unauthenticated => "logged out",
    };

    match output.format {
        OutputFormat::Json => {
            let (count, error) = match &books {
                Ok(books) => (Some(books.len()), None),
                Err(e) => (None, Some(e.to_string())),
            };
            println!(
                "{}",
                serde_json::json!({
                    "backend": config.backend.to_string(),
                    "location": location,
                    "books": count,
                    "error": error,
                    "session": {
                        "authenticated": gate.is_authenticated(),
                        "admin_configured": gate.has_credentials()
                    }
                })
            );
        }
        OutputFormat::Quiet => match &books {
            Ok(books) => println!("{}", books.len()),
            Err(e) => println!("error: {}", e),
        },
        OutputFormat::Human => {
            println!("shelf Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Backend:  {}", config.backend);
            println!("  Location: {}", location);
            match &books {
                Ok(books) => println!("  Books:    {}", books.len()),
                Err(e) => {
                    println!("  Books:    unavailable ({})", e);
                    if let Some(hint) = e.recovery_suggestion() {
                        println!("            {}", hint);
                    }
                }
            }
            println!();
            println!("Admin:");
            println!("  Session:     {}", session);
            println!(
                "  Credentials: {}",
                if gate.has_credentials() {
                    "configured"
                } else {
                    "not configured"
                }
            );
        }
    }

    Ok(())
}
