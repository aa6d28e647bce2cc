//! Config command handlers

use std::path::PathBuf;

use anyhow::Result;

use shelf_core::Config;

use crate::output::{Output, OutputFormat};

/// Show the effective configuration
///
/// The password hash is never printed, only whether one is set.
pub fn show(config: &Config, config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let hash_state = if config.admin_password_hash.is_some() {
        "(set)"
    } else {
        "(not set)"
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "backend": config.backend.to_string(),
                    "api_url": config.api_url,
                    "books_file": config.books_file_path(),
                    "bind": config.bind,
                    "request_timeout_secs": config.request_timeout_secs,
                    "admin_username": config.admin_username,
                    "admin_password_hash_set": config.admin_password_hash.is_some(),
                    "log_file": config.log_file_path()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  backend:              {}", config.backend);
            println!("  api_url:              {}", config.api_url);
            println!(
                "  books_file:           {}",
                config.books_file_path().display()
            );
            println!("  bind:                 {}", config.bind);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!(
                "  admin_username:       {}",
                config.admin_username.as_deref().unwrap_or("(not set)")
            );
            println!("  admin_password_hash:  {}", hash_state);
            println!(
                "  log_file:             {}",
                config.log_file_path().display()
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}
