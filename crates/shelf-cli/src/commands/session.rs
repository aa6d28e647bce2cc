//! Login, logout and password hashing

use anyhow::{bail, Context, Result};

use shelf_core::storage::LocalStorage;
use shelf_core::{Config, PasswordHash, SessionGate};

use crate::output::{Output, OutputFormat};
use crate::prompt::{prompt_line, prompt_secret};

/// Open the session gate backed by this device's local storage
pub fn open_gate(config: &Config) -> Result<SessionGate> {
    let storage =
        LocalStorage::open(&config.local_db_path()).context("Failed to open local storage")?;
    let credentials = config.admin_credentials()?;
    Ok(SessionGate::open(storage, credentials)?)
}

/// Fail unless an admin is logged in on this device
pub fn require_admin(config: &Config) -> Result<()> {
    if !open_gate(config)?.is_authenticated() {
        bail!("Admin login required. Run `shelf login` first.");
    }
    Ok(())
}

/// Log in as the configured admin
pub fn login(
    config: &Config,
    username: Option<String>,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut gate = open_gate(config)?;

    if !gate.has_credentials() {
        bail!(
            "No admin credentials configured.\n\
             Set admin_username and admin_password_hash in the config file \
             (generate a hash with `shelf hash-password`)."
        );
    }

    if gate.is_authenticated() {
        output.message("Already logged in.");
        return Ok(());
    }

    let username = match username {
        Some(username) => username,
        None => prompt_line("Username")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_secret("Password")?,
    };

    if !gate.login(&username, &password)? {
        bail!("Invalid username or password");
    }

    output.success("Logged in");
    Ok(())
}

/// Log out on this device
pub fn logout(config: &Config, output: &Output) -> Result<()> {
    let mut gate = open_gate(config)?;
    gate.logout()?;
    output.success("Logged out");
    Ok(())
}

/// Print a salted hash for `admin_password_hash`
pub fn hash_password(password: Option<String>, output: &Output) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_secret("Password")?,
    };
    if password.is_empty() {
        bail!("Password must not be empty");
    }

    let hash = PasswordHash::generate(&password);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "admin_password_hash": hash.to_string() })
            );
        }
        OutputFormat::Quiet => println!("{}", hash),
        OutputFormat::Human => {
            println!("Add this line to your config file:");
            println!();
            println!("admin_password_hash = \"{}\"", hash);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config_in(dir: &Path, hash: Option<PasswordHash>) -> Config {
        let mut config = Config::default();
        config.data_dir = dir.to_path_buf();
        if let Some(hash) = hash {
            config.admin_username = Some("librarian".to_string());
            config.admin_password_hash = Some(hash.to_string());
        }
        config
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_login_logout_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), Some(PasswordHash::generate("correct horse")));

        assert!(require_admin(&config).is_err());

        let wrong = login(
            &config,
            Some("librarian".into()),
            Some("wrong".into()),
            &quiet(),
        );
        assert!(wrong.is_err());
        assert!(require_admin(&config).is_err());

        login(
            &config,
            Some("librarian".into()),
            Some("correct horse".into()),
            &quiet(),
        )
        .unwrap();
        assert!(require_admin(&config).is_ok());

        logout(&config, &quiet()).unwrap();
        assert!(require_admin(&config).is_err());
    }

    #[test]
    fn test_login_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), None);

        let result = login(&config, Some("admin".into()), Some("admin".into()), &quiet());
        assert!(result.is_err());
        assert!(require_admin(&config).is_err());
    }

    #[test]
    fn test_bad_hash_in_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), None);
        config.admin_username = Some("librarian".to_string());
        config.admin_password_hash = Some("not-a-hash".to_string());

        assert!(open_gate(&config).is_err());
    }

    #[test]
    fn test_hash_password_rejects_empty() {
        assert!(hash_password(Some(String::new()), &quiet()).is_err());
        assert!(hash_password(Some("secret".into()), &quiet()).is_ok());
    }
}
