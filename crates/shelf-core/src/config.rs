//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/shelf/config.toml)
//! 3. Environment variables (SHELF_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::session::{AdminCredentials, PasswordHash};

/// Environment variable prefix
const ENV_PREFIX: &str = "SHELF";

/// Which persistence strategy the client uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// SQLite key/value storage on this device
    #[default]
    Local,
    /// The HTTP API at `api_url`
    Remote,
    /// The JSON file at `books_file`, read directly
    File,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "remote" => Ok(BackendKind::Remote),
            "file" => Ok(BackendKind::File),
            other => Err(format!(
                "unknown backend '{}' (expected local, remote or file)",
                other
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
            BackendKind::File => "file",
        };
        f.write_str(name)
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for local data (SQLite db, default books file, logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Persistence backend used by the CLI
    #[serde(default)]
    pub backend: BackendKind,

    /// Base URL of the books API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// JSON file served by `shelf serve` (defaults to data_dir/books.json)
    #[serde(default)]
    pub books_file: Option<PathBuf>,

    /// Address the API server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Timeout for API requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Admin username
    #[serde(default)]
    pub admin_username: Option<String>,

    /// Salted admin password hash (see `shelf hash-password`)
    #[serde(default)]
    pub admin_password_hash: Option<String>,

    /// Log file for non-server commands (defaults to data_dir/shelf.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: BackendKind::default(),
            api_url: default_api_url(),
            books_file: None,
            bind: default_bind(),
            request_timeout_secs: default_request_timeout_secs(),
            admin_username: None,
            admin_password_hash: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (SHELF_DATA_DIR, SHELF_BACKEND, ...)
    /// 2. Config file (~/.config/shelf/config.toml or SHELF_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit `--config` path
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        let var = |name: &str| std::env::var(format!("{}_{}", ENV_PREFIX, name)).ok();

        if let Some(val) = var("DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }

        if let Some(val) = var("BACKEND") {
            match val.parse() {
                Ok(backend) => self.backend = backend,
                Err(e) => warn!("Ignoring {}_BACKEND: {}", ENV_PREFIX, e),
            }
        }

        if let Some(val) = var("API_URL") {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        // Empty string clears it
        if let Some(val) = var("BOOKS_FILE") {
            self.books_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Some(val) = var("BIND") {
            if !val.is_empty() {
                self.bind = val;
            }
        }

        if let Some(val) = var("ADMIN_USERNAME") {
            self.admin_username = if val.is_empty() { None } else { Some(val) };
        }

        if let Some(val) = var("ADMIN_PASSWORD_HASH") {
            self.admin_password_hash = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with SHELF_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shelf")
            .join("config.toml")
    }

    /// Get the path to the local SQLite storage
    pub fn local_db_path(&self) -> PathBuf {
        self.data_dir.join("local.db")
    }

    /// Get the path to the JSON books file
    pub fn books_file_path(&self) -> PathBuf {
        self.books_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("books.json"))
    }

    /// Get the path to the log file
    pub fn log_file_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("shelf.log"))
    }

    /// Admin credentials, if both username and hash are configured
    pub fn admin_credentials(&self) -> Result<Option<AdminCredentials>> {
        let (Some(username), Some(hash)) = (&self.admin_username, &self.admin_password_hash)
        else {
            return Ok(None);
        };

        let password_hash: PasswordHash = hash
            .parse()
            .context("Invalid admin_password_hash in configuration")?;

        Ok(Some(AdminCredentials::new(username.clone(), password_hash)))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shelf")
}

fn default_api_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "SHELF_DATA_DIR",
        "SHELF_BACKEND",
        "SHELF_API_URL",
        "SHELF_BOOKS_FILE",
        "SHELF_BIND",
        "SHELF_ADMIN_USERNAME",
        "SHELF_ADMIN_PASSWORD_HASH",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.api_url, "http://localhost:3001/api");
        assert_eq!(config.bind, "127.0.0.1:3001");
        assert!(config.admin_username.is_none());
        assert!(config.data_dir.ends_with("shelf"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.local_db_path().ends_with("local.db"));
        assert!(config.books_file_path().ends_with("books.json"));
        assert!(config.log_file_path().ends_with("shelf.log"));

        let config = Config {
            books_file: Some(PathBuf::from("/srv/library/books.json")),
            ..Config::default()
        };
        assert_eq!(
            config.books_file_path(),
            PathBuf::from("/srv/library/books.json")
        );
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("local".parse::<BackendKind>(), Ok(BackendKind::Local));
        assert_eq!("REMOTE".parse::<BackendKind>(), Ok(BackendKind::Remote));
        assert_eq!("file".parse::<BackendKind>(), Ok(BackendKind::File));
        assert!("cloud".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::Remote.to_string(), "remote");
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHELF_DATA_DIR", "/tmp/shelf-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/shelf-test"));
    }

    #[test]
    fn test_env_override_backend() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHELF_BACKEND", "remote");
        config.apply_env_overrides();
        assert_eq!(config.backend, BackendKind::Remote);

        // Invalid values are ignored
        env::set_var("SHELF_BACKEND", "carrier-pigeon");
        config.apply_env_overrides();
        assert_eq!(config.backend, BackendKind::Remote);
    }

    #[test]
    fn test_env_override_books_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHELF_BOOKS_FILE", "/srv/books.json");
        config.apply_env_overrides();
        assert_eq!(config.books_file, Some(PathBuf::from("/srv/books.json")));

        // Empty string clears it
        env::set_var("SHELF_BOOKS_FILE", "");
        config.apply_env_overrides();
        assert!(config.books_file.is_none());
    }

    #[test]
    fn test_env_override_credentials() {
        let _guard = EnvGuard::new(ENV_VARS);

        let hash = PasswordHash::generate("secret");
        let mut config = Config::default();
        env::set_var("SHELF_ADMIN_USERNAME", "admin");
        env::set_var("SHELF_ADMIN_PASSWORD_HASH", hash.to_string());
        config.apply_env_overrides();

        let credentials = config.admin_credentials().unwrap().unwrap();
        assert_eq!(credentials.username(), "admin");
        assert!(credentials.verify("admin", "secret"));
    }

    #[test]
    fn test_admin_credentials_missing() {
        let config = Config {
            admin_username: Some("admin".to_string()),
            ..Config::default()
        };
        assert!(config.admin_credentials().unwrap().is_none());
    }

    #[test]
    fn test_admin_credentials_malformed_hash() {
        let config = Config {
            admin_username: Some("admin".to_string()),
            admin_password_hash: Some("plaintext".to_string()),
            ..Config::default()
        };
        assert!(config.admin_credentials().is_err());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/shelf"),
            backend: BackendKind::Remote,
            api_url: "http://books.example.com/api".to_string(),
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("backend = \"remote\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.backend, config.backend);
        assert_eq!(parsed.api_url, config.api_url);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            backend = "file"
            books_file = "/custom/books.json"
            bind = "0.0.0.0:8080"
            admin_username = "librarian"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.backend, BackendKind::File);
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.admin_username.as_deref(), Some("librarian"));
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("SHELF_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.backend, BackendKind::Local);
        assert!(config.data_dir.exists());
    }
}
