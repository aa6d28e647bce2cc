//! Admin session gate
//!
//! A two-state machine (`Unauthenticated` / `Authenticated`) guarding the
//! admin operations. The authenticated flag is persisted in local storage
//! under [`SESSION_KEY`], so a login survives restarts on this device.
//!
//! Credentials are injected from configuration. The password is never
//! stored: only a salted SHA-256 digest, written as
//! `<base64 salt>$<base64 digest>`.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::storage::{LocalStorage, StoreResult};

/// Local storage key for the authenticated flag
pub const SESSION_KEY: &str = "isAdminAuthenticated";

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Errors parsing a stored password hash
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordHashError {
    #[error("expected '<salt>$<digest>'")]
    MissingSeparator,
    #[error("invalid base64: {0}")]
    Encoding(String),
    #[error("digest must be 32 bytes, got {0}")]
    DigestLength(usize),
    #[error("salt must not be empty")]
    EmptySalt,
}

/// Salted SHA-256 password digest
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl PasswordHash {
    /// Hash `password` with a fresh random salt
    pub fn generate(password: &str) -> Self {
        let salt: [u8; SALT_LEN] = rand::rng().random();
        Self::with_salt(&salt, password)
    }

    /// Hash `password` with a given salt
    pub fn with_salt(salt: &[u8], password: &str) -> Self {
        Self {
            salt: salt.to_vec(),
            digest: salted_digest(salt, password),
        }
    }

    /// Check a candidate password
    pub fn verify(&self, password: &str) -> bool {
        constant_time_eq(&salted_digest(&self.salt, password), &self.digest)
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}${}", STANDARD.encode(&self.salt), STANDARD.encode(&self.digest))
    }
}

// Never print the digest in debug output
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

impl FromStr for PasswordHash {
    type Err = PasswordHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (salt, digest) = s
            .trim()
            .split_once('$')
            .ok_or(PasswordHashError::MissingSeparator)?;

        let salt = STANDARD
            .decode(salt)
            .map_err(|e| PasswordHashError::Encoding(e.to_string()))?;
        let digest = STANDARD
            .decode(digest)
            .map_err(|e| PasswordHashError::Encoding(e.to_string()))?;

        if salt.is_empty() {
            return Err(PasswordHashError::EmptySalt);
        }
        if digest.len() != DIGEST_LEN {
            return Err(PasswordHashError::DigestLength(digest.len()));
        }

        Ok(Self { salt, digest })
    }
}

fn salted_digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// The configured admin username and password hash
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    username: String,
    password_hash: PasswordHash,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password_hash: PasswordHash) -> Self {
        Self {
            username: username.into(),
            password_hash,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Exact username match and a verified password
    pub fn verify(&self, username: &str, password: &str) -> bool {
        // Always hash, so a wrong username costs the same as a wrong password
        let password_ok = self.password_hash.verify(password);
        username == self.username && password_ok
    }
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Login/logout state machine with a persisted flag
pub struct SessionGate {
    storage: LocalStorage,
    credentials: Option<AdminCredentials>,
    state: SessionState,
}

impl SessionGate {
    /// Open the gate, restoring state from the persisted flag
    ///
    /// With no credentials configured every login attempt fails.
    pub fn open(storage: LocalStorage, credentials: Option<AdminCredentials>) -> StoreResult<Self> {
        let state = match storage.get(SESSION_KEY)?.as_deref() {
            Some("true") => SessionState::Authenticated,
            _ => SessionState::Unauthenticated,
        };

        Ok(Self {
            storage,
            credentials,
            state,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// True if credentials are configured
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Attempt to log in
    ///
    /// Returns `Ok(false)` and leaves the state unchanged on a mismatch.
    pub fn login(&mut self, username: &str, password: &str) -> StoreResult<bool> {
        let Some(credentials) = &self.credentials else {
            warn!("Login attempted but no admin credentials are configured");
            return Ok(false);
        };

        if !credentials.verify(username, password) {
            info!("Rejected login for '{}'", username);
            return Ok(false);
        }

        self.storage.set(SESSION_KEY, "true")?;
        self.state = SessionState::Authenticated;
        info!("Admin '{}' logged in", username);
        Ok(true)
    }

    /// Log out and clear the persisted flag
    ///
    /// The in-memory state is cleared even if storage fails.
    pub fn logout(&mut self) -> StoreResult<()> {
        self.state = SessionState::Unauthenticated;
        self.storage.remove(SESSION_KEY)?;
        info!("Admin logged out");
        Ok(())
    }
}
