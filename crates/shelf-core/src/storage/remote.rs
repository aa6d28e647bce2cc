//! HTTP client backend
//!
//! Talks to the `/api/books` endpoints served by [`crate::server`]. Each
//! call is one blocking request with the configured timeout; there are no
//! retries.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{StoreError, StoreResult};
use super::{BookStore, LoadedBooks};
use crate::models::Book;

/// Book store backed by the remote file service
#[derive(Debug, Clone)]
pub struct RemoteStore {
    /// Base API URL, e.g. `http://localhost:3001/api`
    api_url: String,
    client: Client,
}

impl RemoteStore {
    /// Create a client for the API at `api_url`
    pub fn new(api_url: &str, timeout: Duration) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::read(api_url, e))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The collection endpoint
    pub fn books_url(&self) -> String {
        format!("{}/books", self.api_url)
    }
}

impl BookStore for RemoteStore {
    fn get_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.load()?.books)
    }

    fn load(&self) -> StoreResult<LoadedBooks> {
        let url = self.books_url();
        debug!("GET {}", url);

        let response = self.client.get(&url).send().map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            StoreError::read(&url, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::read(
                &url,
                format!("server responded with {}", status),
            ));
        }

        let values: Vec<Value> = response.json().map_err(|e| StoreError::read(&url, e))?;
        LoadedBooks::from_values(values).map_err(|e| StoreError::read(&url, e))
    }

    fn save_all(&mut self, books: &[Book]) -> StoreResult<()> {
        let url = self.books_url();
        debug!("POST {} ({} books)", url, books.len());

        let response = self.client.post(&url).json(books).send().map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            StoreError::write(&url, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::write(
                &url,
                format!("server responded with {}", status),
            ));
        }

        Ok(())
    }

    fn describe(&self) -> String {
        format!("remote {}", self.api_url)
    }
}
