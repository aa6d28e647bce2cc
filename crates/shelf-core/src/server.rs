//! Books HTTP API
//!
//! Serves a [`FileStore`] over HTTP so that [`RemoteStore`] clients can
//! share one collection:
//!
//! - `GET /api/books` returns the stored JSON array
//! - `POST /api/books` replaces the file with the request's JSON array
//! - `GET /api/books/export` returns the array as a `books-export.json`
//!   attachment
//!
//! Bodies are not validated beyond being a JSON array. Failures are
//! logged and reported as 500 with an `{"error": ...}` body.
//!
//! [`RemoteStore`]: crate::storage::RemoteStore

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::storage::transfer::{to_pretty_json, EXPORT_FILE_NAME};
use crate::storage::{FileStore, StoreError, StoreResult};

const READ_FAILED: &str = "Failed to read books";
const UPDATE_FAILED: &str = "Failed to update books";

#[derive(Clone)]
struct AppState {
    store: Arc<FileStore>,
}

/// Build the API router for `store`
pub fn router(store: FileStore) -> Router {
    let state = AppState {
        store: Arc::new(store),
    };

    Router::new()
        .route("/api/books", get(get_books).post(save_books))
        .route("/api/books/export", get(export_books))
        .with_state(state)
}

/// Bind a listener on `addr` (e.g. `127.0.0.1:3001`)
pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))
}

/// Serve the API on `listener` until the task is dropped
pub async fn serve(listener: TcpListener, store: FileStore) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no address")?;
    info!(
        "API server running on http://{} (books file {:?})",
        addr,
        store.path()
    );

    axum::serve(listener, router(store))
        .await
        .context("API server failed")
}

async fn get_books(State(state): State<AppState>) -> Response {
    let store = state.store.clone();
    match blocking(move || store.read_values()).await {
        Ok(values) => {
            info!("GET /api/books -> {} entries", values.len());
            Json(values).into_response()
        }
        Err(e) => {
            error!("GET /api/books failed: {}", e);
            error_response(READ_FAILED)
        }
    }
}

async fn save_books(State(state): State<AppState>, Json(values): Json<Vec<Value>>) -> Response {
    let store = state.store.clone();
    let count = values.len();
    match blocking(move || store.write_values(&values)).await {
        Ok(()) => {
            info!("POST /api/books -> saved {} entries", count);
            Json(json!({"success": true, "message": "Books updated successfully"})).into_response()
        }
        Err(e) => {
            error!("POST /api/books failed: {}", e);
            error_response(UPDATE_FAILED)
        }
    }
}

async fn export_books(State(state): State<AppState>) -> Response {
    let store = state.store.clone();
    let content = blocking(move || store.read_values().and_then(|v| to_pretty_json(&v))).await;

    match content {
        Ok(body) => {
            info!("GET /api/books/export -> {} bytes", body.len());
            let headers = [
                (header::CONTENT_TYPE, "application/json".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                ),
            ];
            (headers, body).into_response()
        }
        Err(e) => {
            error!("GET /api/books/export failed: {}", e);
            error_response(READ_FAILED)
        }
    }
}

fn error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Run file I/O off the async worker threads
async fn blocking<T, F>(f: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::models::Book;
    use crate::storage::{BookStore, RemoteStore};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::runtime::Runtime;

    /// Start the API on an ephemeral port; keep the runtime alive for the test
    fn spawn_server(store: FileStore) -> (Runtime, String) {
        let runtime = Runtime::new().unwrap();
        let listener = runtime.block_on(bind("127.0.0.1:0")).unwrap();
        let addr = listener.local_addr().unwrap();
        runtime.spawn(serve(listener, store));
        (runtime, format!("http://{}/api", addr))
    }

    fn client(api_url: &str) -> RemoteStore {
        RemoteStore::new(api_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_save_then_get_through_remote_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("books.json");
        let (_runtime, api_url) = spawn_server(FileStore::new(&path));
        let mut remote = client(&api_url);

        let books = vec![
            Book::new("Dune", "Frank Herbert", Some(1965)),
            Book::new("Emma", "Jane Austen", None),
        ];
        remote.save_all(&books).unwrap();
        assert_eq!(remote.get_all().unwrap(), books);

        // Written to disk, pretty-printed
        let on_disk = fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("\n   {"));
        assert_eq!(FileStore::new(&path).get_all().unwrap(), books);
    }

    #[test]
    fn test_round_trip_through_remote_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("books.json");
        let mut file = FileStore::new(&path);
        file.save_all(&[Book::new("Dune", "Frank Herbert", Some(1965))])
            .unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let (_runtime, api_url) = spawn_server(file);
        let mut remote = client(&api_url);
        let books = remote.get_all().unwrap();
        remote.save_all(&books).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_missing_file_returns_500() {
        let temp_dir = TempDir::new().unwrap();
        let (_runtime, api_url) = spawn_server(FileStore::new(temp_dir.path().join("none.json")));

        let response = reqwest::blocking::get(format!("{}/books", api_url)).unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().unwrap();
        assert_eq!(body, json!({"error": "Failed to read books"}));

        let remote = client(&api_url);
        assert!(matches!(remote.get_all(), Err(StoreError::Read { .. })));
    }

    #[test]
    fn test_post_response_body() {
        let temp_dir = TempDir::new().unwrap();
        let (_runtime, api_url) = spawn_server(FileStore::new(temp_dir.path().join("books.json")));

        let response = reqwest::blocking::Client::new()
            .post(format!("{}/books", api_url))
            .json(&json!([{"title": "Dune", "author": "Frank Herbert", "year": 1965}]))
            .send()
            .unwrap();
        assert!(response.status().is_success());
        let body: Value = response.json().unwrap();
        assert_eq!(body["success"], json!(true));
    }

    #[test]
    fn test_post_non_array_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("books.json");
        let (_runtime, api_url) = spawn_server(FileStore::new(&path));

        let response = reqwest::blocking::Client::new()
            .post(format!("{}/books", api_url))
            .json(&json!({"title": "Dune"}))
            .send()
            .unwrap();
        assert!(response.status().is_client_error());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_failure_returns_500() {
        let temp_dir = TempDir::new().unwrap();
        // The parent "directory" is a regular file, so writes must fail
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let (_runtime, api_url) = spawn_server(FileStore::new(blocker.join("books.json")));

        let response = reqwest::blocking::Client::new()
            .post(format!("{}/books", api_url))
            .json(&json!([]))
            .send()
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().unwrap();
        assert_eq!(body, json!({"error": "Failed to update books"}));

        let mut remote = client(&api_url);
        assert!(matches!(remote.save_all(&[]), Err(StoreError::Write { .. })));
    }

    #[test]
    fn test_export_is_attachment() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("books.json");
        let books = vec![Book::new("Dune", "Frank Herbert", Some(1965))];
        FileStore::new(&path).save_all(&books).unwrap();
        let (_runtime, api_url) = spawn_server(FileStore::new(&path));

        let response = reqwest::blocking::get(format!("{}/books/export", api_url)).unwrap();
        assert!(response.status().is_success());
        let disposition = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(disposition, "attachment; filename=\"books-export.json\"");

        let body: Vec<Book> = response.json().unwrap();
        assert_eq!(body, books);
    }

    #[test]
    fn test_remote_catalog_keeps_ids_for_legacy_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("books.json");
        fs::write(&path, r#"[{"title": "Dune", "author": "Frank Herbert", "year": 1965}]"#).unwrap();
        let (_runtime, api_url) = spawn_server(FileStore::new(&path));

        let first = Catalog::open(Box::new(client(&api_url))).unwrap();
        let id = first.books()[0].id;

        let mut second = Catalog::open(Box::new(client(&api_url))).unwrap();
        assert_eq!(second.books()[0].id, id);
        second.delete(id).unwrap();
        assert!(FileStore::new(&path).get_all().unwrap().is_empty());
    }
}
