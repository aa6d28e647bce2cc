//! API server command handler

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use shelf_core::server;
use shelf_core::storage::FileStore;
use shelf_core::Config;

/// Serve the books file over HTTP until interrupted
pub fn run(config: &Config, bind: Option<String>, books_file: Option<PathBuf>) -> Result<()> {
    let addr = bind.unwrap_or_else(|| config.bind.clone());
    let store = FileStore::new(books_file.unwrap_or_else(|| config.books_file_path()));

    if !store.exists() {
        warn!(
            "Books file {:?} does not exist yet; reads will fail until a collection is saved",
            store.path()
        );
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let result = runtime.block_on(async move {
        let listener = server::bind(&addr).await?;

        tokio::select! {
            result = server::serve(listener, store) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down API server");
                Ok(())
            }
        }
    });

    runtime.shutdown_timeout(Duration::from_secs(5));
    result
}
