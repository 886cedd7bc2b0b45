//! Object store setup

use anyhow::{Context, Result};
use artfolio_core::Config;
use artfolio_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(&config.storage)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        backend = %storage.backend_type(),
        bucket = ?config.storage.s3_bucket,
        "Storage initialized"
    );

    Ok(storage)
}
