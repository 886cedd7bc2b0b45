//! Collaborator construction and wiring

use anyhow::{Context, Result};
use artfolio_core::Config;
use artfolio_db::SubmissionRepository;
use artfolio_infra::AmqpPublisher;
use artfolio_services::{HttpFetcher, Storage, SubmissionService};
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::AppState;

/// Build every collaborator once; they are shared read-only across requests.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let fetcher =
        HttpFetcher::new(config.fetch.clone()).context("Failed to build image fetcher")?;

    let repository = SubmissionRepository::new(pool, config.submissions_table.clone())
        .context("Failed to create submission repository")?;

    let publisher = AmqpPublisher::new(config.amqp.clone());

    tracing::info!(
        table = %repository.table(),
        queue = %config.amqp.queue,
        amqp_host = %config.amqp.host,
        amqp_tls = config.amqp.use_tls,
        cleanup_orphaned_artifacts = config.cleanup_orphaned_artifacts,
        "Submission pipeline initialized"
    );

    let submissions = SubmissionService::new(
        Arc::new(fetcher),
        storage,
        Arc::new(repository),
        Arc::new(publisher),
        config.cleanup_orphaned_artifacts,
    );

    Ok(Arc::new(AppState::new(submissions)))
}
