//! Submission pipeline
//!
//! validate → fetch → store artifact → persist record → publish event → respond.
//! Each step runs once and a failure stops the pipeline where it happened.

use std::sync::Arc;

use artfolio_core::models::{Submission, SubmissionRequest, SubmissionResponse};
use artfolio_core::validation::validate_submission;
use artfolio_core::AppError;
use artfolio_db::SubmissionStore;
use artfolio_infra::EventPublisher;
use artfolio_storage::{artifact_key, Storage};

use super::fetcher::RemoteFetcher;

/// Orchestrates one artwork submission across its collaborators.
#[derive(Clone)]
pub struct SubmissionService {
    fetcher: Arc<dyn RemoteFetcher>,
    storage: Arc<dyn Storage>,
    store: Arc<dyn SubmissionStore>,
    publisher: Arc<dyn EventPublisher>,
    cleanup_orphaned_artifacts: bool,
}

impl SubmissionService {
    pub fn new(
        fetcher: Arc<dyn RemoteFetcher>,
        storage: Arc<dyn Storage>,
        store: Arc<dyn SubmissionStore>,
        publisher: Arc<dyn EventPublisher>,
        cleanup_orphaned_artifacts: bool,
    ) -> Self {
        Self {
            fetcher,
            storage,
            store,
            publisher,
            cleanup_orphaned_artifacts,
        }
    }

    /// Run the pipeline for one request.
    ///
    /// Nothing is fetched or written unless the request validates. Identical
    /// requests are not deduplicated; each produces its own artifact, record
    /// and event.
    pub async fn handle(&self, request: &SubmissionRequest) -> Result<SubmissionResponse, AppError> {
        let submission = validate_submission(request)?;

        let image = self
            .fetcher
            .get(&submission.image_url)
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    image_url = %submission.image_url,
                    "Failed to download submitted image"
                );
                AppError::Fetch(e.to_string())
            })?;

        let key = artifact_key(
            &submission.assignment_id,
            &submission.student_id,
            &submission.image_url,
        );

        let artifact_url = self
            .storage
            .put(&key.key, &image.content_type, image.bytes)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, storage_key = %key.key, "Failed to store artifact");
                AppError::Storage(e.to_string())
            })?;

        let record = Submission::new(&submission, artifact_url);

        if let Err(e) = self.store.put(&record).await {
            tracing::error!(
                error = %e,
                submission_id = %record.submission_id,
                storage_key = %key.key,
                "Failed to persist submission"
            );
            self.discard_artifact(&key.key).await;
            return Err(match e {
                AppError::Persistence(_) => e,
                other => AppError::Persistence(other.to_string()),
            });
        }

        let payload = serde_json::to_vec(&record)?;
        if let Err(e) = self.publisher.publish(&payload).await {
            // Record and artifact stay; the record can be re-announced from the table
            tracing::error!(
                error = %e,
                submission_id = %record.submission_id,
                queue = %self.publisher.destination(),
                "Submission persisted but event was not published"
            );
            return Err(AppError::Publish(e.to_string()));
        }

        tracing::info!(
            submission_id = %record.submission_id,
            assignment_id = %record.assignment_id,
            student_id = %record.student_id,
            storage_key = %key.key,
            "Submission accepted"
        );

        Ok(SubmissionResponse::accepted(record.submission_id))
    }

    async fn discard_artifact(&self, storage_key: &str) {
        if !self.cleanup_orphaned_artifacts {
            tracing::warn!(storage_key = %storage_key, "Leaving orphaned artifact in place");
            return;
        }

        match self.storage.delete(storage_key).await {
            Ok(()) => tracing::info!(storage_key = %storage_key, "Deleted orphaned artifact"),
            Err(e) => tracing::warn!(
                error = %e,
                storage_key = %storage_key,
                "Failed to delete orphaned artifact"
            ),
        }
    }
}
