//! In-memory collaborators for exercising [`crate::SubmissionService`] without
//! network access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use artfolio_core::models::Submission;
use artfolio_core::{AppError, StorageBackend};
use artfolio_db::SubmissionStore;
use artfolio_infra::{EventPublisher, PublishError};
use artfolio_storage::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;

use crate::services::fetcher::{FetchError, FetchedImage, RemoteFetcher};
use crate::SubmissionService;

pub const TEST_BUCKET_URL: &str = "https://test-bucket.s3.amazonaws.com";

/// Serves canned responses by URL; unknown URLs answer 404.
#[derive(Default)]
pub struct StubFetcher {
    responses: Mutex<HashMap<String, (u16, Bytes)>>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn respond(&self, url: &str, status: u16, body: impl Into<Bytes>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.into()));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteFetcher for StubFetcher {
    async fn get(&self, url: &str) -> Result<FetchedImage, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.lock().unwrap().get(url) {
            Some((status, body)) if (200..300).contains(status) => Ok(FetchedImage {
                bytes: body.clone(),
                content_type: "image/jpeg".to_string(),
            }),
            Some((status, _)) => Err(FetchError::Status(*status)),
            None => Err(FetchError::Status(404)),
        }
    }
}

/// Object store keeping objects in a map
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_puts: Mutex<bool>,
    fail_deletes: Mutex<bool>,
}

impl MemoryStorage {
    pub fn fail_puts(&self) {
        *self.fail_puts.lock().unwrap() = true;
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Key for a URL produced by [`Storage::public_url`]
    pub fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(TEST_BUCKET_URL)
            .map(|rest| rest.trim_start_matches('/').to_string())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, storage_key: &str, _content_type: &str, data: Bytes) -> StorageResult<String> {
        if *self.fail_puts.lock().unwrap() {
            return Err(StorageError::UploadFailed("bucket unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        Ok(self.public_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.object(storage_key)
            .map(|b| b.to_vec())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(StorageError::DeleteFailed("access denied".to_string()));
        }
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", TEST_BUCKET_URL, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Record store keeping records in insertion order
#[derive(Default)]
pub struct MemorySubmissionStore {
    records: Mutex<Vec<Submission>>,
    fail_puts: Mutex<bool>,
}

impl MemorySubmissionStore {
    pub fn fail_puts(&self) {
        *self.fail_puts.lock().unwrap() = true;
    }

    pub fn records(&self) -> Vec<Submission> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn put(&self, submission: &Submission) -> Result<(), AppError> {
        if *self.fail_puts.lock().unwrap() {
            return Err(AppError::Persistence("table unavailable".to_string()));
        }
        self.records.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

/// Publisher recording every payload
#[derive(Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<Vec<u8>>>,
    fail: Mutex<bool>,
}

impl RecordingPublisher {
    pub fn fail_publishes(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn messages(&self) -> Vec<Vec<u8>> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, payload: &[u8]) -> Result<(), PublishError> {
        if *self.fail.lock().unwrap() {
            return Err(PublishError::Connection("broker unreachable".to_string()));
        }
        self.messages.lock().unwrap().push(payload.to_vec());
        Ok(())
    }

    fn destination(&self) -> &str {
        "submissions"
    }
}

/// A service wired to in-memory collaborators, with handles to inspect them
pub struct TestHarness {
    pub fetcher: Arc<StubFetcher>,
    pub storage: Arc<MemoryStorage>,
    pub store: Arc<MemorySubmissionStore>,
    pub publisher: Arc<RecordingPublisher>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            fetcher: Arc::new(StubFetcher::default()),
            storage: Arc::new(MemoryStorage::default()),
            store: Arc::new(MemorySubmissionStore::default()),
            publisher: Arc::new(RecordingPublisher::default()),
        }
    }

    pub fn service(&self, cleanup_orphaned_artifacts: bool) -> SubmissionService {
        SubmissionService::new(
            self.fetcher.clone(),
            self.storage.clone(),
            self.store.clone(),
            self.publisher.clone(),
            cleanup_orphaned_artifacts,
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
