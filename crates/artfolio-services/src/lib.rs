//! Artfolio Services Layer
//!
//! Orchestration of a submission: remote fetch, artifact storage, record
//! persistence and event publishing. The API crate stays a thin HTTP shell
//! around [`SubmissionService`].

pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use artfolio_db::{SubmissionRepository, SubmissionStore};
pub use artfolio_infra::{EventPublisher, PublishError};
pub use artfolio_storage::{create_storage, Storage, StorageBackend, StorageError};
pub use services::fetcher::{FetchError, FetchedImage, HttpFetcher, RemoteFetcher};
pub use services::submission::SubmissionService;
