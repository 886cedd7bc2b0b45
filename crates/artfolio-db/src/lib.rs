//! Artfolio metadata store
//!
//! Postgres-backed persistence for submission records.

pub mod db;

pub use db::{SubmissionRepository, SubmissionStore};
