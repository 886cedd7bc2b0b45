//! Database repositories for the data access layer
//!
//! Each repository owns one entity. Callers depend on the store traits so that
//! tests can substitute in-memory implementations.

pub mod submission;

pub use submission::{SubmissionRepository, SubmissionStore};
