//! Artfolio Core Library
//!
//! This crate provides the domain models, error types, configuration, and request
//! validation shared by every Artfolio component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{AmqpSettings, Config, FetchSettings, StorageSettings};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
