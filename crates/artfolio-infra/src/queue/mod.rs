//! Submission event publishing
//!
//! The pipeline announces every persisted submission on a single named queue.
//! Publishers deliver at least once; there is no deduplication token.

#[cfg(feature = "amqp")]
mod amqp;

#[cfg(feature = "amqp")]
pub use amqp::{amqp_uri, AmqpPublisher};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Event publishing errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Queue declaration failed: {0}")]
    Declare(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Broker rejected the message")]
    Rejected,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Delivers a JSON payload to the configured queue.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one message. Attempted once; the caller decides what a failure means.
    async fn publish(&self, payload: &[u8]) -> Result<(), PublishError>;

    /// Name of the destination queue, for logging
    fn destination(&self) -> &str;
}
