//! Artfolio Infrastructure Library
//!
//! Shared infrastructure components used by the Artfolio service:
//! - Middleware (request ID)
//! - Telemetry initialization
//! - Event publishing to the submissions queue

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod queue;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId};
#[cfg(feature = "amqp")]
pub use queue::AmqpPublisher;
pub use queue::{EventPublisher, PublishError};
#[cfg(feature = "observability-basic")]
pub use telemetry::init_telemetry;
