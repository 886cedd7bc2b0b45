//! Artfolio API Library
//!
//! HTTP surface of the submission service: routing, error rendering and
//! application setup.

pub mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;

pub use error::{HttpAppError, ValidatedJson};
pub use setup::routes::setup_routes;
pub use state::AppState;
