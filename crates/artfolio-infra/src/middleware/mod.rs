//! HTTP middleware shared by Artfolio services

mod request_id;

pub use request_id::{request_id_middleware, RequestId};
