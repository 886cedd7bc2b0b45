//! Route paths and HTTP limits

pub const SUBMISSIONS_PATH: &str = "/api/v2/submissions";

pub const HEALTH_PATH: &str = "/health";

pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Submissions carry a URL, not the image, so bodies stay small
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

pub const HTTP_CONCURRENCY_LIMIT: usize = 1_024;
