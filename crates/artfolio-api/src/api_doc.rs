//! OpenAPI documentation

use utoipa::OpenApi;

use crate::handlers;
use artfolio_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Artfolio API",
        version = "0.1.0",
        description = "Student artwork submission ingestion. A submission names a remote image; \
            the service downloads it, stores it, records the submission and announces it on a queue."
    ),
    paths(
        handlers::submissions::create_submission,
        handlers::health::health,
    ),
    components(schemas(
        models::SubmissionRequest,
        models::SubmissionResponse,
        models::MessageResponse,
        models::Submission,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "submissions", description = "Artwork submissions"),
        (name = "health", description = "Operational probes")
    )
)]
pub struct ApiDoc;

pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_submission_route() {
        let spec = openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/v2/submissions"));
        assert!(spec.paths.paths.contains_key("/health"));
    }
}
