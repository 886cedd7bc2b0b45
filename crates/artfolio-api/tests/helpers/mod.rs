//! Test helpers: build the router around in-memory collaborators.
//!
//! Run from workspace root: `cargo test -p artfolio-api --test submissions_test`.

use artfolio_api::setup::routes;
use artfolio_api::AppState;
use artfolio_core::Config;
use artfolio_services::testing::TestHarness;
use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;

pub const IMAGE_URL: &str = "https://ex.com/pic.jpg";

/// Minimal configuration accepted by `Config::from_lookup`
pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "postgresql://localhost/artfolio_test"),
        ("S3_BUCKET", "test-bucket"),
        ("RABBITMQ_HOST", "localhost"),
        ("RABBITMQ_USERNAME", "guest"),
        ("RABBITMQ_PASSWORD", "guest"),
        ("RABBITMQ_QUEUE", "submissions"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test configuration is valid")
}

/// Test application: server plus handles on every collaborator.
pub struct TestApp {
    pub server: TestServer,
    pub harness: TestHarness,
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {})
}

/// Like [`setup_test_app`], letting the caller arrange collaborator behavior first.
pub fn setup_test_app_with(arrange: impl FnOnce(&TestHarness)) -> TestApp {
    let harness = TestHarness::new();
    harness.fetcher.respond(IMAGE_URL, 200, &b"artwork-bytes"[..]);
    arrange(&harness);

    let state = Arc::new(AppState::new(harness.service(true)));
    let app = routes::setup_routes(&test_config(), state).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp { server, harness }
}
