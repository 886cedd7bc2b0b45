//! Route configuration and setup

use crate::api_doc::openapi_spec;
use crate::constants::{
    HEALTH_PATH, HTTP_CONCURRENCY_LIMIT, MAX_REQUEST_BODY_BYTES, OPENAPI_PATH, SUBMISSIONS_PATH,
};
use crate::error::not_found;
use crate::handlers;
use crate::state::AppState;
use artfolio_core::Config;
use artfolio_infra::request_id_middleware;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
///
/// Any method or path not listed here answers `404 {"message": "Not Found"}`.
/// Oversized bodies fail in the JSON extractor, so they get the same
/// `{"message"}` body as any other unreadable request.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let app = Router::new()
        .route(HEALTH_PATH, get(handlers::health::health))
        .route(OPENAPI_PATH, get(|| async { Json(openapi_spec()) }))
        .route(
            SUBMISSIONS_PATH,
            post(handlers::submissions::create_submission).fallback(not_found),
        )
        .fallback(not_found)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any))
}
