//! Web API router construction and shared response utilities.

use axum::{
    Router,
    http::{HeaderValue, Method},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::state::AppState;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::{status, stories};

/// Cache-Control presets for public endpoints.
pub mod cache {
    /// Ranked stories. Shorter than the server-side TTL so clients pick up refreshes.
    pub const STORIES: &str = "public, max-age=60, stale-while-revalidate=60";
}

/// Wraps a JSON response with a `Cache-Control` header.
pub fn with_cache_control<T: serde::Serialize>(value: T, header: &'static str) -> Response {
    let mut response = Json(value).into_response();
    response.headers_mut().insert(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(header),
    );
    response
}

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(status::health))
        .route("/status", get(status::status))
        .route("/stories", get(stories::top_stories_by_query))
        .route("/stories/{count}", get(stories::top_stories_by_path))
        .with_state(app_state);

    Router::new().nest("/api", api_router).layer((
        // Outermost: per-request ID span + severity-proportional response logging.
        RequestIdLayer,
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET]),
        CompressionLayer::new()
            .br(true)
            .gzip(true)
            .quality(tower_http::CompressionLevel::Fastest),
        TimeoutLayer::new(Duration::from_secs(60)),
    ))
}
