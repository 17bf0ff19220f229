pub mod auth;
pub mod feed;
pub mod listings;
pub mod middleware;
pub mod origin;
pub mod state;

pub use origin::{RequestOrigin, UPLOADS_PATH};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use std::time::Duration;

use crate::error::AppError;
use crate::uploads::MAX_IMAGE_BYTES;

/// Leaves room for text fields and multipart framing around a maximum-size image,
/// so oversized files are rejected by image validation with a clear message.
const UPLOAD_BODY_LIMIT: usize = 2 * MAX_IMAGE_BYTES;

pub fn create_router(state: AppState) -> Router {
    let require_auth =
        axum_middleware::from_fn_with_state(state.clone(), middleware::auth_middleware);

    Router::new()
        // Liveness
        .route("/ping", get(ping))

        // Authentication endpoints
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))

        // Listing endpoints
        .route(
            "/api/posts",
            get(listings::list_posts).merge(
                post(listings::create_post)
                    .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                    .route_layer(require_auth.clone()),
            ),
        )
        .route(
            "/api/posts/{id}",
            delete(listings::delete_post).route_layer(require_auth),
        )

        // Realtime feed
        .route("/ws", get(feed::feed_socket))

        // Uploaded images, read-only
        .nest_service(UPLOADS_PATH, ServeDir::new(&state.config.upload_dir))

        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::redact_internal_errors,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.request_timeout_secs),
        ))
        .layer(axum_middleware::from_fn(middleware::timeout_as_json))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "ts": chrono::Utc::now().timestamp_millis(),
    }))
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
