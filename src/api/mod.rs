//! HTTP surface: the relay under its original path plus the `/api/v1` routes.

pub mod community;
pub mod email;
pub mod export;
pub mod health;
pub mod share;
pub mod trips;

pub use community::{create_post, like_post, list_posts, unlike_post};
pub use email::send_trip_email;
pub use export::export_pdf;
pub use health::health_check;
pub use share::share_trip;
pub use trips::trip_summary;

use crate::error::ServiceError;
use crate::middleware::auth_middleware;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, Method, header},
    middleware,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub const RELAY_PATH: &str = "/functions/v1/send-trip-email";

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_request_bytes();

    // API routes (with auth)
    let api_routes = Router::new()
        .route("/api/v1/email", post(send_trip_email))
        .route("/api/v1/export", post(export_pdf))
        .route("/api/v1/trips/share", post(share_trip))
        .route("/api/v1/trips/{id}/summary", get(trip_summary))
        .route("/api/v1/community/posts", get(list_posts).post(create_post))
        .route(
            "/api/v1/community/posts/{id}/like",
            post(like_post).delete(unlike_post),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route(RELAY_PATH, post(send_trip_email))
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin. Every `OPTIONS` request is answered here with an empty body,
/// ahead of routing and API key checks.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Parses a JSON body so that malformed input gets the usual `{error}` body.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServiceError::InvalidRequest("request body is empty".into()));
    }
    serde_json::from_slice(body).map_err(|e| ServiceError::InvalidRequest(e.to_string()))
}

/// Trims and drops empty strings.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
