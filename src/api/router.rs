//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Responses carry extracted clinical data, so every response is marked
/// `Cache-Control: no-store`.
pub fn api_router(ctx: ApiContext) -> Router {
    let body_limit = ctx.limits.max_body_bytes();

    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/extract", post(endpoints::extract::extract))
        .route("/complications", post(endpoints::complications::detect))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
}
