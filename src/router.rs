use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::get,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{home_page, metrics_handler, proxy_handler, stats_handler};
use crate::state::AppState;

// Local pages answer GET only; every other method on them is proxied too.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_page).fallback(proxy_handler))
        .route("/stats", get(stats_handler).fallback(proxy_handler))
        .route("/metrics", get(metrics_handler).fallback(proxy_handler))
        .fallback(proxy_handler)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(300))
}
