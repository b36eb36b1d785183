//! Top-level `axum::Router` assembly: the WebSocket upgrade endpoint,
//! the merged HTTP control plane, and plain health/metrics endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::server::AppContext;

use super::handler::websocket_handler;

/// Builds the full router for a given CORS origin policy. `cors_origins`
/// is either `*` (permissive) or a comma-separated allow-list.
pub fn create_router(cors_origins: &str) -> Router<AppContext> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route("/ws/{room_id}", get(websocket_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_text))
        .route("/metrics/json", get(metrics_json))
        .merge(crate::http::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics_text(State(ctx): State<AppContext>) -> String {
    ctx.metrics.render_prometheus()
}

async fn metrics_json(State(ctx): State<AppContext>) -> axum::Json<crate::metrics::MetricsSnapshot> {
    axum::Json(ctx.metrics.snapshot())
}
