mod error;
mod handlers;
mod state;

pub use state::{AppState, post_source};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/sitemap.xml", get(handlers::sitemap))
        .route("/robots.txt", get(handlers::robots))
        .route(
            "/api/seo-check",
            post(handlers::seo_check).options(handlers::preflight),
        )
        .route("/api/chat", post(handlers::chat).options(handlers::preflight))
        .route(
            "/api/pagespeed",
            post(handlers::pagespeed).options(handlers::preflight),
        )
        .route("/api/share", post(handlers::share).options(handlers::preflight))
        .route("/api/toc", post(handlers::toc).options(handlers::preflight))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
