//! HTTP boundary
//!
//! Exposes the pipeline as `GET /search`. Bounds are checked here, before
//! the pipeline is invoked; an empty result set maps to 404 and a failure
//! to launch the browser engine maps to 500.

mod handlers;

pub use handlers::{ApiError, SearchRequest};

use crate::config::Config;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

/// State shared by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// Builds the router with every endpoint
pub fn router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/search", get(handlers::search))
        .route("/health", get(handlers::health))
        .with_state(AppState { config })
}

/// Serves the router on `addr` until the process stops
pub async fn serve(config: Config, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(Arc::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Search service listening on http://{}", addr);

    axum::serve(listener, app).await
}
