// HTTP server for the MCP tool servers
//
// Routes:
// - <path> (default /mcp): MCP over streamable HTTP
// - /health: liveness probe
// - /metrics: Prometheus scrape endpoint (when enabled)

use anyhow::{Context, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::ServerHandler;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::bigip::ObjectLister;
use crate::config::Config;
use crate::curl::CurlProxy;
use crate::mcp::{BigIpServer, CurlServer};
use crate::metrics;

/// Router for the curl tool server
pub fn curl_router(proxy: Arc<CurlProxy>, config: &Config) -> Router {
    build_router(CurlServer::new(proxy), config)
}

/// Router for the BIG-IP tool server
pub fn bigip_router(lister: Arc<dyn ObjectLister>, config: &Config) -> Router {
    build_router(BigIpServer::new(lister), config)
}

fn build_router<S>(handler: S, config: &Config) -> Router
where
    S: ServerHandler + Clone,
{
    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            stateful_mode: !config.server.stateless,
            ..Default::default()
        },
    );

    let mut router = Router::new().route("/health", get(health_handler));
    if config.metrics.enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    // axum refuses to nest at the root
    let router = if config.server.path == "/" {
        router.fallback_service(service)
    } else {
        router.nest_service(&config.server.path, service)
    };

    router.layer(TraceLayer::new_for_http())
}

/// Serve a router until Ctrl-C
///
/// # Arguments
/// * `host` - Address to bind (e.g. `0.0.0.0`)
/// * `port` - Port to listen on (0 picks a free port)
pub async fn serve(router: Router, host: &str, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Metrics endpoint handler
async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text).into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error gathering metrics: {}", e),
            )
                .into_response()
        }
    }
}

/// Health check endpoint
async fn health_handler() -> impl IntoResponse {
    StatusCode::OK
}
