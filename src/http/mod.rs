//! HTTP transport for MCP.
//!
//! A single `POST /` endpoint takes one JSON-RPC request and always answers
//! `200 OK` with a JSON-RPC envelope; protocol failures live in the body.

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::mcp::server::McpServer;

/// HTTP server state.
#[derive(Clone)]
pub struct HttpState {
    server: Arc<McpServer>,
    request_timeout: Duration,
}

impl HttpState {
    pub fn new(server: Arc<McpServer>, request_timeout: Duration) -> Self {
        Self {
            server,
            request_timeout,
        }
    }
}

/// Build the application router.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/", post(mcp_endpoint))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start_server(config: &Config, server: Arc<McpServer>) -> Result<()> {
    let state = HttpState::new(server, config.request_timeout());
    let app = router(state);

    let addr = config.bind_addr()?;
    info!("Starting Dexcom MCP HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::HttpServer(e.to_string()))?;

    Ok(())
}

/// Main MCP endpoint.
async fn mcp_endpoint(State(state): State<HttpState>, body: Bytes) -> Json<JsonRpcResponse> {
    let request = match JsonRpcRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected request body: {}", e);
            return Json(JsonRpcResponse::failure(RequestId::Null, &e));
        }
    };

    let id = request.id.clone();
    let response = tokio::time::timeout(state.request_timeout, state.server.handle_request(request)).await;

    match response {
        Ok(response) => Json(response),
        Err(_) => {
            state.server.metrics().inc_timeouts();
            let e = Error::Timeout {
                seconds: state.request_timeout.as_secs(),
            };
            warn!("Request {:?} timed out", id);
            Json(JsonRpcResponse::failure(id, &e))
        }
    }
}

/// Health check endpoint.
async fn health_check(State(state): State<HttpState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "providerConfigured": state.server.handler().has_provider()
    }))
}

/// Prometheus metrics endpoint.
async fn metrics(State(state): State<HttpState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.server.metrics().to_prometheus(),
    )
}
