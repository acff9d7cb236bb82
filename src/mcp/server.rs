//! MCP server implementation.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::mcp::handler::McpHandler;
use crate::mcp::protocol::*;
use crate::metrics::{Metrics, Timer};
use crate::{SERVER_NAME, VERSION};

/// MCP server: turns one request into exactly one response.
pub struct McpServer {
    handler: McpHandler,
    metrics: Arc<Metrics>,
    name: String,
    version: String,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(handler: McpHandler) -> Self {
        Self::with_metrics(handler, Metrics::new())
    }

    /// Create a new MCP server reporting into existing metrics.
    pub fn with_metrics(handler: McpHandler, metrics: Arc<Metrics>) -> Self {
        Self {
            handler,
            metrics,
            name: SERVER_NAME.to_string(),
            version: VERSION.to_string(),
        }
    }

    pub fn handler(&self) -> &McpHandler {
        &self.handler
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Handle a JSON-RPC request. Never fails: errors become failure envelopes.
    pub async fn handle_request(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let timer = Timer::start();
        let (id, method) = req.into_parts();
        debug!("Handling request: {:?} (id: {:?})", method, id);
        self.metrics.inc_requests();

        let result = match method {
            Method::Initialize => self.handle_initialize(),
            Method::ListTools => self.handle_list_tools(),
            Method::CallTool(params) => self.handle_call_tool(params).await,
            Method::Unknown(name) => Err(Error::MethodNotFound(name)),
        };

        let response = match result {
            Ok(value) => {
                self.metrics.inc_success();
                JsonRpcResponse::success(id, value)
            }
            Err(e) => {
                self.metrics.inc_failed();
                warn!("Request {:?} failed: {}", id, e);
                JsonRpcResponse::failure(id, &e)
            }
        };

        debug!("Request completed in {} ms", timer.elapsed_ms());
        response
    }

    /// Fixed capability and version descriptor.
    pub fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: self.version.clone(),
            },
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.initialize_result())?)
    }

    /// Handle list tools request.
    fn handle_list_tools(&self) -> Result<Value> {
        let tools = self.handler.list_tools();
        let result = ListToolsResult { tools };
        Ok(serde_json::to_value(result)?)
    }

    /// Handle call tool request.
    async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value> {
        self.metrics.inc_tool_calls();
        let result = self.handler.call(params).await?;
        Ok(serde_json::to_value(result)?)
    }
}
