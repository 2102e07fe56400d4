//! MCP server implementation.
//!
//! Provides both stdio (for desktop MCP clients) and HTTP transports. Both
//! feed requests through [`McpServer::handle_request`].

pub mod stdio;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::client::PubMedClient;
use crate::tools::{self, McpTool, ToolContext};

use transport::{JsonRpcRequest, JsonRpcResponse, McpToolInfo, error_codes};

/// Protocol version answered when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server for PubMed.
pub struct McpServer {
    /// Tool execution context.
    ctx: ToolContext,

    /// Registered tools.
    tools: Vec<Box<dyn McpTool>>,
}

impl McpServer {
    /// Create a new MCP server.
    #[must_use]
    pub fn new(client: PubMedClient) -> Self {
        let ctx = ToolContext::new(Arc::new(client));
        let tools = tools::register_all_tools();

        Self { ctx, tools }
    }

    /// Run the server in stdio mode.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!(tools = self.tools.len(), "Starting MCP server in stdio mode");

        stdio::run_stdio(&self, tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Run the server in HTTP mode.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        tracing::info!(tools = self.tools.len(), port, "Starting MCP server in HTTP mode");

        let router = transport::create_router(Arc::new(self));
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }

    /// Get tool by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools.iter().find(|t| t.name() == name).map(AsRef::as_ref)
    }

    /// List all available tools.
    #[must_use]
    pub fn list_tools(&self) -> Vec<(&str, &str)> {
        self.tools.iter().map(|t| (t.name(), t.description())).collect()
    }

    /// Get tool context for execution.
    #[must_use]
    pub const fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Dispatch one JSON-RPC message.
    ///
    /// Notifications (no `id`) never get a response.
    pub async fn handle_request(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %req.method, "Received request");

        let Some(id) = req.id else {
            tracing::debug!(method = %req.method, "Notification received");
            return None;
        };
        let id = Some(id);

        let response = match req.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result(&req.params)),
            "tools/list" => JsonRpcResponse::success(id, self.tools_list_result()),
            "tools/call" => self.handle_tools_call(id, &req.params).await,
            "ping" | "initialized" | "notifications/initialized" => {
                JsonRpcResponse::success(id, json!({}))
            }
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", req.method),
            ),
        };

        Some(response)
    }

    fn tools_list_result(&self) -> Value {
        let tool_list: Vec<McpToolInfo> = self
            .tools
            .iter()
            .map(|t| McpToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect();

        json!({ "tools": tool_list })
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: &Value) -> JsonRpcResponse {
        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' parameter",
            );
        };

        let Some(tool) = self.get_tool(tool_name) else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Tool not found: {tool_name}"),
            );
        };

        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        tracing::info!(tool = %tool_name, "Executing tool");

        match tool.execute(&self.ctx, arguments).await {
            Ok(text) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{
                        "type": "text",
                        "text": text
                    }]
                }),
            ),
            Err(e) => {
                if e.is_invalid_argument() {
                    tracing::warn!(tool = %tool_name, error = %e, "Invalid tool arguments");
                } else {
                    tracing::error!(tool = %tool_name, error = %e, "Tool execution failed");
                }
                JsonRpcResponse::success(
                    id,
                    json!({
                        "content": [{
                            "type": "text",
                            "text": e.to_user_message()
                        }],
                        "isError": true
                    }),
                )
            }
        }
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("tools", &self.tools.len()).finish()
    }
}

fn initialize_result(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    tracing::info!("MCP initialize: protocol version {}", protocol_version);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
