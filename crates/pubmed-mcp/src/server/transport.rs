//! JSON-RPC message types and the HTTP transport.
//!
//! The HTTP transport accepts one JSON-RPC message per `POST /mcp` and
//! answers with the response body, or `202 Accepted` for notifications.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::McpServer;

/// JSON-RPC 2.0 error codes.
pub mod error_codes {
    /// Invalid JSON.
    pub const PARSE_ERROR: i32 = -32700;
    /// Not a valid request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Unknown method.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Bad method parameters (unknown tool, missing tool name).
    pub const INVALID_PARAMS: i32 = -32602;
}

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Decode one message, mapping failures to the JSON-RPC error to send back.
    ///
    /// # Errors
    ///
    /// Returns a parse error for invalid JSON and an invalid-request error for
    /// JSON that is not a request object.
    pub fn parse(text: &str) -> Result<Self, JsonRpcResponse> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            JsonRpcResponse::error(None, error_codes::PARSE_ERROR, format!("Parse error: {e}"))
        })?;

        let id = value.get("id").cloned();
        serde_json::from_value(value).map_err(|e| {
            JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Invalid request: {e}"),
            )
        })
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// JSON-RPC version constant.
    const VERSION: &'static str = "2.0";

    #[must_use]
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: Some(result),
            error: None,
            id,
        }
    }

    #[must_use]
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }
}

/// MCP tool info for tools/list response.
#[derive(Debug, Serialize)]
pub struct McpToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Create the HTTP router for MCP.
pub fn create_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/mcp", post(handle_mcp_post))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

async fn health_check(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    let client = &server.context().client;
    let interval_ms =
        u64::try_from(client.rate_limiter().interval().as_millis()).unwrap_or(u64::MAX);
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "tools": server.list_tools().len(),
        "apiKey": client.has_api_key(),
        "email": client.has_email(),
        "requestIntervalMs": interval_ms
    }))
}

/// Handle POST requests to /mcp.
async fn handle_mcp_post(State(server): State<Arc<McpServer>>, body: String) -> Response {
    let request = match JsonRpcRequest::parse(&body) {
        Ok(request) => request,
        Err(error) => return (StatusCode::BAD_REQUEST, Json(error)).into_response(),
    };

    match server.handle_request(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
