//! Stdio transport for MCP protocol.
//!
//! Handles newline-delimited JSON-RPC 2.0 over stdin/stdout. Requests are
//! processed one at a time; stdout carries nothing but responses.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::McpServer;
use super::transport::{JsonRpcRequest, JsonRpcResponse};

/// Serve MCP over a line-oriented reader/writer pair until the reader closes.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn run_stdio<R, W>(server: &McpServer, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(input);
    let mut line = String::new();

    tracing::info!("MCP stdio server ready, waiting for requests...");

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            tracing::info!("Stdin closed, shutting down");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match JsonRpcRequest::parse(trimmed) {
            Ok(request) => server.handle_request(request).await,
            Err(error) => {
                tracing::warn!("Rejected malformed message");
                Some(error)
            }
        };

        if let Some(response) = response {
            write_response(&mut output, &response).await?;
        }
    }

    Ok(())
}

async fn write_response<W>(output: &mut W, response: &JsonRpcResponse) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let response_json = serde_json::to_string(response)?;
    output.write_all(response_json.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
