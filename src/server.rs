//! MCP server over stdio
//!
//! Reads JSON-RPC requests line by line from stdin and writes responses to
//! stdout through a dedicated writer task. Each `tools/call` runs as an
//! independent task, so invocations for different resources proceed
//! concurrently without coordination; log output goes to stderr.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::normalize::{challenge_payload, normalize};
use crate::protocol::{
    rpc_codes, CallToolResult, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION,
};
use crate::tools::{self, ServerContext};

/// The stdio MCP server
pub struct McpServer {
    ctx: Arc<ServerContext>,
}

impl McpServer {
    /// Create a server over shared tool state
    pub fn new(ctx: Arc<ServerContext>) -> Self {
        Self { ctx }
    }

    /// Serve until stdin closes
    pub async fn run(&self) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(line) = rx.recv().await {
                if stdout.write_all(line.as_bytes()).await.is_err()
                    || stdout.write_all(b"\n").await.is_err()
                    || stdout.flush().await.is_err()
                {
                    error!("stdout closed; dropping responses");
                    break;
                }
            }
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        info!("server ready on stdio");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    debug!(error = %e, "failed to parse request");
                    let response =
                        JsonRpcResponse::error(None, rpc_codes::PARSE_ERROR, "Parse error");
                    send(&tx, &response);
                    continue;
                }
            };

            let ctx = Arc::clone(&self.ctx);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = handle_request(&ctx, request).await {
                    send(&tx, &response);
                }
            });
        }

        drop(tx);
        writer
            .await
            .map_err(|e| Error::Internal(format!("writer task failed: {e}")))?;
        info!("stdin closed; shutting down");
        Ok(())
    }
}

fn send(tx: &mpsc::UnboundedSender<String>, response: &JsonRpcResponse) {
    match serde_json::to_string(response) {
        Ok(line) => {
            let _ = tx.send(line);
        }
        Err(e) => error!(error = %e, "failed to serialize response"),
    }
}

/// Handle one JSON-RPC request; `None` for notifications
pub async fn handle_request(
    ctx: &Arc<ServerContext>,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    debug!(method = %request.method, "request");

    // Notifications get no response.
    let Some(id) = request.id else {
        return None;
    };
    let id = Some(id);

    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": "rds-control-mcp",
                    "version": crate::SERVER_VERSION,
                },
            }),
        ),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => JsonRpcResponse::success(id, json!({"tools": tools::definitions()})),
        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            return Some(handle_tool_call(ctx, id, &params).await);
        }
        other => JsonRpcResponse::error(
            id,
            rpc_codes::METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
        ),
    };
    Some(response)
}

/// Run one tool invocation inside the normalization boundary
async fn handle_tool_call(
    ctx: &Arc<ServerContext>,
    id: Option<crate::protocol::RequestId>,
    params: &Value,
) -> JsonRpcResponse {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(id, rpc_codes::INVALID_PARAMS, "Missing tool name");
    };
    if !tools::exists(name) {
        return JsonRpcResponse::error(
            id,
            rpc_codes::INVALID_PARAMS,
            format!("Unknown tool: {name}"),
        );
    }
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    info!(tool = name, "tool invocation");
    let result = match tools::dispatch(ctx, name, &arguments).await {
        Ok(payload) => CallToolResult::json(&payload, false),
        Err(Error::ConfirmationRequired(challenge)) => {
            // Not a failure from the protocol's point of view: the payload
            // tells the caller exactly how to resubmit.
            info!(tool = name, identifier = %challenge.identifier, "confirmation required");
            CallToolResult::json(&challenge_payload(&challenge), false)
        }
        Err(err) => CallToolResult::json(&normalize(name, &err).to_value(), true),
    };

    match serde_json::to_value(&result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            error!(error = %e, "failed to serialize tool result");
            JsonRpcResponse::error(id, rpc_codes::INTERNAL_ERROR, "Internal error")
        }
    }
}
