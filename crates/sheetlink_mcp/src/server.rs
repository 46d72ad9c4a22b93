//! MCP server: JSON-RPC 2.0 over stdio.
//!
//! The read loop parses one request per line. `tools/call` requests are
//! dispatched onto their own task so a slow engine process never blocks
//! other calls; responses funnel through a single writer task, which
//! keeps stdout line-atomic. Response order across concurrent calls is
//! unspecified; callers correlate by id.

use crate::config::{ServerConfig, WorkbookDir};
use crate::normalize::normalize_envelope;
use crate::protocol::{
    methods, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    ServerCapabilities, ServerInfo, ToolsCapability, ToolsListResult, JSONRPC_VERSION,
    MCP_PROTOCOL_VERSION,
};
use crate::tools::{ToolContext, ToolRegistry};
use anyhow::{Context, Result};
use serde_json::Value;
use sheetlink_bridge::{ChildProcessTransport, EngineTransport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// MCP server over stdio.
pub struct McpServer {
    config: ServerConfig,
    registry: ToolRegistry,
    ctx: ToolContext,
    initialized: AtomicBool,
}

impl McpServer {
    /// Server with the production child-process transport.
    pub fn new(config: ServerConfig) -> Self {
        let timeout = Duration::from_secs(config.engine_timeout_secs);
        let transport: Arc<dyn EngineTransport> = match &config.engine_executable {
            Some(path) => {
                Arc::new(ChildProcessTransport::with_executable(path.clone()).timeout(timeout))
            }
            None => Arc::new(ChildProcessTransport::new().timeout(timeout)),
        };
        Self::with_transport(config, transport)
    }

    /// Server with an injected transport (tests).
    pub fn with_transport(config: ServerConfig, transport: Arc<dyn EngineTransport>) -> Self {
        let workbook_dir = WorkbookDir::new(config.default_workbook_dir.clone());
        let ctx = ToolContext::new(transport, workbook_dir);
        Self {
            config,
            registry: ToolRegistry::new(),
            ctx,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve until stdin closes.
    pub async fn run(self) -> Result<()> {
        let server = Arc::new(self);
        let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(32);

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(response) = rx.recv().await {
                match serde_json::to_string(&response) {
                    Ok(json) => {
                        debug!("Sending: {json}");
                        if stdout.write_all(json.as_bytes()).await.is_err()
                            || stdout.write_all(b"\n").await.is_err()
                            || stdout.flush().await.is_err()
                        {
                            error!("stdout closed, dropping responses");
                            return;
                        }
                    }
                    Err(e) => error!("Failed to serialize response: {e}"),
                }
            }
        });

        info!(
            "MCP server starting ({} tools registered)",
            server.registry.len()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read from stdin")?
        {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            debug!("Received: {line}");

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        RequestId::Null,
                        JsonRpcError::parse_error(format!("Invalid JSON: {e}")),
                    );
                    let _ = tx.send(response).await;
                    continue;
                }
            };

            if request.method == methods::TOOLS_CALL {
                // Engine calls can take seconds; never hold up the loop.
                let server = Arc::clone(&server);
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(response) = server.handle_request(request).await {
                        let _ = tx.send(response).await;
                    }
                });
            } else if let Some(response) = server.handle_request(request).await {
                let _ = tx.send(response).await;
            }
        }

        drop(tx);
        writer.await.context("Writer task panicked")?;

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle a single request. `None` means no response is written
    /// (notifications).
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or_default(),
                JsonRpcError::invalid_request(format!(
                    "Invalid JSON-RPC version: {}",
                    request.jsonrpc
                )),
            ));
        }

        match request.method.as_str() {
            methods::INITIALIZE => Some(self.handle_initialize(request)),
            methods::INITIALIZED => match request.id {
                // Normally a notification; an id (unusual but legal) gets
                // an empty ack.
                Some(id) => Some(JsonRpcResponse::success(id, Value::Null)),
                None => None,
            },
            methods::TOOLS_LIST => {
                let result = ToolsListResult {
                    tools: self.registry.list_tools(),
                };
                Some(self.success(request.id, &result))
            }
            methods::TOOLS_CALL => self.handle_tools_call(request).await,
            methods::PING => Some(JsonRpcResponse::success(
                request.id.unwrap_or_default(),
                Value::Object(Default::default()),
            )),
            other => {
                if request.id.is_some() {
                    Some(JsonRpcResponse::error(
                        request.id.unwrap_or_default(),
                        JsonRpcError::method_not_found(other),
                    ))
                } else {
                    debug!("Ignoring notification: {other}");
                    None
                }
            }
        }
    }

    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        // Lenient on purpose: clients that send sloppy initialize params
        // still deserve a server. Client info is logged when present.
        if let Some(client) = request
            .params
            .as_ref()
            .and_then(|p| p.get("clientInfo"))
            .and_then(Value::as_object)
        {
            info!(
                "Initialize from {} v{}",
                client.get("name").and_then(|v| v.as_str()).unwrap_or("?"),
                client.get("version").and_then(|v| v.as_str()).unwrap_or("?"),
            );
        }

        self.initialized.store(true, Ordering::SeqCst);

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
        };

        self.success(request.id, &result)
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if !self.initialized.load(Ordering::SeqCst) {
            warn!("tools/call before initialize");
        }

        let call = normalize_envelope(request.params.as_ref());
        info!("Tool call: {}", call.name);

        let result = self
            .registry
            .call_tool(&call.name, &call.arguments, &self.ctx)
            .await;

        // Tool failures ride inside the result envelope, never as
        // JSON-RPC faults.
        request.id.map(|id| match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(
                id,
                JsonRpcError::internal_error(format!("Failed to serialize tool result: {e}")),
            ),
        })
    }

    fn success<T: serde::Serialize>(&self, id: Option<RequestId>, result: &T) -> JsonRpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id.unwrap_or_default(), value),
            Err(e) => JsonRpcResponse::error(
                id.unwrap_or_default(),
                JsonRpcError::internal_error(format!("Failed to serialize result: {e}")),
            ),
        }
    }
}
