//! MCP tool implementations.
//!
//! Each tool is one caller-visible operation. The engine-backed ones
//! (tables, query, schema, cache) compose the same chain: normalize
//! arguments, build the engine request, invoke the transport, extract
//! the reply, adapt it. The directory tools touch only local state.

mod cache;
mod directory;
mod query;
mod registry;
mod schema;
mod tables;

pub use registry::ToolRegistry;

use crate::config::WorkbookDir;
use crate::protocol::ToolDefinition;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sheetlink_bridge::{adapt_reply, extract_reply, BridgeError, EngineTransport, ToolResult};
use sheetlink_protocol::EngineRequest;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Everything a tool needs at execution time.
///
/// Shared across concurrent calls; the transport is stateless and the
/// workbook directory handles its own synchronization.
#[derive(Clone)]
pub struct ToolContext {
    transport: Arc<dyn EngineTransport>,
    workbook_dir: WorkbookDir,
}

impl ToolContext {
    pub fn new(transport: Arc<dyn EngineTransport>, workbook_dir: WorkbookDir) -> Self {
        Self {
            transport,
            workbook_dir,
        }
    }

    pub fn workbook_dir(&self) -> &WorkbookDir {
        &self.workbook_dir
    }

    /// Run one engine round trip: transport, extraction, adaptation.
    ///
    /// A `directory` argument overrides the shared workbook directory
    /// for this call only.
    pub async fn call_engine(
        &self,
        request: EngineRequest,
        args: &Map<String, Value>,
    ) -> Result<ToolResult> {
        let dir = self.resolve_dir(args).await;
        debug!("Engine call: method={} dir={}", request.method, dir.display());

        let output = self.transport.invoke(&request, &dir).await?;
        let reply = extract_reply(&output.stdout)?;
        Ok(adapt_reply(&reply))
    }

    async fn resolve_dir(&self, args: &Map<String, Value>) -> PathBuf {
        match args.get("directory").and_then(Value::as_str) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => self.workbook_dir.get().await,
        }
    }
}

/// Trait for MCP tools.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g. "excel_query").
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> Value;

    /// Execute the tool. Arguments arrive already unwrapped by the
    /// request normalizer.
    async fn execute(&self, args: Map<String, Value>, ctx: &ToolContext) -> Result<ToolResult>;

    /// Tool definition for tools/list.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Fetch a required, non-blank string argument.
///
/// Fails before any engine process is spawned.
fn require_str<'a>(
    args: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a str, BridgeError> {
    match args.get(name).and_then(Value::as_str) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(BridgeError::MissingArgument(name)),
    }
}

/// Schema fragment shared by every engine-backed tool: the optional
/// per-call directory override.
fn directory_property() -> Value {
    serde_json::json!({
        "type": "string",
        "description": "Directory holding the Excel files (optional, defaults to the configured workbook directory)"
    })
}
