//! Tool registry: discovery and dispatch by name.

use super::{McpTool, ToolContext};
use crate::normalize::normalize_arguments;
use crate::protocol::ToolDefinition;
use serde_json::Value;
use sheetlink_bridge::{BridgeError, ToolResult};
use std::collections::HashMap;
use tracing::{debug, error};

/// Registry of available MCP tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Registry with every Sheetlink tool registered.
    pub fn new() -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };

        registry.register(Box::new(super::tables::ShowTablesTool));
        registry.register(Box::new(super::tables::ListSheetsTool));
        registry.register(Box::new(super::query::QueryTool));
        registry.register(Box::new(super::schema::TableSchemaTool));
        registry.register(Box::new(super::cache::RefreshCacheTool));
        registry.register(Box::new(super::directory::SetDirectoryTool));
        registry.register(Box::new(super::directory::GetDirectoryTool));

        debug!("Registered {} tools", registry.tools.len());

        registry
    }

    fn register(&mut self, tool: Box<dyn McpTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// List all available tools.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Dispatch a call by name.
    ///
    /// Arguments are unwrapped here so every tool sees normalized input.
    /// Every failure, including an unknown tool name, comes back as a
    /// failure [`ToolResult`]; this function never errors outward.
    pub async fn call_tool(&self, name: &str, raw_args: &Value, ctx: &ToolContext) -> ToolResult {
        let tool = match self.tools.get(name) {
            Some(tool) => tool,
            None => {
                error!("Unknown tool: {name}");
                return BridgeError::UnknownTool(name.to_string()).into();
            }
        };

        let args = normalize_arguments(raw_args);

        match tool.execute(args, ctx).await {
            Ok(result) => result,
            Err(e) => {
                error!("Tool {name} failed: {e:#}");
                ToolResult::error(e.to_string())
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
