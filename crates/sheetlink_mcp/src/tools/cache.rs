//! excel_refresh_cache - force the engine to reload its files.

use super::{directory_property, McpTool, ToolContext};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sheetlink_bridge::ToolResult;
use sheetlink_protocol::{methods, EngineRequest};

pub struct RefreshCacheTool;

#[async_trait]
impl McpTool for RefreshCacheTool {
    fn name(&self) -> &'static str {
        "excel_refresh_cache"
    }

    fn description(&self) -> &'static str {
        "Drop the engine's file cache and reload every Excel file"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": directory_property(),
            },
            "required": []
        })
    }

    async fn execute(&self, args: Map<String, Value>, ctx: &ToolContext) -> Result<ToolResult> {
        ctx.call_engine(EngineRequest::new(methods::REFRESH), &args)
            .await
    }
}
