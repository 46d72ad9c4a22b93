//! set_excel_directory / get_excel_directory - workbook directory state.
//!
//! The only mutable state in the server. Set validates at set-time;
//! calls in flight during a set may see either directory (last write
//! wins, see `WorkbookDir`).

use super::{McpTool, ToolContext};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sheetlink_bridge::ToolResult;

pub struct SetDirectoryTool;

#[async_trait]
impl McpTool for SetDirectoryTool {
    fn name(&self) -> &'static str {
        "set_excel_directory"
    }

    fn description(&self) -> &'static str {
        "Set the workbook directory used by every Excel tool. Without an argument, reports the current directory"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory holding the Excel files; must exist"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, args: Map<String, Value>, ctx: &ToolContext) -> Result<ToolResult> {
        let requested = args.get("directory").and_then(Value::as_str);

        let Some(requested) = requested.filter(|d| !d.is_empty()) else {
            // Agents probe with no argument to learn the current value.
            let current = ctx.workbook_dir().get().await;
            return Ok(ToolResult::text(format!(
                "Current Excel workbook directory: {}",
                current.display()
            )));
        };

        match ctx.workbook_dir().set(requested).await {
            Ok(()) => Ok(ToolResult::text(format!(
                "Excel workbook directory set to: {requested}"
            ))),
            Err(reason) => Ok(ToolResult::error(reason)),
        }
    }
}

pub struct GetDirectoryTool;

#[async_trait]
impl McpTool for GetDirectoryTool {
    fn name(&self) -> &'static str {
        "get_excel_directory"
    }

    fn description(&self) -> &'static str {
        "Report the current workbook directory"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _args: Map<String, Value>, ctx: &ToolContext) -> Result<ToolResult> {
        let current = ctx.workbook_dir().get().await;
        Ok(ToolResult::text(current.display().to_string()))
    }
}
