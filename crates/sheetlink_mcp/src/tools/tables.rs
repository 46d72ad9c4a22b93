//! excel_show_tables / excel_list_sheets - table discovery.
//!
//! Both tools ask the engine for its table list; `excel_list_sheets`
//! exists because agents look for sheet vocabulary, and a worksheet is a
//! table here.

use super::{directory_property, McpTool, ToolContext};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sheetlink_bridge::ToolResult;
use sheetlink_protocol::{methods, EngineRequest};

pub struct ShowTablesTool;

#[async_trait]
impl McpTool for ShowTablesTool {
    fn name(&self) -> &'static str {
        "excel_show_tables"
    }

    fn description(&self) -> &'static str {
        "List every table name available for SQL queries (one table per worksheet)"
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
        ctx.call_engine(EngineRequest::new(methods::GET_TABLES), &args)
            .await
    }
}

pub struct ListSheetsTool;

#[async_trait]
impl McpTool for ListSheetsTool {
    fn name(&self) -> &'static str {
        "excel_list_sheets"
    }

    fn description(&self) -> &'static str {
        "List all Excel worksheets (alias of excel_show_tables)"
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
        ctx.call_engine(EngineRequest::new(methods::GET_TABLES), &args)
            .await
    }
}
