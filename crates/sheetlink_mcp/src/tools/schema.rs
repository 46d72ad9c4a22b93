//! excel_get_table_schema - CREATE TABLE definition lookup.

use super::{directory_property, require_str, McpTool, ToolContext};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sheetlink_bridge::ToolResult;
use sheetlink_protocol::EngineRequest;

pub struct TableSchemaTool;

#[async_trait]
impl McpTool for TableSchemaTool {
    fn name(&self) -> &'static str {
        "excel_get_table_schema"
    }

    fn description(&self) -> &'static str {
        "Fetch the structure of one table. The table name is a worksheet name, not a file name"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "table_name": {
                    "type": "string",
                    "description": "Table name (a worksheet name, not an Excel file name)"
                },
                "directory": directory_property(),
            },
            "required": ["table_name"]
        })
    }

    async fn execute(&self, args: Map<String, Value>, ctx: &ToolContext) -> Result<ToolResult> {
        let table = require_str(&args, "table_name")?;
        ctx.call_engine(EngineRequest::get_create_table(table), &args)
            .await
    }
}
