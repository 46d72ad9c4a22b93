//! excel_query - SQL execution against the engine.

use super::{directory_property, require_str, McpTool, ToolContext};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sheetlink_bridge::ToolResult;
use sheetlink_protocol::EngineRequest;

pub struct QueryTool;

#[async_trait]
impl McpTool for QueryTool {
    fn name(&self) -> &'static str {
        "excel_query"
    }

    fn description(&self) -> &'static str {
        "Run a SQL query over the Excel data. Table names are worksheet names, not file names"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sql": {
                    "type": "string",
                    "description": "SQL statement (SELECT, SHOW TABLES, SHOW CREATE TABLE, ...). Table names are worksheet names"
                },
                "directory": directory_property(),
            },
            "required": ["sql"]
        })
    }

    async fn execute(&self, args: Map<String, Value>, ctx: &ToolContext) -> Result<ToolResult> {
        // Checked before any engine process exists.
        let sql = require_str(&args, "sql")?;
        ctx.call_engine(EngineRequest::execute_sql(sql), &args).await
    }
}
