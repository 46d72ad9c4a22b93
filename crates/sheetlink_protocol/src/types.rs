//! Engine request payload types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Method names the engine understands.
pub mod methods {
    /// List every table the engine has loaded.
    pub const GET_TABLES: &str = "get_tables";
    /// Run a SQL statement.
    pub const EXECUTE_SQL: &str = "execute_sql";
    /// Fetch the CREATE TABLE definition of one table.
    pub const GET_CREATE_TABLE: &str = "get_create_table";
    /// Drop and reload the engine's file cache.
    pub const REFRESH: &str = "refresh";
}

/// One request to the engine: a method name and its parameters.
///
/// Serialized as a single JSON line; non-ASCII characters are written
/// as-is, never `\u` escaped, because the engine decodes raw UTF-8.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRequest {
    pub method: String,
    pub params: Map<String, Value>,
}

impl EngineRequest {
    /// Request with no parameters.
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            params: Map::new(),
        }
    }

    /// Request carrying a SQL statement.
    pub fn execute_sql(sql: &str) -> Self {
        let mut params = Map::new();
        params.insert("sql".to_string(), Value::String(sql.to_string()));
        Self {
            method: methods::EXECUTE_SQL.to_string(),
            params,
        }
    }

    /// Request for one table's CREATE TABLE definition.
    pub fn get_create_table(table: &str) -> Self {
        let mut params = Map::new();
        params.insert("table".to_string(), Value::String(table.to_string()));
        Self {
            method: methods::GET_CREATE_TABLE.to_string(),
            params,
        }
    }

    /// The single line written to the engine's stdin (no trailing newline).
    pub fn to_wire_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
