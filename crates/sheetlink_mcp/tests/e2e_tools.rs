//! End-to-end tests for the MCP tool pipeline.
//!
//! A scripted transport stands in for the engine executable so every
//! layer above the process spawn runs for real: envelope normalization,
//! argument unwrapping, dispatch, reply extraction and adaptation.

use async_trait::async_trait;
use serde_json::{json, Value};
use sheetlink_bridge::{BridgeError, EngineTransport, RawEngineOutput};
use sheetlink_mcp::protocol::{methods, JsonRpcRequest, RequestId, JSONRPC_VERSION};
use sheetlink_mcp::{McpServer, ServerConfig};
use sheetlink_protocol::EngineRequest;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Transport double: replays a scripted stdout and records what the
/// dispatcher asked for.
struct ScriptedTransport {
    stdout: String,
    invocations: AtomicUsize,
    seen: Mutex<Vec<(EngineRequest, PathBuf)>>,
}

impl ScriptedTransport {
    fn new(stdout: &str) -> Arc<Self> {
        Arc::new(Self {
            stdout: stdout.to_string(),
            invocations: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    fn last_seen(&self) -> Option<(EngineRequest, PathBuf)> {
        self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EngineTransport for ScriptedTransport {
    async fn invoke(
        &self,
        request: &EngineRequest,
        workbook_dir: &Path,
    ) -> Result<RawEngineOutput, BridgeError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((request.clone(), workbook_dir.to_path_buf()));
        Ok(RawEngineOutput {
            stdout: self.stdout.clone(),
            stderr: String::new(),
        })
    }
}

fn server_with(transport: Arc<ScriptedTransport>) -> McpServer {
    McpServer::with_transport(ServerConfig::default(), transport)
}

fn call_request(params: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id: Some(RequestId::Number(1)),
        method: methods::TOOLS_CALL.to_string(),
        params: Some(params),
    }
}

async fn call_tool(server: &McpServer, params: Value) -> Value {
    let response = server
        .handle_request(call_request(params))
        .await
        .expect("tools/call with an id must produce a response");
    assert!(response.error.is_none(), "tool failures must not be faults");
    response.result.unwrap()
}

fn result_text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().unwrap()
}

fn is_error(result: &Value) -> bool {
    result["isError"].as_bool().unwrap_or(false)
}

// =============================================================================
// DISPATCH
// =============================================================================

/// A query rides through the whole chain: dispatch, engine invocation,
/// extraction of the pretty-printed reply, adaptation.
#[tokio::test]
async fn test_query_round_trip() {
    let transport = ScriptedTransport::new("log line\n{\n  \"result\": [\"orders\", \"items\"]\n}\ntrailer\n");
    let server = server_with(transport.clone());

    let result = call_tool(
        &server,
        json!({"name": "excel_query", "arguments": {"sql": "SHOW TABLES"}}),
    )
    .await;

    assert!(!is_error(&result));
    assert_eq!(
        result_text(&result),
        serde_json::to_string_pretty(&json!(["orders", "items"])).unwrap()
    );

    let (request, dir) = transport.last_seen().unwrap();
    assert_eq!(request.method, "execute_sql");
    assert_eq!(request.params.get("sql"), Some(&json!("SHOW TABLES")));
    assert_eq!(dir, PathBuf::from("./XLSX"));
}

/// Empty sql fails before any engine process would be spawned.
#[tokio::test]
async fn test_empty_sql_fails_without_spawning() {
    let transport = ScriptedTransport::new("{\"result\": 1}");
    let server = server_with(transport.clone());

    for arguments in [json!({}), json!({"sql": ""}), json!({"sql": "   "})] {
        let result = call_tool(
            &server,
            json!({"name": "excel_query", "arguments": arguments}),
        )
        .await;
        assert!(is_error(&result));
        assert!(result_text(&result).contains("missing required argument: sql"));
    }

    assert_eq!(transport.invocations(), 0);
}

/// Same fail-fast contract for the schema tool.
#[tokio::test]
async fn test_schema_requires_table_name() {
    let transport = ScriptedTransport::new("{\"result\": 1}");
    let server = server_with(transport.clone());

    let result = call_tool(
        &server,
        json!({"name": "excel_get_table_schema", "arguments": {}}),
    )
    .await;

    assert!(is_error(&result));
    assert!(result_text(&result).contains("table_name"));
    assert_eq!(transport.invocations(), 0);

    let result = call_tool(
        &server,
        json!({"name": "excel_get_table_schema", "arguments": {"table_name": "sheet1"}}),
    )
    .await;
    assert!(!is_error(&result));
    let (request, _) = transport.last_seen().unwrap();
    assert_eq!(request.method, "get_create_table");
    assert_eq!(request.params.get("table"), Some(&json!("sheet1")));
}

/// Unknown tool names come back as failure results, not faults.
#[tokio::test]
async fn test_unknown_tool() {
    let transport = ScriptedTransport::new("");
    let server = server_with(transport.clone());

    let result = call_tool(&server, json!({"name": "excel_drop_tables", "arguments": {}})).await;

    assert!(is_error(&result));
    assert!(result_text(&result).contains("unknown tool: excel_drop_tables"));
    assert_eq!(transport.invocations(), 0);
}

/// The list-sheets alias hits the same engine method as show-tables.
#[tokio::test]
async fn test_list_sheets_alias() {
    let transport = ScriptedTransport::new("{\"result\": []}");
    let server = server_with(transport.clone());

    for tool in ["excel_show_tables", "excel_list_sheets"] {
        let result = call_tool(&server, json!({"name": tool, "arguments": {}})).await;
        assert!(!is_error(&result));
        let (request, _) = transport.last_seen().unwrap();
        assert_eq!(request.method, "get_tables");
        assert!(request.params.is_empty());
    }
    assert_eq!(transport.invocations(), 2);
}

// =============================================================================
// NORMALIZATION THROUGH THE FULL STACK
// =============================================================================

/// The non-standard {tool_name, args} envelope is remapped before
/// dispatch.
#[tokio::test]
async fn test_tool_name_envelope_through_server() {
    let transport = ScriptedTransport::new("{\"result\": \"ok\"}");
    let server = server_with(transport.clone());

    let result = call_tool(
        &server,
        json!({"server_name": "sheetlink", "tool_name": "excel_query", "args": {"sql": "SELECT 1"}}),
    )
    .await;

    assert!(!is_error(&result));
    let (request, _) = transport.last_seen().unwrap();
    assert_eq!(request.params.get("sql"), Some(&json!("SELECT 1")));
}

/// Arguments wrapped one level deep under a wrapper key are unwrapped.
#[tokio::test]
async fn test_wrapped_arguments_through_server() {
    let transport = ScriptedTransport::new("{\"result\": \"ok\"}");
    let server = server_with(transport.clone());

    for arguments in [
        json!({"args": {"sql": "SELECT 1"}}),
        json!({"parameters": {"sql": "SELECT 1"}}),
    ] {
        call_tool(
            &server,
            json!({"name": "excel_query", "arguments": arguments}),
        )
        .await;
        let (request, _) = transport.last_seen().unwrap();
        assert_eq!(request.params.get("sql"), Some(&json!("SELECT 1")));
    }
}

/// A per-call directory argument overrides the shared workbook
/// directory without persisting it.
#[tokio::test]
async fn test_directory_override_is_per_call() {
    let transport = ScriptedTransport::new("{\"result\": []}");
    let server = server_with(transport.clone());

    call_tool(
        &server,
        json!({"name": "excel_show_tables", "arguments": {"directory": "/data/books"}}),
    )
    .await;
    let (_, dir) = transport.last_seen().unwrap();
    assert_eq!(dir, PathBuf::from("/data/books"));

    call_tool(&server, json!({"name": "excel_show_tables", "arguments": {}})).await;
    let (_, dir) = transport.last_seen().unwrap();
    assert_eq!(dir, PathBuf::from("./XLSX"));
}

// =============================================================================
// DIRECTORY TOOLS
// =============================================================================

/// set_excel_directory validates, persists, and later calls pick the
/// new directory up.
#[tokio::test]
async fn test_set_directory_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new("{\"result\": []}");
    let server = server_with(transport.clone());

    let result = call_tool(
        &server,
        json!({"name": "set_excel_directory", "arguments": {"directory": tmp.path()}}),
    )
    .await;
    assert!(!is_error(&result));

    let result = call_tool(&server, json!({"name": "get_excel_directory", "arguments": {}})).await;
    assert_eq!(result_text(&result), tmp.path().to_str().unwrap());

    call_tool(&server, json!({"name": "excel_show_tables", "arguments": {}})).await;
    let (_, dir) = transport.last_seen().unwrap();
    assert_eq!(dir, tmp.path());
}

/// A nonexistent directory is rejected and the old value survives.
#[tokio::test]
async fn test_set_directory_rejects_missing() {
    let transport = ScriptedTransport::new("{\"result\": []}");
    let server = server_with(transport.clone());

    let result = call_tool(
        &server,
        json!({"name": "set_excel_directory", "arguments": {"directory": "/no/such/dir"}}),
    )
    .await;
    assert!(is_error(&result));

    let result = call_tool(&server, json!({"name": "get_excel_directory", "arguments": {}})).await;
    assert_eq!(result_text(&result), "./XLSX");
}

/// Without an argument, set_excel_directory reports instead of failing.
#[tokio::test]
async fn test_set_directory_without_argument_reports() {
    let transport = ScriptedTransport::new("");
    let server = server_with(transport);

    let result = call_tool(&server, json!({"name": "set_excel_directory", "arguments": {}})).await;
    assert!(!is_error(&result));
    assert!(result_text(&result).contains("./XLSX"));
}

// =============================================================================
// ENGINE FAILURE SURFACES
// =============================================================================

/// An engine error reply becomes an isError result with its message.
#[tokio::test]
async fn test_engine_error_reply() {
    let transport = ScriptedTransport::new("{\"error\": {\"message\": \"bad sql\"}}");
    let server = server_with(transport);

    let result = call_tool(
        &server,
        json!({"name": "excel_query", "arguments": {"sql": "SELEC"}}),
    )
    .await;

    assert!(is_error(&result));
    assert_eq!(result_text(&result), "bad sql");
}

/// Engine output with no JSON anywhere is surfaced verbatim as an
/// error.
#[tokio::test]
async fn test_raw_engine_output_surfaces_as_error() {
    let transport = ScriptedTransport::new("Unhandled exception: boom\n");
    let server = server_with(transport);

    let result = call_tool(&server, json!({"name": "excel_show_tables", "arguments": {}})).await;

    assert!(is_error(&result));
    assert!(result_text(&result).contains("Unhandled exception: boom"));
}

/// A silent engine maps to the no-response failure.
#[tokio::test]
async fn test_silent_engine() {
    let transport = ScriptedTransport::new("   \n");
    let server = server_with(transport);

    let result = call_tool(&server, json!({"name": "excel_show_tables", "arguments": {}})).await;

    assert!(is_error(&result));
    assert!(result_text(&result).contains("no response"));
}

// =============================================================================
// SERVER PLUMBING
// =============================================================================

/// initialize reports the tool capability and tools/list names all
/// seven tools.
#[tokio::test]
async fn test_initialize_then_list() {
    let transport = ScriptedTransport::new("");
    let server = server_with(transport);

    let response = server
        .handle_request(JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(RequestId::Number(0)),
            method: methods::INITIALIZE.to_string(),
            params: Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "0"},
            })),
        })
        .await
        .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["serverInfo"]["name"], "sheetlink");
    assert!(result["capabilities"]["tools"].is_object());

    let response = server
        .handle_request(JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(RequestId::Number(1)),
            method: methods::TOOLS_LIST.to_string(),
            params: None,
        })
        .await
        .unwrap();
    let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 7);
    assert!(tools.iter().any(|t| t["name"] == "excel_query"));
    assert!(tools
        .iter()
        .all(|t| t["inputSchema"]["type"] == "object"));
}

/// The initialized notification gets no response.
#[tokio::test]
async fn test_initialized_notification_is_silent() {
    let transport = ScriptedTransport::new("");
    let server = server_with(transport);

    let response = server
        .handle_request(JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: methods::INITIALIZED.to_string(),
            params: None,
        })
        .await;
    assert!(response.is_none());
}

/// Unknown methods with an id get a -32601 fault.
#[tokio::test]
async fn test_unknown_method() {
    let transport = ScriptedTransport::new("");
    let server = server_with(transport);

    let response = server
        .handle_request(JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(RequestId::Number(9)),
            method: "resources/list".to_string(),
            params: None,
        })
        .await
        .unwrap();
    assert_eq!(response.error.unwrap().code, -32601);
}
