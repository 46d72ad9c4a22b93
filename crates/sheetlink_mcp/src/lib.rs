//! MCP server bridging IDE agents to the Excel SQL engine.
//!
//! ```text
//! agent ──JSON-RPC/stdio──▶ server ──▶ envelope + argument
//!                                      normalization
//!                                        │
//!                                        ▼
//!                                  tool dispatch ──▶ engine process
//!                                        ▲            (sheetlink_bridge)
//!                                        │
//!                              result adaptation ◀── stdout scan
//! ```
//!
//! The server exposes seven tools: table discovery
//! (`excel_show_tables`, `excel_list_sheets`), SQL (`excel_query`),
//! schema lookup (`excel_get_table_schema`), cache refresh
//! (`excel_refresh_cache`), and the workbook directory pair
//! (`set_excel_directory`, `get_excel_directory`).
//!
//! Design rules carried throughout:
//!
//! 1. **Lenient in, strict out.** Known caller mistakes (wrapped
//!    arguments, renamed envelope keys) are undone on the way in; what
//!    goes back out is always a well-formed result envelope.
//! 2. **Failures are results.** A tool failure, an unknown tool, a
//!    missing argument, a dead engine: all come back as `isError`
//!    results, never as JSON-RPC faults.
//! 3. **One child per call, always reaped.** No pooling, no retries.

pub mod config;
pub mod normalize;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::{ServerConfig, WorkbookDir};
pub use normalize::{normalize_arguments, normalize_envelope, ToolCall};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use server::McpServer;
pub use tools::{ToolContext, ToolRegistry};
