//! Errors raised by bridge operations.
//!
//! Tools convert every one of these into a failure `ToolResult`; nothing
//! in this enum ever crosses the dispatcher boundary as a JSON-RPC fault.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// No candidate install location held the engine executable.
    /// Carries the last path probed.
    #[error("Excel SQL engine not found: {0}")]
    EngineNotFound(PathBuf),

    /// The engine did not exit within the configured bound. The process
    /// has already been killed and reaped when this is returned.
    #[error("engine did not respond within {0}s")]
    Timeout(u64),

    /// The engine exited without printing anything usable on stdout.
    #[error("engine produced no response")]
    NoResponse,

    /// A required tool argument was absent or empty after normalization.
    /// Raised before any process is spawned.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// The caller named a tool the registry does not know.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The reply shape was recognized but its payload was malformed,
    /// e.g. a content block without text.
    #[error("malformed engine reply: {0}")]
    Adaptation(String),

    #[error("engine I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
