//! The engine side of Sheetlink.
//!
//! Everything that touches the external Excel SQL engine lives here:
//!
//! - [`locate`] — probes the candidate install locations for the engine
//!   executable.
//! - [`transport`] — spawns one engine process per call, writes the
//!   request line, enforces the timeout, and collects decoded output.
//! - [`extract`] — digs the single JSON reply out of whatever the engine
//!   printed around it.
//! - [`adapt`] — maps the reply shapes onto the caller-facing
//!   [`ToolResult`].
//!
//! The chain is `transport → extract → adapt`; the MCP layer composes it
//! per tool call. No step retries: a failed or timed-out invocation is
//! surfaced, never replayed.

pub mod adapt;
pub mod error;
pub mod extract;
pub mod locate;
pub mod transport;

pub use adapt::{adapt_reply, ContentBlock, ToolResult};
pub use error::BridgeError;
pub use extract::extract_reply;
pub use locate::{default_install_root, locate_engine};
pub use transport::{ChildProcessTransport, EngineTransport, RawEngineOutput};
