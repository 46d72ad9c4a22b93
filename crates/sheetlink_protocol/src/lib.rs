//! Wire protocol between Sheetlink and the Excel SQL engine.
//!
//! The engine is a standalone executable. Each invocation receives the
//! workbook directory as its only command-line argument, reads one JSON
//! request line plus a `quit` line from stdin, and prints a JSON reply
//! somewhere on stdout. This crate holds the request types and the
//! constants both sides agree on; everything about *interpreting* the
//! reply lives in `sheetlink_bridge`.

pub mod defaults;
pub mod types;

pub use types::{methods, EngineRequest};
