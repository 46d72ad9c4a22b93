//! Reply extraction from raw engine stdout.
//!
//! The engine interleaves log lines with its reply, and the reply itself
//! may be pretty-printed across many lines. A single-line `{`/`}` match
//! misses those, so we track brace balance across accumulated lines and
//! try to parse whenever the count returns to zero. Braces inside string
//! literals can skew the count; the parse-failure recovery below keeps a
//! later complete object in play.

use crate::error::BridgeError;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Number of `{` minus number of `}` in `line`.
fn brace_delta(line: &str) -> i64 {
    let opens = line.matches('{').count() as i64;
    let closes = line.matches('}').count() as i64;
    opens - closes
}

/// Scan `stdout_text` for the first parseable JSON object.
///
/// Returns the parsed value, or `{"raw_response": <stdout>}` when stdout
/// was non-empty but held no parseable object, or
/// [`BridgeError::NoResponse`] when it was blank.
pub fn extract_reply(stdout_text: &str) -> Result<Value, BridgeError> {
    let mut buffer = String::new();
    let mut in_object = false;
    let mut balance: i64 = 0;

    for line in stdout_text.lines() {
        let line = line.trim();

        if !in_object {
            if !line.starts_with('{') {
                continue;
            }
            in_object = true;
            buffer.clear();
            buffer.push_str(line);
            balance = brace_delta(line);
        } else {
            buffer.push('\n');
            buffer.push_str(line);
            balance += brace_delta(line);
        }

        if balance == 0 {
            match serde_json::from_str::<Value>(&buffer) {
                Ok(value) => {
                    debug!("Extracted engine reply ({} bytes)", buffer.len());
                    return Ok(value);
                }
                Err(e) => {
                    // Balanced but not JSON. Drop it and keep scanning for
                    // the next opening brace.
                    debug!("Discarding balanced non-JSON block: {e}");
                    in_object = false;
                    buffer.clear();
                    balance = 0;
                }
            }
        }
    }

    if !stdout_text.trim().is_empty() {
        warn!("No JSON object in engine output, falling back to raw text");
        return Ok(json!({ "raw_response": stdout_text }));
    }

    Err(BridgeError::NoResponse)
}
