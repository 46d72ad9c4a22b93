//! Lenient request normalization.
//!
//! IDE agents wrap tool calls in a handful of wrong-but-recoverable
//! shapes: arguments nested under `args`/`parameters`/`params`/
//! `arguments`, or the whole call envelope written as
//! `{tool_name, args}` instead of `{name, arguments}`. Each known
//! mistake gets a recognizer; recognizers run in priority order and the
//! first match wins, so each rule stays independently testable.

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Keys callers mistakenly nest the real arguments under.
const WRAPPER_KEYS: &[&str] = &["parameters", "params", "arguments"];

/// A tool call as the dispatcher wants it: a name and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

/// Undo known argument-wrapping mistakes.
///
/// Rules in order, first match wins:
/// 1. empty or not an object → empty map
/// 2. an `args` key holding an object → that object (one level only)
/// 3. exactly one key, it is a wrapper key, its value is an object →
///    that object
/// 4. anything else → unchanged
///
/// Idempotent: a normalized map normalizes to itself. An honest
/// parameter named `args` holding a non-object value falls through to
/// rule 4 untouched.
pub fn normalize_arguments(raw: &Value) -> Map<String, Value> {
    let map = match raw.as_object() {
        Some(map) if !map.is_empty() => map,
        _ => return Map::new(),
    };

    if let Some(Value::Object(inner)) = map.get("args") {
        debug!("Unwrapping arguments nested under 'args'");
        return inner.clone();
    }

    if map.len() == 1 {
        if let Some((key, Value::Object(inner))) = map.iter().next() {
            if WRAPPER_KEYS.contains(&key.as_str()) {
                debug!("Unwrapping arguments nested under '{key}'");
                return inner.clone();
            }
        }
    }

    map.clone()
}

/// Normalize the top-level call envelope into a [`ToolCall`].
///
/// Accepts the standard `{name, arguments}` shape, the non-standard
/// `{tool_name, args}` shape (with or without an informational
/// `server_name`, which is discarded), and falls back to treating the
/// whole envelope as the arguments of an unnamed tool.
pub fn normalize_envelope(params: Option<&Value>) -> ToolCall {
    let map = match params.and_then(Value::as_object) {
        Some(map) if !map.is_empty() => map,
        _ => {
            warn!("Empty tool call envelope");
            return ToolCall {
                name: String::new(),
                arguments: Value::Object(Map::new()),
            };
        }
    };

    if map.contains_key("name") && map.contains_key("arguments") {
        return ToolCall {
            name: map
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            arguments: object_or_empty(map.get("arguments")),
        };
    }

    if map.contains_key("tool_name") && map.contains_key("args") {
        debug!("Remapping non-standard envelope {{tool_name, args}}");
        return ToolCall {
            name: map
                .get("tool_name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            arguments: object_or_empty(map.get("args")),
        };
    }

    warn!("Unrecognized tool call envelope shape, treating it as arguments");
    ToolCall {
        name: String::new(),
        arguments: Value::Object(map.clone()),
    }
}

fn object_or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(Map::new()),
    }
}
