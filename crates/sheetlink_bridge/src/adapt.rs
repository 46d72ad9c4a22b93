//! Engine reply adaptation.
//!
//! The engine's reply arrives in one of several shapes that accumulated
//! over its history: `{"result": ...}`, `{"error": {...}}`, the raw-text
//! fallback, a tuple-encoded result produced by an old serializer, or an
//! already well-formed content-block result. Each shape has a recognizer;
//! they are tried in priority order and the first match wins.
//!
//! Adaptation never fails outward. Whatever goes wrong in here becomes a
//! failure [`ToolResult`] carrying the message.

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// One unit of result payload returned to the caller. The bridge only
/// ever produces text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
        }
    }
}

/// The caller-facing result envelope.
///
/// Serializes as an MCP `CallToolResult`: `content`, `isError`, `_meta`,
/// `structuredContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,

    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl ToolResult {
    /// Successful result with one text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
            meta: None,
            structured_content: None,
        }
    }

    /// Failure result with one text block.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: true,
            meta: None,
            structured_content: None,
        }
    }
}

impl From<BridgeError> for ToolResult {
    fn from(err: BridgeError) -> Self {
        ToolResult::error(err.to_string())
    }
}

/// Render a JSON value the way callers want to read it: objects and
/// arrays pretty-printed, strings bare, everything else in literal form.
fn render(value: &Value) -> String {
    match value {
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Map an engine reply onto the caller-facing [`ToolResult`].
pub fn adapt_reply(reply: &Value) -> ToolResult {
    match try_adapt(reply) {
        Ok(result) => result,
        Err(e) => {
            warn!("Reply adaptation failed: {e}");
            ToolResult::error(e.to_string())
        }
    }
}

fn try_adapt(reply: &Value) -> Result<ToolResult, BridgeError> {
    let map = match reply.as_object() {
        Some(map) => map,
        None => return Ok(ToolResult::text(render(reply))),
    };

    if let Some(result) = map.get("result") {
        debug!("Engine reply shape: result");
        return Ok(ToolResult::text(render(result)));
    }

    if let Some(error) = map.get("error") {
        debug!("Engine reply shape: error");
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Ok(ToolResult::error(message));
    }

    if let Some(raw) = map.get("raw_response") {
        // The extractor could not understand the engine's output, so the
        // bridge cannot vouch for the call having worked.
        debug!("Engine reply shape: raw fallback");
        let text = raw.as_str().map(str::to_owned).unwrap_or_else(|| render(raw));
        return Ok(ToolResult::error(text));
    }

    if let Some(content) = map.get("content").and_then(Value::as_array) {
        if content.first().map(is_pair).unwrap_or(false) {
            debug!("Engine reply shape: tuple-encoded");
            return adapt_tuple_encoded(content);
        }

        debug!("Engine reply shape: content blocks");
        let blocks = content
            .iter()
            .map(normalize_block)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(ToolResult {
            content: blocks,
            is_error: map.get("isError").and_then(Value::as_bool).unwrap_or(false),
            meta: map.get("meta").cloned(),
            structured_content: map.get("structuredContent").cloned(),
        });
    }

    debug!("Engine reply shape: unrecognized, wrapping verbatim");
    Ok(ToolResult::text(render(reply)))
}

fn is_pair(value: &Value) -> bool {
    value.as_array().map(|a| a.len() == 2).unwrap_or(false)
}

/// Unpack the legacy tuple encoding: `content` is a list of
/// `[key, value]` pairs carrying the real `meta`/`content`/
/// `structuredContent`/`isError` fields.
fn adapt_tuple_encoded(pairs: &[Value]) -> Result<ToolResult, BridgeError> {
    let mut meta = None;
    let mut structured_content = None;
    let mut is_error = false;
    let mut inner_content: Option<&Value> = None;

    for pair in pairs {
        let Some(pair) = pair.as_array().filter(|a| a.len() == 2) else {
            continue;
        };
        let (key, value) = (&pair[0], &pair[1]);
        match key.as_str() {
            Some("meta") => meta = Some(value.clone()),
            Some("content") => inner_content = Some(value),
            Some("structuredContent") => structured_content = Some(value.clone()),
            Some("isError") => is_error = value.as_bool().unwrap_or(false),
            _ => {}
        }
    }

    let blocks = match inner_content {
        Some(Value::Array(items)) => items
            .iter()
            .map(normalize_block)
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(BridgeError::Adaptation(format!(
                "tuple-encoded content is not a list: {other}"
            )))
        }
        None => Vec::new(),
    };

    Ok(ToolResult {
        content: blocks,
        is_error,
        meta: meta.filter(|m| !m.is_null()),
        structured_content: structured_content.filter(|s| !s.is_null()),
    })
}

/// Coerce one content item into the canonical text block.
fn normalize_block(item: &Value) -> Result<ContentBlock, BridgeError> {
    match item {
        Value::Object(map) if map.contains_key("type") => {
            match (map.get("type").and_then(Value::as_str), map.get("text")) {
                (Some("text"), Some(Value::String(text))) => Ok(ContentBlock::text(text.clone())),
                _ => Err(BridgeError::Adaptation(format!(
                    "malformed content block: {item}"
                ))),
            }
        }
        Value::String(s) => Ok(ContentBlock::text(s.clone())),
        other => Ok(ContentBlock::text(other.to_string())),
    }
}
