//! Canonicalization of raw node-graph documents before persistence.
//!
//! An editing session accumulates bookkeeping the renderer never needs:
//! display names, default-valued flags, empty editor metadata. [`optimize`]
//! rebuilds every node record keeping only the fields required to re-render
//! the page, which makes the persisted document smaller and diff-stable.
//!
//! The pass is idempotent, never grows the serialized document, and is
//! invisible to the converter: deserializing the optimized graph yields the
//! same block list as deserializing the input.

use serde_json::{Map, Value};

use crate::models::ROOT_ID;

/// Produce the minimal graph equivalent to `raw` for rendering purposes.
///
/// Operates on raw JSON rather than the typed model so documents written by
/// older editors, with fields this engine no longer models, still shrink to
/// the canonical shape. Non-object inputs are returned unchanged; entries
/// whose value is not an object are passed through untouched.
pub fn optimize(raw: &Value) -> Value {
    let Some(nodes) = raw.as_object() else {
        return raw.clone();
    };

    let mut out = Map::new();
    for (id, value) in nodes {
        match value.as_object() {
            Some(node) => {
                out.insert(id.clone(), Value::Object(optimize_node(id, node)));
            }
            None => {
                out.insert(id.clone(), value.clone());
            }
        }
    }
    Value::Object(out)
}

/// Rebuild one node record with only the fields that matter for rendering.
fn optimize_node(id: &str, node: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();

    // type: always required.
    if let Some(node_type) = node.get("type") {
        out.insert("type".to_string(), node_type.clone());
    }

    // props and nodes are retained even when empty: an empty props map is
    // different data than a missing one, and an empty child list marks a
    // leaf rather than an unexpanded container.
    out.insert(
        "props".to_string(),
        node.get("props").cloned().unwrap_or(Value::Object(Map::new())),
    );
    out.insert(
        "nodes".to_string(),
        node.get("nodes").cloned().unwrap_or(Value::Array(Vec::new())),
    );

    if let Some(linked) = node.get("linkedNodes").and_then(Value::as_object)
        && !linked.is_empty()
    {
        out.insert("linkedNodes".to_string(), Value::Object(linked.clone()));
    }

    if id != ROOT_ID
        && let Some(parent) = node.get("parent")
        && !parent.is_null()
    {
        out.insert("parent".to_string(), parent.clone());
    }

    // displayName is editor-only and recomputable from the type; dropped.

    if let Some(custom) = node.get("custom").and_then(Value::as_object)
        && custom.values().any(is_meaningful)
    {
        out.insert("custom".to_string(), Value::Object(custom.clone()));
    }

    if node.get("hidden").and_then(Value::as_bool) == Some(true) {
        out.insert("hidden".to_string(), Value::Bool(true));
    }

    // ROOT's canvas status is structurally implied.
    if id != ROOT_ID && node.get("isCanvas").and_then(Value::as_bool) == Some(true) {
        out.insert("isCanvas".to_string(), Value::Bool(true));
    }

    out
}

/// Whether a `custom` entry is worth keeping. Nulls and empty strings are
/// editor placeholders.
fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Size report for one optimization run. Sizes are serialized JSON string
/// lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeStats {
    pub original_len: usize,
    pub optimized_len: usize,
    pub saved: usize,
    pub saved_percent: f64,
}

/// Optimize `raw` and report how much the serialized document shrank.
pub fn stats(raw: &Value) -> OptimizeStats {
    let original_len = raw.to_string().len();
    let optimized_len = optimize(raw).to_string().len();
    let saved = original_len.saturating_sub(optimized_len);
    let saved_percent = if original_len == 0 {
        0.0
    } else {
        saved as f64 * 100.0 / original_len as f64
    };
    OptimizeStats {
        original_len,
        optimized_len,
        saved,
        saved_percent,
    }
}
