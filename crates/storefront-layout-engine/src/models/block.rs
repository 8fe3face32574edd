use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single unit of renderable page content.
///
/// Blocks are the renderer-facing representation of a page: an ordered,
/// flat list of typed content entries (hero, banner, product grid, ...).
/// The editor never works on blocks directly — it works on a [`PageGraph`]
/// and the converter materializes a fresh block list for each render.
///
/// [`PageGraph`]: crate::models::PageGraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identifier, when the caller supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Block kind tag (e.g. "hero", "banner"). Must be registered before the
    /// block can be persisted; see [`crate::registry`].
    #[serde(rename = "type")]
    pub block_type: String,
    /// Absent means enabled. Disabled blocks are excluded from rendering and
    /// from serialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Render sequence among siblings. Absent sorts as 0, ties keep the
    /// original array position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Block-specific configuration, carried verbatim through conversion.
    #[serde(default)]
    pub props: Map<String, Value>,
    /// Presentational style keys. Opaque to the converter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<BTreeMap<String, String>>,
    /// Nested blocks, for composite kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Block>>,
}

impl Block {
    /// Create a block of the given kind with empty props.
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            id: None,
            block_type: block_type.into(),
            enabled: None,
            order: None,
            props: Map::new(),
            styles: None,
            children: None,
        }
    }

    /// Whether the block participates in rendering and serialization.
    /// Only an explicit `enabled: false` excludes it.
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    /// Sort key for sibling ordering; blocks without an explicit order sort
    /// as 0.
    pub fn sort_key(&self) -> i64 {
        self.order.unwrap_or(0)
    }
}
