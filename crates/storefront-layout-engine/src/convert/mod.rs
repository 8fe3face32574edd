//! Bidirectional conversion between the flat [`Block`] list and the
//! persisted node graph.
//!
//! The two directions have deliberately different failure behavior:
//!
//! - **Graph → blocks** (load/render path) never fails. A structurally
//!   invalid document degrades to an empty page, and nodes whose kind this
//!   engine does not recognize are skipped, so a document written by a newer
//!   editor still renders everything it can.
//! - **Blocks → graph** (persist path) is strict. Persisting a block whose
//!   type cannot be round-tripped would be silent data loss, so an
//!   unregistered type aborts the whole serialization with
//!   [`RegistryError::UnknownBlockType`].

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Block, CANVAS_ID, Node, PageGraph};
use crate::registry::{self, RegistryError};

/// Why a persisted document could not be interpreted as a page.
///
/// Recovered locally by [`deserialize`]; exposed so callers that want the
/// reason (diagnostics, tooling) can use [`try_deserialize`] instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedDocument {
    #[error("document is not valid JSON: {0}")]
    Json(String),
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("document has no ROOT node")]
    MissingRoot,
    #[error("ROOT has no canvas container")]
    MissingCanvas,
}

/// Turn a persisted JSON document into the ordered block list for rendering.
///
/// Never fails: a corrupt document renders as an empty page rather than an
/// error screen. The degrade is logged at warn level.
pub fn deserialize(document: &str) -> Vec<Block> {
    match try_deserialize(document) {
        Ok(blocks) => blocks,
        Err(err) => {
            warn!(%err, "malformed page document, rendering as empty page");
            Vec::new()
        }
    }
}

/// Fallible variant of [`deserialize`], reporting why the document was
/// rejected instead of degrading.
pub fn try_deserialize(document: &str) -> Result<Vec<Block>, MalformedDocument> {
    let raw: Value =
        serde_json::from_str(document).map_err(|err| MalformedDocument::Json(err.to_string()))?;
    let graph = graph_from_value(&raw)?;
    blocks_from_graph(&graph)
}

/// Parse a raw JSON value into a typed graph, skipping entries that do not
/// parse as node records. Per-node tolerance keeps one damaged record from
/// taking down the rest of the page.
fn graph_from_value(raw: &Value) -> Result<PageGraph, MalformedDocument> {
    let object = raw.as_object().ok_or(MalformedDocument::NotAnObject)?;
    let mut graph = PageGraph::empty();
    for (id, value) in object {
        match serde_json::from_value::<Node>(value.clone()) {
            Ok(node) => graph.insert(id.clone(), node),
            Err(err) => {
                debug!(node_id = %id, %err, "skipping unparsable node record");
            }
        }
    }
    Ok(graph)
}

/// Materialize the ordered block list from a typed graph.
///
/// Walks the canvas container's children in list order. Nodes whose resolved
/// name is not registered are dropped, never substituted with a placeholder;
/// the `order` assigned to each emitted block is its emission index, so
/// orders are contiguous and strictly increasing.
pub fn blocks_from_graph(graph: &PageGraph) -> Result<Vec<Block>, MalformedDocument> {
    let root = graph.root().ok_or(MalformedDocument::MissingRoot)?;
    let canvas_id = root.nodes.first().ok_or(MalformedDocument::MissingCanvas)?;
    let canvas = graph
        .get(canvas_id)
        .ok_or(MalformedDocument::MissingCanvas)?;

    let mut blocks = Vec::new();
    for child_id in &canvas.nodes {
        let Some(node) = graph.get(child_id) else {
            debug!(node_id = %child_id, "skipping dangling child reference");
            continue;
        };
        let Some(tag) = registry::block_type_for(&node.node_type.resolved_name) else {
            debug!(
                node_id = %child_id,
                resolved_name = %node.node_type.resolved_name,
                "skipping node of unrecognized kind"
            );
            continue;
        };
        blocks.push(Block {
            enabled: Some(true),
            order: Some(blocks.len() as i64),
            props: node.props.clone(),
            ..Block::new(tag)
        });
    }
    Ok(blocks)
}

/// Serialize a block list into the persisted JSON document.
///
/// Strict on unknown types; see the module docs.
pub fn serialize(blocks: &[Block]) -> Result<String, RegistryError> {
    let graph = graph_from_blocks(blocks)?;
    // String-keyed maps of JSON values; encoding cannot fail.
    Ok(serde_json::to_string(&graph).expect("node graph encodes as JSON"))
}

/// Build a fresh node graph from a block list.
///
/// Disabled blocks are excluded, the rest are stable-sorted by `order`
/// (missing order sorts as 0), and each becomes a child of a synthesized
/// canvas container. Node ids are derived from the block's type tag and its
/// sorted position, so repeated conversions of the same input produce
/// byte-identical, diffable output.
pub fn graph_from_blocks(blocks: &[Block]) -> Result<PageGraph, RegistryError> {
    let mut enabled: Vec<&Block> = blocks.iter().filter(|block| block.is_enabled()).collect();
    enabled.sort_by_key(|block| block.sort_key());

    let mut graph = PageGraph::new_page();
    for (index, block) in enabled.iter().enumerate() {
        let resolved_name = registry::resolved_name_for(&block.block_type)?;
        let id = format!("{}-{}", block.block_type, index);

        let mut node = Node::new(resolved_name);
        node.props = block.props.clone();
        node.parent = Some(CANVAS_ID.to_string());
        node.display_name = Some(resolved_name.to_string());
        graph.insert(id.clone(), node);

        // Canvas is always present here, new_page built it.
        if let Some(canvas) = graph.get_mut(CANVAS_ID) {
            canvas.nodes.push(id);
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn block(tag: &str, order: i64, props: Value) -> Block {
        Block {
            order: Some(order),
            props: props.as_object().cloned().unwrap_or_default(),
            ..Block::new(tag)
        }
    }

    #[test]
    fn serialize_builds_root_canvas_and_children() {
        let blocks = vec![
            block("hero", 0, json!({"title": "A"})),
            block("text", 1, json!({"body": "hi"})),
        ];
        let graph = graph_from_blocks(&blocks).unwrap();

        assert_eq!(graph.root().unwrap().nodes, vec![CANVAS_ID.to_string()]);
        let canvas = graph.get(CANVAS_ID).unwrap();
        assert_eq!(canvas.nodes, vec!["hero-0".to_string(), "text-1".to_string()]);

        let hero = graph.get("hero-0").unwrap();
        assert_eq!(hero.node_type.resolved_name, "Hero");
        assert_eq!(hero.parent.as_deref(), Some(CANVAS_ID));
        assert_eq!(hero.display_name.as_deref(), Some("Hero"));
        assert_eq!(hero.props, json!({"title": "A"}).as_object().cloned().unwrap());
    }

    #[test]
    fn serialize_excludes_disabled_blocks() {
        let blocks = vec![
            block("hero", 0, json!({})),
            Block {
                enabled: Some(false),
                ..block("banner", 1, json!({"image": "x.png"}))
            },
            block("text", 2, json!({})),
        ];
        let graph = graph_from_blocks(&blocks).unwrap();
        let canvas = graph.get(CANVAS_ID).unwrap();
        assert_eq!(canvas.nodes, vec!["hero-0".to_string(), "text-1".to_string()]);
    }

    #[test]
    fn serialize_sorts_by_order_with_stable_ties() {
        let blocks = vec![
            block("text", 5, json!({"body": "last"})),
            block("hero", 0, json!({})),
            // No order sorts as 0 and keeps its position relative to hero.
            Block {
                order: None,
                ..block("banner", 0, json!({}))
            },
        ];
        let graph = graph_from_blocks(&blocks).unwrap();
        let canvas = graph.get(CANVAS_ID).unwrap();
        assert_eq!(
            canvas.nodes,
            vec![
                "hero-0".to_string(),
                "banner-1".to_string(),
                "text-2".to_string()
            ]
        );
    }

    #[test]
    fn serialize_rejects_unknown_block_type() {
        let blocks = vec![block("hero", 0, json!({})), block("no-such-kind", 1, json!({}))];
        assert_eq!(
            serialize(&blocks),
            Err(RegistryError::UnknownBlockType("no-such-kind".to_string()))
        );
    }

    #[test]
    fn disabled_block_of_unknown_type_does_not_block_the_save() {
        let blocks = vec![Block {
            enabled: Some(false),
            ..Block::new("no-such-kind")
        }];
        assert!(serialize(&blocks).is_ok());
    }

    #[test]
    fn deserialize_walks_canvas_children_in_order() {
        let document = json!({
            "ROOT": {"type": {"resolvedName": "div"}, "props": {}, "nodes": ["canvas"]},
            "canvas": {
                "type": {"resolvedName": "div"},
                "props": {},
                "nodes": ["hero-0", "text-1"],
                "parent": "ROOT",
                "isCanvas": true
            },
            "hero-0": {
                "type": {"resolvedName": "Hero"},
                "props": {"title": "A"},
                "nodes": [],
                "parent": "canvas"
            },
            "text-1": {
                "type": {"resolvedName": "Text"},
                "props": {"body": "hi"},
                "nodes": [],
                "parent": "canvas"
            }
        })
        .to_string();

        let blocks = deserialize(&document);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].block_type, "hero");
        assert_eq!(blocks[0].order, Some(0));
        assert_eq!(blocks[0].enabled, Some(true));
        assert_eq!(blocks[1].block_type, "text");
        assert_eq!(blocks[1].order, Some(1));
        assert_eq!(
            blocks[1].props,
            json!({"body": "hi"}).as_object().cloned().unwrap()
        );
    }

    #[test]
    fn deserialize_skips_unrecognized_kinds() {
        let document = json!({
            "ROOT": {"type": {"resolvedName": "div"}, "props": {}, "nodes": ["canvas"]},
            "canvas": {
                "type": {"resolvedName": "div"},
                "props": {},
                "nodes": ["hero-0", "mystery-1", "text-2"],
                "parent": "ROOT"
            },
            "hero-0": {"type": {"resolvedName": "Hero"}, "props": {}, "nodes": [], "parent": "canvas"},
            "mystery-1": {"type": {"resolvedName": "FancyNewKind"}, "props": {}, "nodes": [], "parent": "canvas"},
            "text-2": {"type": {"resolvedName": "Text"}, "props": {}, "nodes": [], "parent": "canvas"}
        })
        .to_string();

        let blocks = deserialize(&document);
        let tags: Vec<&str> = blocks.iter().map(|b| b.block_type.as_str()).collect();
        assert_eq!(tags, vec!["hero", "text"]);
        // Orders stay contiguous after the skip.
        assert_eq!(blocks[0].order, Some(0));
        assert_eq!(blocks[1].order, Some(1));
    }

    #[test]
    fn deserialize_tolerates_invalid_json() {
        assert_eq!(deserialize("{not valid json"), Vec::<Block>::new());
    }

    #[test]
    fn deserialize_tolerates_missing_root_structure() {
        assert_eq!(deserialize("{}"), Vec::<Block>::new());
        assert_eq!(deserialize("[1, 2, 3]"), Vec::<Block>::new());
        assert_eq!(
            deserialize(&json!({"ROOT": {"type": {"resolvedName": "div"}, "props": {}, "nodes": []}}).to_string()),
            Vec::<Block>::new()
        );
    }

    #[test]
    fn try_deserialize_reports_the_reason() {
        assert_eq!(try_deserialize("{}"), Err(MalformedDocument::MissingRoot));
        assert!(matches!(
            try_deserialize("{not valid json"),
            Err(MalformedDocument::Json(_))
        ));
        assert_eq!(
            try_deserialize("[1, 2, 3]"),
            Err(MalformedDocument::NotAnObject)
        );
    }

    #[test]
    fn deserialize_skips_dangling_child_references() {
        let document = json!({
            "ROOT": {"type": {"resolvedName": "div"}, "props": {}, "nodes": ["canvas"]},
            "canvas": {
                "type": {"resolvedName": "div"},
                "props": {},
                "nodes": ["gone", "hero-0"],
                "parent": "ROOT"
            },
            "hero-0": {"type": {"resolvedName": "Hero"}, "props": {}, "nodes": [], "parent": "canvas"}
        })
        .to_string();

        let blocks = deserialize(&document);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_type, "hero");
    }
}
