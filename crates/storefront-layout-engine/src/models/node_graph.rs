use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved id of the graph root. The root is the only node without a parent.
pub const ROOT_ID: &str = "ROOT";

/// Id of the canvas container synthesized under `ROOT`. Its ordered children
/// are the page's top-level blocks.
pub const CANVAS_ID: &str = "canvas";

/// Resolved name used for the structural `ROOT` and canvas nodes. Deliberately
/// not a registered block kind: the converter never emits these as blocks.
pub const CONTAINER_RESOLVED_NAME: &str = "div";

/// Kind identifier of a node in the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    #[serde(rename = "resolvedName")]
    pub resolved_name: String,
}

impl NodeType {
    pub fn new(resolved_name: impl Into<String>) -> Self {
        Self {
            resolved_name: resolved_name.into(),
        }
    }
}

/// A single record in the node graph.
///
/// Serde attributes match the persisted wire format, so serializing a `Node`
/// already omits default-valued optional fields. The [`crate::optimize`]
/// module applies the same rules to raw JSON documents produced by older
/// editor sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Required even when empty: distinguishes "no props" from "field omitted".
    #[serde(default)]
    pub props: Map<String, Value>,
    /// Ordered child ids. Required even when empty.
    #[serde(default)]
    pub nodes: Vec<String>,
    /// Named-slot child references for fixed sub-regions.
    #[serde(
        rename = "linkedNodes",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub linked_nodes: BTreeMap<String, String>,
    /// Structural parent. Present for every node except `ROOT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Editor-only human label. Stripped by the optimizer.
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Arbitrary editor metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(rename = "isCanvas", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_canvas: bool,
}

impl Node {
    /// Create a leaf node of the given resolved name with empty props.
    pub fn new(resolved_name: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::new(resolved_name),
            props: Map::new(),
            nodes: Vec::new(),
            linked_nodes: BTreeMap::new(),
            parent: None,
            display_name: None,
            custom: None,
            hidden: false,
            is_canvas: false,
        }
    }
}

/// The editor-facing page representation: a flat arena of nodes keyed by id,
/// forming a tree rooted at [`ROOT_ID`].
///
/// Relationships are expressed purely as id lookups (`nodes`, `linkedNodes`,
/// `parent`), never as in-memory references, so the converter and optimizer
/// can treat the structure as plain data and the whole graph serializes
/// directly to the persisted JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageGraph {
    nodes: BTreeMap<String, Node>,
}

impl PageGraph {
    /// An empty graph with no nodes at all. Mostly useful as a parse target;
    /// a renderable page needs at least `ROOT` and a canvas container.
    pub fn empty() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// A fresh page: `ROOT` owning a single empty canvas container. This is
    /// the graph a new editing session starts from.
    pub fn new_page() -> Self {
        let mut root = Node::new(CONTAINER_RESOLVED_NAME);
        root.nodes.push(CANVAS_ID.to_string());

        let mut canvas = Node::new(CONTAINER_RESOLVED_NAME);
        canvas.parent = Some(ROOT_ID.to_string());
        canvas.is_canvas = true;

        let mut graph = Self::empty();
        graph.insert(ROOT_ID, root);
        graph.insert(CANVAS_ID, canvas);
        graph
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, node: Node) {
        self.nodes.insert(id.into(), node);
    }

    pub fn remove(&mut self, id: &str) -> Option<Node> {
        self.nodes.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(ROOT_ID)
    }

    /// Id of the canvas container: the root's single designated child.
    pub fn canvas_id(&self) -> Option<&str> {
        self.root()?.nodes.first().map(String::as_str)
    }

    /// Ids of every node in the subtree below `id` (children first seen in
    /// list order, then named slots), excluding `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut pending = vec![id.to_string()];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.get(&current) {
                for child in node.nodes.iter().chain(node.linked_nodes.values()) {
                    out.push(child.clone());
                    pending.push(child.clone());
                }
            }
        }
        out
    }
}
