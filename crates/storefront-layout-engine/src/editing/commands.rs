use serde_json::Value;

/// Commands that can be applied to the editing session's graph.
///
/// Each command corresponds to one discrete user action in the editor
/// (drop a new block, drag to reorder, change a settings field, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Insert a new block of the given registered type at `at` (clamped to
    /// the child count). `parent: None` targets the canvas container;
    /// composite blocks (e.g. a menu) take nested inserts by id.
    InsertBlock {
        block_type: String,
        parent: Option<String>,
        at: usize,
    },
    /// Remove a node and its whole subtree.
    RemoveNode { id: String },
    /// Move a node (with its subtree) under `new_parent` at position `at`.
    /// Covers both reorder within a parent and reparenting.
    MoveNode {
        id: String,
        new_parent: String,
        at: usize,
    },
    /// Set one prop value on a node.
    SetProp {
        id: String,
        key: String,
        value: Value,
    },
    /// Toggle a node's hidden flag.
    SetHidden { id: String, hidden: bool },
}
