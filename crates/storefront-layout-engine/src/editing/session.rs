use std::collections::VecDeque;
use std::mem;

use thiserror::Error;

use crate::convert;
use crate::models::{Block, Node, PageGraph, ROOT_ID};
use crate::optimize;
use crate::registry::{self, RegistryError};

use super::{Cmd, Patch};

/// Undo history depth. Oldest snapshots are dropped beyond this.
const MAX_HISTORY: usize = 64;

/// Why a command was refused. The session's graph is untouched whenever one
/// of these is returned; containment violations in particular are an
/// expected, frequent outcome of drag gestures, not an exceptional state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("unknown block type: {0}")]
    UnknownBlockType(String),
    #[error("no such node: {0}")]
    UnknownNode(String),
    #[error("a {child} cannot be placed inside a {parent}")]
    ContainmentViolation { parent: String, child: String },
    #[error("node {0} is structural and cannot be removed or moved")]
    StructuralNode(String),
    #[error("moving {0} into its own subtree would create a cycle")]
    WouldCreateCycle(String),
}

impl From<RegistryError> for EditError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownBlockType(tag) => EditError::UnknownBlockType(tag),
        }
    }
}

/// A single-threaded editing session owning one page graph.
///
/// The session is the only holder of the live graph; rendering and
/// persistence both go through materialized snapshots ([`Self::blocks`],
/// [`Self::to_persisted_json`]). History is a bounded linear stack of prior
/// graph snapshots; a new forward edit clears the redo side.
#[derive(Debug)]
pub struct EditSession {
    graph: PageGraph,
    undo_stack: VecDeque<PageGraph>,
    redo_stack: Vec<PageGraph>,
    version: u64,
}

impl EditSession {
    /// Open a fresh, empty page: `ROOT` plus an empty canvas container.
    pub fn new() -> Self {
        Self::from_graph(PageGraph::new_page())
    }

    /// Load an external page definition into the editor.
    pub fn from_blocks(blocks: &[Block]) -> Result<Self, EditError> {
        Ok(Self::from_graph(convert::graph_from_blocks(blocks)?))
    }

    /// Adopt an existing graph, e.g. one parsed from a persisted document.
    pub fn from_graph(graph: PageGraph) -> Self {
        Self {
            graph,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            version: 0,
        }
    }

    pub fn graph(&self) -> &PageGraph {
        &self.graph
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Immutable render snapshot of the current graph. A session graph is
    /// well-formed by construction, so a conversion failure degrades to an
    /// empty page the same way the load path does.
    pub fn blocks(&self) -> Vec<Block> {
        convert::blocks_from_graph(&self.graph).unwrap_or_default()
    }

    /// Canonical JSON for the save transport: a serialized snapshot of the
    /// graph with the optimizer applied. The session performs no I/O.
    pub fn to_persisted_json(&self) -> serde_json::Result<String> {
        let raw = serde_json::to_value(&self.graph)?;
        Ok(optimize::optimize(&raw).to_string())
    }

    /// Validate and apply one command.
    ///
    /// The command runs against a working copy; only a fully successful
    /// command replaces the session's graph, so rejection is atomic. On
    /// success the previous graph joins the undo history and redo history
    /// is discarded.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditError> {
        let mut next = self.graph.clone();
        let changed = apply_to_graph(&mut next, cmd)?;
        let previous = mem::replace(&mut self.graph, next);
        self.remember(previous);
        self.redo_stack.clear();
        self.version += 1;
        Ok(Patch {
            changed,
            version: self.version,
        })
    }

    /// Restore the previous snapshot. Returns false when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop_back() {
            Some(previous) => {
                let current = mem::replace(&mut self.graph, previous);
                self.redo_stack.push(current);
                self.version += 1;
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone snapshot. Returns false when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let current = mem::replace(&mut self.graph, next);
                self.undo_stack.push_back(current);
                self.version += 1;
                true
            }
            None => false,
        }
    }

    fn remember(&mut self, snapshot: PageGraph) {
        if self.undo_stack.len() == MAX_HISTORY {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(snapshot);
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute a command against a graph, returning the ids it touched.
/// Errors leave `graph` in an unspecified state; callers apply commands to a
/// working copy and commit only on success.
fn apply_to_graph(graph: &mut PageGraph, cmd: Cmd) -> Result<Vec<String>, EditError> {
    match cmd {
        Cmd::InsertBlock {
            block_type,
            parent,
            at,
        } => {
            let resolved_name = registry::resolved_name_for(&block_type)?;
            let parent_id = match parent {
                Some(id) => id,
                None => graph
                    .canvas_id()
                    .map(str::to_string)
                    .ok_or_else(|| EditError::UnknownNode("canvas".to_string()))?,
            };
            let parent_resolved = graph
                .get(&parent_id)
                .map(|node| node.node_type.resolved_name.clone())
                .ok_or_else(|| EditError::UnknownNode(parent_id.clone()))?;
            if !registry::can_attach(&parent_resolved, &[resolved_name]) {
                return Err(EditError::ContainmentViolation {
                    parent: parent_resolved,
                    child: resolved_name.to_string(),
                });
            }

            let id = fresh_id(graph, &block_type);
            let mut node = Node::new(resolved_name);
            node.parent = Some(parent_id.clone());
            node.display_name = Some(resolved_name.to_string());
            graph.insert(id.clone(), node);
            if let Some(parent_node) = graph.get_mut(&parent_id) {
                let at = at.min(parent_node.nodes.len());
                parent_node.nodes.insert(at, id.clone());
            }
            Ok(vec![id, parent_id])
        }

        Cmd::RemoveNode { id } => {
            ensure_not_structural(graph, &id)?;
            let parent_id = graph
                .get(&id)
                .ok_or_else(|| EditError::UnknownNode(id.clone()))?
                .parent
                .clone();

            let mut removed = graph.descendants(&id);
            removed.push(id.clone());
            for node_id in &removed {
                graph.remove(node_id);
            }
            if let Some(parent_id) = &parent_id
                && let Some(parent_node) = graph.get_mut(parent_id)
            {
                parent_node.nodes.retain(|child| child != &id);
                parent_node.linked_nodes.retain(|_, child| *child != id);
            }

            let mut changed = removed;
            changed.extend(parent_id);
            Ok(changed)
        }

        Cmd::MoveNode { id, new_parent, at } => {
            ensure_not_structural(graph, &id)?;
            let node_resolved = graph
                .get(&id)
                .map(|node| node.node_type.resolved_name.clone())
                .ok_or_else(|| EditError::UnknownNode(id.clone()))?;
            let parent_resolved = graph
                .get(&new_parent)
                .map(|node| node.node_type.resolved_name.clone())
                .ok_or_else(|| EditError::UnknownNode(new_parent.clone()))?;

            if new_parent == id || graph.descendants(&id).contains(&new_parent) {
                return Err(EditError::WouldCreateCycle(id));
            }
            if !registry::can_attach(&parent_resolved, &[node_resolved.as_str()]) {
                return Err(EditError::ContainmentViolation {
                    parent: parent_resolved,
                    child: node_resolved,
                });
            }

            let old_parent = graph
                .get(&id)
                .and_then(|node| node.parent.clone())
                .ok_or_else(|| EditError::StructuralNode(id.clone()))?;
            if let Some(old_parent_node) = graph.get_mut(&old_parent) {
                old_parent_node.nodes.retain(|child| child != &id);
            }
            if let Some(parent_node) = graph.get_mut(&new_parent) {
                let at = at.min(parent_node.nodes.len());
                parent_node.nodes.insert(at, id.clone());
            }
            if let Some(node) = graph.get_mut(&id) {
                node.parent = Some(new_parent.clone());
            }
            Ok(vec![id, old_parent, new_parent])
        }

        Cmd::SetProp { id, key, value } => {
            let node = graph
                .get_mut(&id)
                .ok_or_else(|| EditError::UnknownNode(id.clone()))?;
            node.props.insert(key, value);
            Ok(vec![id])
        }

        Cmd::SetHidden { id, hidden } => {
            let node = graph
                .get_mut(&id)
                .ok_or_else(|| EditError::UnknownNode(id.clone()))?;
            node.hidden = hidden;
            Ok(vec![id])
        }
    }
}

/// ROOT and the canvas container are structural and never move or go away.
fn ensure_not_structural(graph: &PageGraph, id: &str) -> Result<(), EditError> {
    if id == ROOT_ID || graph.canvas_id() == Some(id) {
        return Err(EditError::StructuralNode(id.to_string()));
    }
    Ok(())
}

/// Smallest unused "{tag}-{n}" id. Scanning keeps ids deterministic and
/// collision-free even in sessions loaded from persisted documents whose
/// ids were assigned the same way.
fn fresh_id(graph: &PageGraph, tag: &str) -> String {
    let mut index = 0usize;
    loop {
        let id = format!("{tag}-{index}");
        if !graph.contains(&id) {
            return id;
        }
        index += 1;
    }
}
