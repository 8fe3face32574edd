pub mod block;
pub mod node_graph;

pub use block::Block;
pub use node_graph::{CANVAS_ID, Node, NodeType, PageGraph, ROOT_ID};
