pub mod convert;
pub mod editing;
pub mod models;
pub mod optimize;
pub mod registry;

// Re-export key types for easier usage
pub use convert::{
    MalformedDocument, blocks_from_graph, deserialize, graph_from_blocks, serialize,
    try_deserialize,
};
pub use editing::{Cmd, EditError, EditSession, Patch};
pub use models::{Block, CANVAS_ID, Node, NodeType, PageGraph, ROOT_ID};
pub use optimize::{OptimizeStats, optimize, stats};
pub use registry::{RegistryError, block_type_for, can_attach, resolved_name_for};
