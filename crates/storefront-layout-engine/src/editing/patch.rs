/// Result of applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Ids of the nodes the command touched (created, moved, removed or
    /// updated), for targeted UI refresh.
    pub changed: Vec<String>,
    /// Session version after the edit, for change detection.
    pub version: u64,
}
