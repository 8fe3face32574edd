/*!
 * Editing session for the page graph.
 *
 * The editor owns exactly one [`EditSession`] per open page. All mutations
 * are synchronous and flow through a single path:
 *
 * 1. The UI dispatches a [`Cmd`] describing the structural or property change.
 * 2. The command is validated in full (registry lookup, containment rule,
 *    cycle check) against a working copy of the graph; a rejected command
 *    leaves the session's graph untouched.
 * 3. On success the previous graph is pushed onto a bounded undo stack and
 *    the session returns a [`Patch`] naming the touched nodes.
 *
 * The render path never sees the live graph: [`EditSession::blocks`] hands
 * out an immutable block-list snapshot built by the converter, and
 * [`EditSession::to_persisted_json`] runs the optimizer over a serialized
 * snapshot for the save transport. Undo/redo swap whole graph snapshots, so
 * history replay can never resurrect a state that was not itself the result
 * of validated edits.
 */

pub mod commands;
pub mod patch;
pub mod session;

pub use commands::Cmd;
pub use patch::Patch;
pub use session::{EditError, EditSession};
