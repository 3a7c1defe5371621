use deskterm_types::error::StoreResult;
use serde_json::Value;

use crate::batch::Batch;
use crate::node::FsNode;

/// Raw key-value database behind the filesystem.
///
/// Two logical tables: `files`, keyed by normalized absolute path, and
/// `metadata`, keyed by string. Reads never fail for a missing key.
/// [`commit`](StoreBackend::commit) must apply a whole batch or none of it.
pub trait StoreBackend {
    /// Look up a single node.
    fn node(&self, path: &str) -> StoreResult<Option<FsNode>>;

    /// All nodes whose `parent_path` is `parent`, sorted by path.
    fn children(&self, parent: &str) -> StoreResult<Vec<FsNode>>;

    /// The node at `path` followed by all of its descendants, sorted by path.
    fn subtree(&self, path: &str) -> StoreResult<Vec<FsNode>>;

    /// Every node in the store, sorted by path.
    fn nodes(&self) -> StoreResult<Vec<FsNode>>;

    /// Read a metadata entry.
    fn meta(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Apply a batch atomically.
    fn commit(&mut self, batch: Batch) -> StoreResult<()>;
}
