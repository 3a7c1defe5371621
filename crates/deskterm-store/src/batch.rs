//! Atomic write batches.

use serde_json::Value;

use crate::node::FsNode;

/// One write inside a [`Batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Insert or replace the node stored at `node.path`.
    PutNode(FsNode),
    /// Delete the node at the given path (no-op when absent).
    DeleteNode(String),
    PutMeta(String, Value),
    DeleteMeta(String),
    /// Drop every node and metadata entry.
    Clear,
}

/// An ordered set of writes committed all-or-nothing.
///
/// Ops apply in insertion order, so a `DeleteNode(old)` followed by a
/// `PutNode` for the same path leaves the new node in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    ops: Vec<Op>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, node: FsNode) -> &mut Self {
        self.ops.push(Op::PutNode(node));
        self
    }

    pub fn delete(&mut self, path: impl Into<String>) -> &mut Self {
        self.ops.push(Op::DeleteNode(path.into()));
        self
    }

    pub fn put_meta(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.ops.push(Op::PutMeta(key.into(), value));
        self
    }

    pub fn delete_meta(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(Op::DeleteMeta(key.into()));
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.ops.push(Op::Clear);
        self
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl IntoIterator for Batch {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
