//! In-memory store backend.
//!
//! Useful for unit tests and ephemeral terminals, and the working copy
//! behind [`JsonFileStore`](crate::JsonFileStore). Nodes live in a
//! `BTreeMap` keyed by normalized path, with a secondary index from parent
//! path to child paths so directory listings never scan the whole table.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use deskterm_types::error::StoreResult;
use serde_json::Value;

use crate::backend::StoreBackend;
use crate::batch::{Batch, Op};
use crate::node::FsNode;

/// A fully in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: BTreeMap<String, FsNode>,
    /// Parent path -> child paths.
    by_parent: HashMap<String, BTreeSet<String>>,
    metadata: BTreeMap<String, Value>,
}

impl MemoryStore {
    /// Create an empty store (no root node; the filesystem adapter adds it).
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from raw tables.
    pub fn from_tables(nodes: Vec<FsNode>, metadata: BTreeMap<String, Value>) -> Self {
        let mut store = Self {
            metadata,
            ..Self::default()
        };
        for node in nodes {
            store.insert(node);
        }
        store
    }

    /// Raw metadata table.
    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, node: FsNode) {
        if let Some(old) = self.nodes.get(&node.path)
            && old.parent_path != node.parent_path
        {
            let old_parent = old.parent_path.clone();
            self.unindex(&node.path, old_parent.as_deref());
        }
        if let Some(parent) = &node.parent_path {
            self.by_parent
                .entry(parent.clone())
                .or_default()
                .insert(node.path.clone());
        }
        self.nodes.insert(node.path.clone(), node);
    }

    fn remove(&mut self, path: &str) {
        if let Some(old) = self.nodes.remove(path) {
            self.unindex(path, old.parent_path.as_deref());
        }
    }

    fn unindex(&mut self, path: &str, parent: Option<&str>) {
        if let Some(parent) = parent
            && let Some(set) = self.by_parent.get_mut(parent)
        {
            set.remove(path);
            if set.is_empty() {
                self.by_parent.remove(parent);
            }
        }
    }

    pub(crate) fn apply(&mut self, batch: Batch) {
        for op in batch {
            match op {
                Op::PutNode(node) => self.insert(node),
                Op::DeleteNode(path) => self.remove(&path),
                Op::PutMeta(key, value) => {
                    self.metadata.insert(key, value);
                },
                Op::DeleteMeta(key) => {
                    self.metadata.remove(&key);
                },
                Op::Clear => {
                    self.nodes.clear();
                    self.by_parent.clear();
                    self.metadata.clear();
                },
            }
        }
    }
}

impl StoreBackend for MemoryStore {
    fn node(&self, path: &str) -> StoreResult<Option<FsNode>> {
        Ok(self.nodes.get(path).cloned())
    }

    fn children(&self, parent: &str) -> StoreResult<Vec<FsNode>> {
        let Some(paths) = self.by_parent.get(parent) else {
            return Ok(Vec::new());
        };
        Ok(paths
            .iter()
            .filter_map(|p| self.nodes.get(p).cloned())
            .collect())
    }

    fn subtree(&self, path: &str) -> StoreResult<Vec<FsNode>> {
        let Some(top) = self.nodes.get(path) else {
            return Ok(Vec::new());
        };
        let mut out = vec![top.clone()];
        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{path}/")
        };
        // BTreeMap iteration is sorted, so descendants form one contiguous
        // range starting at the prefix.
        for (key, node) in self.nodes.range(prefix.clone()..) {
            if !key.starts_with(&prefix) {
                break;
            }
            if key != path {
                out.push(node.clone());
            }
        }
        Ok(out)
    }

    fn nodes(&self) -> StoreResult<Vec<FsNode>> {
        Ok(self.nodes.values().cloned().collect())
    }

    fn meta(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.metadata.get(key).cloned())
    }

    fn commit(&mut self, batch: Batch) -> StoreResult<()> {
        log::debug!("memory store: committing {} ops", batch.len());
        self.apply(batch);
        Ok(())
    }
}
