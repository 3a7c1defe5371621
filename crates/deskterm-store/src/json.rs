//! JSON-file store backend.
//!
//! Persists both tables as one JSON document:
//!
//! ```json
//! { "files": [ { "path": "/", "type": "directory", ... } ],
//!   "metadata": { "scaffolding_created": true } }
//! ```
//!
//! Each commit is applied to a staged copy, written to a temporary sibling
//! file and renamed over the original. If any step fails, the live state is
//! left untouched.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use deskterm_types::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::StoreBackend;
use crate::batch::Batch;
use crate::memory::MemoryStore;
use crate::node::FsNode;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    files: Vec<FsNode>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

/// Store backed by a JSON document on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    live: MemoryStore,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file yields an empty store; nothing is written until the
    /// first commit. A corrupt file is an error.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let live = if path.exists() {
            let text = fs::read_to_string(&path)?;
            let doc: Document = serde_json::from_str(&text)?;
            log::info!(
                "Opened store {} ({} nodes)",
                path.display(),
                doc.files.len()
            );
            MemoryStore::from_tables(doc.files, doc.metadata)
        } else {
            log::info!("Store {} does not exist yet, starting empty", path.display());
            MemoryStore::new()
        };
        Ok(Self { path, live })
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, staged: &MemoryStore) -> StoreResult<()> {
        let doc = Document {
            files: staged.nodes()?,
            metadata: staged.metadata().clone(),
        };
        let json = serde_json::to_vec_pretty(&doc)?;

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(&json)?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::Io(e)
        })?;
        Ok(())
    }
}

impl StoreBackend for JsonFileStore {
    fn node(&self, path: &str) -> StoreResult<Option<FsNode>> {
        self.live.node(path)
    }

    fn children(&self, parent: &str) -> StoreResult<Vec<FsNode>> {
        self.live.children(parent)
    }

    fn subtree(&self, path: &str) -> StoreResult<Vec<FsNode>> {
        self.live.subtree(path)
    }

    fn nodes(&self) -> StoreResult<Vec<FsNode>> {
        self.live.nodes()
    }

    fn meta(&self, key: &str) -> StoreResult<Option<Value>> {
        self.live.meta(key)
    }

    fn commit(&mut self, batch: Batch) -> StoreResult<()> {
        let ops = batch.len();
        let mut staged = self.live.clone();
        staged.apply(batch);
        self.persist(&staged)?;
        self.live = staged;
        log::debug!("json store: committed {ops} ops to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_and_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fs.json");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.nodes().unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn commit_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fs.json");
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            let mut b = Batch::new();
            b.put(FsNode::root(0))
                .put(FsNode::file("/hello.txt", "hello", 1))
                .put_meta("scaffolding_created", Value::Bool(true));
            store.commit(b).unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        let node = store.node("/hello.txt").unwrap().unwrap();
        assert_eq!(node.content, "hello");
        assert_eq!(store.children("/").unwrap().len(), 1);
        assert_eq!(
            store.meta("scaffolding_created").unwrap(),
            Some(Value::Bool(true))
        );
    }

    #[test]
    fn corrupt_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fs.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn failed_persist_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the document should be makes the rename fail.
        let path = dir.path().join("fs.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        let mut b = Batch::new();
        b.put(FsNode::root(0));
        store.commit(b).unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let mut b = Batch::new();
        b.put(FsNode::file("/x", "x", 0));
        assert!(store.commit(b).is_err());
        assert!(store.node("/x").unwrap().is_none());
        assert!(store.node("/").unwrap().is_some());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/fs.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        let mut b = Batch::new();
        b.put(FsNode::root(0));
        store.commit(b).unwrap();
        assert!(path.exists());
    }
}
