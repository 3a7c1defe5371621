//! Filesystem adapter over a [`StoreBackend`].
//!
//! Every operation normalizes its paths first. Operations that touch more
//! than one node (recursive delete, move, copy, scaffolding, reset) build a
//! single [`Batch`] and commit it once, so a failure never leaves a
//! half-moved or half-copied subtree behind.

use deskterm_types::error::{StoreError, StoreResult};
use serde_json::Value;

use crate::backend::StoreBackend;
use crate::batch::Batch;
use crate::memory::MemoryStore;
use crate::node::{FsNode, NodeKind, now_millis};
use crate::path::{self, normalize};
use crate::scaffold::Scaffold;

/// Metadata key set once the seed tree has been created.
pub const SCAFFOLDING_KEY: &str = "scaffolding_created";

/// Aggregate counts returned by [`FileSystem::get_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsStats {
    pub total_items: usize,
    pub files: usize,
    pub directories: usize,
    /// Sum of file sizes in bytes.
    pub total_size: u64,
}

/// Path-addressed filesystem with atomic multi-node operations.
pub struct FileSystem {
    backend: Box<dyn StoreBackend>,
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystem").finish_non_exhaustive()
    }
}

impl FileSystem {
    /// Wrap a backend, creating the root directory if the store is empty.
    pub fn new(mut backend: Box<dyn StoreBackend>) -> StoreResult<Self> {
        if backend.node("/")?.is_none() {
            let mut batch = Batch::new();
            batch.put(FsNode::root(now_millis()));
            backend.commit(batch)?;
            log::debug!("created root directory");
        }
        Ok(Self { backend })
    }

    /// A filesystem over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        let mut store = MemoryStore::new();
        let mut batch = Batch::new();
        batch.put(FsNode::root(now_millis()));
        store.apply(batch);
        Self {
            backend: Box::new(store),
        }
    }

    // -- Reads --

    /// Look up a node. A missing path is `Ok(None)`, never an error.
    pub fn get_item(&self, path: &str) -> StoreResult<Option<FsNode>> {
        self.backend.node(&normalize(path))
    }

    /// Whether a node exists at `path`.
    pub fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.get_item(path)?.is_some())
    }

    /// Direct children of `path`, sorted by name. Empty when there are none
    /// (including when `path` itself does not exist).
    pub fn list_directory(&self, path: &str) -> StoreResult<Vec<FsNode>> {
        let mut children = self.backend.children(&normalize(path))?;
        children.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(children)
    }

    /// Fetch a node that must be a directory.
    pub fn require_dir(&self, path: &str) -> StoreResult<FsNode> {
        let path = normalize(path);
        match self.backend.node(&path)? {
            Some(node) if node.is_dir() => Ok(node),
            Some(_) => Err(StoreError::NotADirectory(path.into_owned())),
            None => Err(StoreError::NotFound(path.into_owned())),
        }
    }

    /// Read the content of a file.
    pub fn read_file(&self, path: &str) -> StoreResult<String> {
        let path = normalize(path);
        match self.backend.node(&path)? {
            Some(node) if node.is_file() => Ok(node.content),
            Some(_) => Err(StoreError::IsADirectory(path.into_owned())),
            None => Err(StoreError::NotFound(path.into_owned())),
        }
    }

    /// Count files and directories and sum file sizes.
    pub fn get_stats(&self) -> StoreResult<FsStats> {
        let mut stats = FsStats::default();
        for node in self.backend.nodes()? {
            stats.total_items += 1;
            match node.kind {
                NodeKind::File => {
                    stats.files += 1;
                    stats.total_size += node.size;
                },
                NodeKind::Directory => stats.directories += 1,
            }
        }
        Ok(stats)
    }

    // -- Single-node writes --

    /// Create a file, or replace its content when `overwrite` is set.
    pub fn create_file(&mut self, path: &str, content: &str, overwrite: bool) -> StoreResult<FsNode> {
        let path = normalize(path).into_owned();
        if path == "/" {
            return Err(StoreError::IsADirectory(path));
        }
        let now = now_millis();
        let node = match self.backend.node(&path)? {
            Some(existing) if existing.is_dir() => {
                return Err(if overwrite {
                    StoreError::IsADirectory(path)
                } else {
                    StoreError::AlreadyExists(path)
                });
            },
            Some(_) if !overwrite => return Err(StoreError::AlreadyExists(path)),
            Some(mut existing) => {
                existing.set_content(content.to_string(), now);
                existing
            },
            None => {
                self.ensure_parent(&path)?;
                FsNode::file(&path, content, now)
            },
        };
        let mut batch = Batch::new();
        batch.put(node.clone());
        self.backend.commit(batch)?;
        log::debug!("wrote {} ({} bytes)", node.path, node.size);
        Ok(node)
    }

    /// Append to a file, creating it when missing.
    pub fn append_file(&mut self, path: &str, content: &str) -> StoreResult<FsNode> {
        let path = normalize(path).into_owned();
        match self.backend.node(&path)? {
            Some(existing) if existing.is_dir() => Err(StoreError::IsADirectory(path)),
            Some(existing) => {
                let combined = format!("{}{content}", existing.content);
                self.create_file(&path, &combined, true)
            },
            None => self.create_file(&path, content, false),
        }
    }

    /// Create an empty file, or bump the modification time of an existing node.
    pub fn touch(&mut self, path: &str) -> StoreResult<FsNode> {
        let path = normalize(path).into_owned();
        match self.backend.node(&path)? {
            Some(mut existing) => {
                existing.modified = now_millis();
                let mut batch = Batch::new();
                batch.put(existing.clone());
                self.backend.commit(batch)?;
                Ok(existing)
            },
            None => self.create_file(&path, "", false),
        }
    }

    /// Create one directory; its parent must already exist.
    pub fn create_directory(&mut self, path: &str) -> StoreResult<FsNode> {
        let path = normalize(path).into_owned();
        if self.backend.node(&path)?.is_some() {
            return Err(StoreError::AlreadyExists(path));
        }
        self.ensure_parent(&path)?;
        let node = FsNode::directory(&path, now_millis());
        let mut batch = Batch::new();
        batch.put(node.clone());
        self.backend.commit(batch)?;
        log::debug!("mkdir {path}");
        Ok(node)
    }

    /// Create a directory and any missing ancestors (`mkdir -p`).
    pub fn create_dir_all(&mut self, path: &str) -> StoreResult<()> {
        let path = normalize(path).into_owned();
        let now = now_millis();
        let mut batch = Batch::new();
        let mut current = String::from("/");
        for component in path.split('/').filter(|c| !c.is_empty()) {
            current = path::join(&current, component);
            match self.backend.node(&current)? {
                Some(node) if node.is_dir() => {},
                Some(_) => return Err(StoreError::NotADirectory(current)),
                None => {
                    batch.put(FsNode::directory(&current, now));
                },
            }
        }
        if !batch.is_empty() {
            self.backend.commit(batch)?;
        }
        Ok(())
    }

    // -- Multi-node writes --

    /// Delete a node. Directories with children need `recursive`; the whole
    /// subtree is then removed depth-first in one batch. Returns the number
    /// of nodes removed.
    pub fn delete_item(&mut self, path: &str, recursive: bool) -> StoreResult<usize> {
        let path = normalize(path).into_owned();
        if path == "/" {
            return Err(StoreError::InvalidPath("cannot remove root".to_string()));
        }
        let node = self
            .backend
            .node(&path)?
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;

        let mut batch = Batch::new();
        if node.is_dir() {
            let subtree = self.backend.subtree(&path)?;
            if subtree.len() > 1 && !recursive {
                return Err(StoreError::DirectoryNotEmpty(path));
            }
            // Sorted by path, so reversing visits children before parents.
            for n in subtree.iter().rev() {
                batch.delete(n.path.clone());
            }
        } else {
            batch.delete(path.clone());
        }
        let removed = batch.len();
        self.backend.commit(batch)?;
        log::debug!("removed {path} ({removed} nodes)");
        Ok(removed)
    }

    /// Move or rename a node. Directory moves rewrite every descendant path
    /// in the same batch.
    pub fn move_item(&mut self, old_path: &str, new_path: &str) -> StoreResult<()> {
        let old_path = normalize(old_path).into_owned();
        let new_path = normalize(new_path).into_owned();
        if old_path == "/" || new_path == "/" {
            return Err(StoreError::InvalidPath("cannot move root".to_string()));
        }
        let node = self
            .backend
            .node(&old_path)?
            .ok_or_else(|| StoreError::NotFound(old_path.clone()))?;
        if old_path == new_path {
            return Ok(());
        }
        if self.backend.node(&new_path)?.is_some() {
            return Err(StoreError::DestinationExists(new_path));
        }
        if node.is_dir() && path::is_within(&new_path, &old_path) {
            return Err(StoreError::InvalidPath(format!(
                "cannot move {old_path} into itself"
            )));
        }
        self.ensure_parent(&new_path)?;

        let subtree = self.backend.subtree(&old_path)?;
        let mut batch = Batch::new();
        for n in &subtree {
            batch.delete(n.path.clone());
        }
        for mut n in subtree {
            let target = path::rebase(&n.path, &old_path, &new_path);
            n.relocate(&target);
            batch.put(n);
        }
        let count = batch.len() / 2;
        self.backend.commit(batch)?;
        log::debug!("moved {old_path} -> {new_path} ({count} nodes)");
        Ok(())
    }

    /// Copy a node. Files duplicate their content (an existing destination
    /// file is overwritten); directories need `recursive` and a free
    /// destination.
    pub fn copy_item(&mut self, src: &str, dst: &str, recursive: bool) -> StoreResult<()> {
        let src = normalize(src).into_owned();
        let dst = normalize(dst).into_owned();
        let node = self
            .backend
            .node(&src)?
            .ok_or_else(|| StoreError::NotFound(src.clone()))?;
        let now = now_millis();

        if node.is_file() {
            return match self.backend.node(&dst)? {
                Some(existing) if existing.is_dir() => Err(StoreError::DestinationExists(dst)),
                Some(_) => self.create_file(&dst, &node.content, true).map(|_| ()),
                None => self.create_file(&dst, &node.content, false).map(|_| ()),
            };
        }

        if !recursive {
            return Err(StoreError::IsADirectory(src));
        }
        if self.backend.node(&dst)?.is_some() {
            return Err(StoreError::DestinationExists(dst));
        }
        if path::is_within(&dst, &src) {
            return Err(StoreError::InvalidPath(format!(
                "cannot copy {src} into itself"
            )));
        }
        self.ensure_parent(&dst)?;

        let mut batch = Batch::new();
        for n in self.backend.subtree(&src)? {
            let target = path::rebase(&n.path, &src, &dst);
            let copy = match n.kind {
                NodeKind::File => FsNode::file(&target, &n.content, now),
                NodeKind::Directory => FsNode::directory(&target, now),
            };
            batch.put(copy);
        }
        let count = batch.len();
        self.backend.commit(batch)?;
        log::debug!("copied {src} -> {dst} ({count} nodes)");
        Ok(())
    }

    // -- Lifecycle --

    /// Whether the seed tree has been created.
    pub fn is_scaffolded(&self) -> StoreResult<bool> {
        Ok(matches!(
            self.backend.meta(SCAFFOLDING_KEY)?,
            Some(Value::Bool(true))
        ))
    }

    /// Create the seed tree unless it was created before. Existing nodes are
    /// left alone. Returns `true` when seeding happened now.
    pub fn ensure_scaffolding(&mut self, scaffold: &Scaffold) -> StoreResult<bool> {
        if self.is_scaffolded()? {
            return Ok(false);
        }
        let now = now_millis();
        let mut batch = Batch::new();
        for dir in &scaffold.directories {
            let dir = normalize(dir);
            if self.backend.node(&dir)?.is_none() {
                batch.put(FsNode::directory(&dir, now));
            }
        }
        for (file, content) in &scaffold.files {
            let file = normalize(file);
            if self.backend.node(&file)?.is_none() {
                batch.put(FsNode::file(&file, content, now));
            }
        }
        batch.put_meta(SCAFFOLDING_KEY, Value::Bool(true));
        let count = batch.len() - 1;
        self.backend.commit(batch)?;
        log::info!("Scaffolding created ({count} nodes)");
        Ok(true)
    }

    /// Remove every node except the root. Metadata is kept, so the seed tree
    /// is not recreated. Returns the number of nodes removed.
    pub fn clear(&mut self) -> StoreResult<usize> {
        let mut batch = Batch::new();
        for node in self.backend.nodes()?.iter().rev() {
            if node.path != "/" {
                batch.delete(node.path.clone());
            }
        }
        let removed = batch.len();
        self.backend.commit(batch)?;
        log::info!("Filesystem cleared ({removed} nodes)");
        Ok(removed)
    }

    /// Wipe all nodes and metadata and recreate the seed tree, atomically.
    pub fn reset(&mut self, scaffold: &Scaffold) -> StoreResult<()> {
        let now = now_millis();
        let mut batch = Batch::new();
        batch.clear().put(FsNode::root(now));
        for dir in &scaffold.directories {
            batch.put(FsNode::directory(&normalize(dir), now));
        }
        for (file, content) in &scaffold.files {
            batch.put(FsNode::file(&normalize(file), content, now));
        }
        batch.put_meta(SCAFFOLDING_KEY, Value::Bool(true));
        self.backend.commit(batch)?;
        log::info!("Filesystem reset to scaffolding");
        Ok(())
    }

    /// Fail with `NoSuchParent` unless the parent of `path` is a directory.
    fn ensure_parent(&self, path: &str) -> StoreResult<()> {
        let parent = path::parent(path);
        match self.backend.node(parent)? {
            Some(node) if node.is_dir() => Ok(()),
            _ => Err(StoreError::NoSuchParent(parent.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs() -> FileSystem {
        FileSystem::in_memory()
    }

    fn names(fs: &FileSystem, dir: &str) -> Vec<String> {
        fs.list_directory(dir)
            .unwrap()
            .iter()
            .map(|n| n.name().to_string())
            .collect()
    }

    #[test]
    fn root_exists() {
        let fs = fs();
        assert!(fs.get_item("/").unwrap().unwrap().is_dir());
    }

    #[test]
    fn get_missing_is_none() {
        assert!(fs().get_item("/ghost").unwrap().is_none());
    }

    #[test]
    fn create_file_roundtrip() {
        let mut fs = fs();
        fs.create_file("/hello.txt", "hello", false).unwrap();
        let node = fs.get_item("/hello.txt").unwrap().unwrap();
        assert_eq!(node.content, "hello");
        assert_eq!(node.size, "hello".len() as u64);
    }

    #[test]
    fn create_file_twice_fails_without_overwrite() {
        let mut fs = fs();
        fs.create_file("/a", "1", false).unwrap();
        assert!(matches!(
            fs.create_file("/a", "2", false),
            Err(StoreError::AlreadyExists(_))
        ));
        fs.create_file("/a", "22", true).unwrap();
        let node = fs.get_item("/a").unwrap().unwrap();
        assert_eq!(node.content, "22");
        assert_eq!(node.size, 2);
    }

    #[test]
    fn create_file_needs_parent() {
        let mut fs = fs();
        assert!(matches!(
            fs.create_file("/no/such/file", "x", false),
            Err(StoreError::NoSuchParent(p)) if p == "/no/such"
        ));
        fs.create_file("/plain", "x", false).unwrap();
        assert!(matches!(
            fs.create_file("/plain/child", "x", false),
            Err(StoreError::NoSuchParent(_))
        ));
    }

    #[test]
    fn overwrite_directory_with_file_fails() {
        let mut fs = fs();
        fs.create_directory("/d").unwrap();
        assert!(matches!(
            fs.create_file("/d", "x", true),
            Err(StoreError::IsADirectory(_))
        ));
    }

    #[test]
    fn create_directory_conflicts() {
        let mut fs = fs();
        fs.create_directory("/d").unwrap();
        assert!(matches!(
            fs.create_directory("/d"),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(matches!(
            fs.create_directory("/x/y"),
            Err(StoreError::NoSuchParent(_))
        ));
    }

    #[test]
    fn create_dir_all_builds_chain() {
        let mut fs = fs();
        fs.create_dir_all("/a/b/c").unwrap();
        assert!(fs.get_item("/a/b").unwrap().unwrap().is_dir());
        // Idempotent.
        fs.create_dir_all("/a/b/c").unwrap();
        fs.create_file("/a/f", "", false).unwrap();
        assert!(matches!(
            fs.create_dir_all("/a/f/g"),
            Err(StoreError::NotADirectory(p)) if p == "/a/f"
        ));
    }

    #[test]
    fn append_creates_and_extends() {
        let mut fs = fs();
        fs.append_file("/log", "a\n").unwrap();
        fs.append_file("/log", "b\n").unwrap();
        assert_eq!(fs.read_file("/log").unwrap(), "a\nb\n");
    }

    #[test]
    fn touch_bumps_existing() {
        let mut fs = fs();
        let before = fs.create_file("/t", "keep", false).unwrap();
        let after = fs.touch("/t").unwrap();
        assert_eq!(after.content, "keep");
        assert!(after.modified >= before.modified);
    }

    #[test]
    fn list_directory_sorted_direct_children() {
        let mut fs = fs();
        fs.create_dir_all("/a/b/c").unwrap();
        fs.create_file("/a/z.txt", "", false).unwrap();
        fs.create_file("/a/m.txt", "", false).unwrap();
        assert_eq!(names(&fs, "/a"), vec!["b", "m.txt", "z.txt"]);
        assert!(fs.list_directory("/missing").unwrap().is_empty());
    }

    #[test]
    fn delete_non_empty_requires_recursive() {
        let mut fs = fs();
        fs.create_dir_all("/d/e").unwrap();
        fs.create_file("/d/e/f", "x", false).unwrap();
        assert!(matches!(
            fs.delete_item("/d", false),
            Err(StoreError::DirectoryNotEmpty(_))
        ));
        assert_eq!(fs.delete_item("/d", true).unwrap(), 3);
        for p in ["/d", "/d/e", "/d/e/f"] {
            assert!(fs.get_item(p).unwrap().is_none());
        }
    }

    #[test]
    fn delete_empty_dir_and_file() {
        let mut fs = fs();
        fs.create_directory("/empty").unwrap();
        fs.create_file("/f", "", false).unwrap();
        assert_eq!(fs.delete_item("/empty", false).unwrap(), 1);
        assert_eq!(fs.delete_item("/f", false).unwrap(), 1);
    }

    #[test]
    fn delete_errors() {
        let mut fs = fs();
        assert!(matches!(
            fs.delete_item("/ghost", false),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            fs.delete_item("/", true),
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn move_directory_rewrites_descendants() {
        let mut fs = fs();
        fs.create_dir_all("/a/sub").unwrap();
        fs.create_file("/a/one.txt", "1", false).unwrap();
        fs.create_file("/a/sub/two.txt", "2", false).unwrap();
        let before = names(&fs, "/a");

        fs.move_item("/a", "/b").unwrap();

        assert!(fs.get_item("/a").unwrap().is_none());
        assert!(fs.get_item("/a/sub/two.txt").unwrap().is_none());
        assert_eq!(names(&fs, "/b"), before);
        let moved = fs.get_item("/b/sub/two.txt").unwrap().unwrap();
        assert_eq!(moved.content, "2");
        assert_eq!(moved.parent_path.as_deref(), Some("/b/sub"));
        assert!(fs.list_directory("/a").unwrap().is_empty());
    }

    #[test]
    fn move_errors() {
        let mut fs = fs();
        fs.create_dir_all("/a/b").unwrap();
        fs.create_directory("/c").unwrap();
        assert!(matches!(
            fs.move_item("/ghost", "/x"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            fs.move_item("/a", "/c"),
            Err(StoreError::DestinationExists(_))
        ));
        assert!(matches!(
            fs.move_item("/a", "/nope/a"),
            Err(StoreError::NoSuchParent(_))
        ));
        assert!(matches!(
            fs.move_item("/a", "/a/b/a"),
            Err(StoreError::InvalidPath(_))
        ));
        // Nothing moved.
        assert!(fs.get_item("/a/b").unwrap().is_some());
    }

    #[test]
    fn rename_file() {
        let mut fs = fs();
        fs.create_file("/old.txt", "data", false).unwrap();
        fs.move_item("/old.txt", "/new.txt").unwrap();
        assert_eq!(fs.read_file("/new.txt").unwrap(), "data");
        assert!(!fs.exists("/old.txt").unwrap());
    }

    #[test]
    fn copy_file_and_overwrite() {
        let mut fs = fs();
        fs.create_file("/a", "alpha", false).unwrap();
        fs.copy_item("/a", "/b", false).unwrap();
        assert_eq!(fs.read_file("/b").unwrap(), "alpha");
        fs.create_file("/c", "old", false).unwrap();
        fs.copy_item("/a", "/c", false).unwrap();
        assert_eq!(fs.read_file("/c").unwrap(), "alpha");
        assert_eq!(fs.read_file("/a").unwrap(), "alpha");
    }

    #[test]
    fn copy_directory_requires_recursive() {
        let mut fs = fs();
        fs.create_dir_all("/src/inner").unwrap();
        fs.create_file("/src/inner/f", "x", false).unwrap();
        assert!(matches!(
            fs.copy_item("/src", "/dst", false),
            Err(StoreError::IsADirectory(_))
        ));
        fs.copy_item("/src", "/dst", true).unwrap();
        assert_eq!(fs.read_file("/dst/inner/f").unwrap(), "x");
        assert_eq!(fs.read_file("/src/inner/f").unwrap(), "x");
        assert!(matches!(
            fs.copy_item("/src", "/src/inner/again", true),
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn stats_count_nodes() {
        let mut fs = fs();
        fs.create_directory("/d").unwrap();
        fs.create_file("/d/a", "abc", false).unwrap();
        fs.create_file("/b", "de", false).unwrap();
        let s = fs.get_stats().unwrap();
        assert_eq!(s.files, 2);
        assert_eq!(s.directories, 2);
        assert_eq!(s.total_items, 4);
        assert_eq!(s.total_size, 5);
    }

    #[test]
    fn scaffolding_runs_once() {
        let mut fs = fs();
        let seed = Scaffold::standard("guest", "deskterm");
        assert!(!fs.is_scaffolded().unwrap());
        assert!(fs.ensure_scaffolding(&seed).unwrap());
        assert!(fs.is_scaffolded().unwrap());
        fs.delete_item("/home/guest/readme.txt", false).unwrap();
        assert!(!fs.ensure_scaffolding(&seed).unwrap());
        assert!(!fs.exists("/home/guest/readme.txt").unwrap());
    }

    #[test]
    fn clear_keeps_root_and_flag() {
        let mut fs = fs();
        fs.ensure_scaffolding(&Scaffold::standard("guest", "h")).unwrap();
        assert!(fs.clear().unwrap() > 0);
        assert_eq!(fs.get_stats().unwrap().total_items, 1);
        assert!(fs.is_scaffolded().unwrap());
    }

    #[test]
    fn reset_reseeds() {
        let mut fs = fs();
        let seed = Scaffold::standard("guest", "h");
        fs.ensure_scaffolding(&seed).unwrap();
        fs.create_file("/tmp/junk", "x", false).unwrap();
        fs.reset(&seed).unwrap();
        assert!(!fs.exists("/tmp/junk").unwrap());
        assert!(fs.exists("/home/guest/readme.txt").unwrap());
        assert!(fs.is_scaffolded().unwrap());
    }

    #[test]
    fn json_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fs.json");
        {
            let store = crate::JsonFileStore::open(&path).unwrap();
            let mut fs = FileSystem::new(Box::new(store)).unwrap();
            fs.create_dir_all("/home/user/projects").unwrap();
            fs.create_file("/home/user/projects/a.txt", "", false).unwrap();
            fs.move_item("/home/user/projects", "/home/user/work").unwrap();
        }
        let store = crate::JsonFileStore::open(&path).unwrap();
        let fs = FileSystem::new(Box::new(store)).unwrap();
        assert!(fs.exists("/home/user/work/a.txt").unwrap());
        assert!(!fs.exists("/home/user/projects").unwrap());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Action {
            File(String),
            Dir(String),
        }

        fn action() -> impl Strategy<Value = Action> {
            prop_oneof![
                "(/[a-c]){1,3}".prop_map(Action::File),
                "(/[a-c]){1,3}".prop_map(Action::Dir),
            ]
        }

        proptest! {
            #[test]
            fn paths_stay_unique_and_parented(actions in proptest::collection::vec(action(), 0..40)) {
                let mut fs = FileSystem::in_memory();
                for a in actions {
                    let (p, result) = match a {
                        Action::File(p) => { let r = fs.create_file(&p, "x", false).map(|_| ()); (p, r) },
                        Action::Dir(p) => { let r = fs.create_directory(&p).map(|_| ()); (p, r) },
                    };
                    if let Err(StoreError::AlreadyExists(e)) = &result {
                        prop_assert_eq!(e, &p);
                    }
                }
                let nodes = fs.backend.nodes().unwrap();
                let mut seen = std::collections::HashSet::new();
                for n in &nodes {
                    prop_assert!(seen.insert(n.path.clone()), "duplicate path {}", n.path);
                    if let Some(parent) = &n.parent_path {
                        let pnode = fs.get_item(parent).unwrap();
                        prop_assert!(pnode.is_some_and(|p| p.is_dir()), "orphan {}", n.path);
                    }
                }
            }

            #[test]
            fn recursive_delete_leaves_no_descendants(depth in 1usize..5, files in 0usize..4) {
                let mut fs = FileSystem::in_memory();
                let mut dir = String::new();
                let mut all = Vec::new();
                for i in 0..depth {
                    dir.push_str(&format!("/d{i}"));
                    fs.create_directory(&dir).unwrap();
                    all.push(dir.clone());
                    for f in 0..files {
                        let p = format!("{dir}/f{f}");
                        fs.create_file(&p, "x", false).unwrap();
                        all.push(p);
                    }
                }
                if all.len() > 1 {
                    prop_assert!(fs.delete_item("/d0", false).is_err());
                }
                fs.delete_item("/d0", true).unwrap();
                for p in all {
                    prop_assert!(fs.get_item(&p).unwrap().is_none());
                }
            }
        }
    }
}
