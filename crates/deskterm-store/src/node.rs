//! Filesystem node records.

use serde::{Deserialize, Serialize};

use crate::path;

/// Kind of a filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// One filesystem entry, keyed by its absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsNode {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// `None` only for the root directory.
    pub parent_path: Option<String>,
    #[serde(default)]
    pub content: String,
    /// Byte length of `content`.
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub created: u64,
    /// Milliseconds since the Unix epoch.
    pub modified: u64,
}

impl FsNode {
    /// A file node at `path` (already normalized).
    pub fn file(path: &str, content: &str, now: u64) -> Self {
        Self {
            path: path.to_string(),
            kind: NodeKind::File,
            parent_path: parent_of(path),
            content: content.to_string(),
            size: content.len() as u64,
            created: now,
            modified: now,
        }
    }

    /// A directory node at `path` (already normalized).
    pub fn directory(path: &str, now: u64) -> Self {
        Self {
            path: path.to_string(),
            kind: NodeKind::Directory,
            parent_path: parent_of(path),
            content: String::new(),
            size: 0,
            created: now,
            modified: now,
        }
    }

    /// The root directory.
    pub fn root(now: u64) -> Self {
        Self::directory("/", now)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Final path component (`/` for root).
    pub fn name(&self) -> &str {
        path::file_name(&self.path)
    }

    /// Replace the content, recomputing `size` and bumping `modified`.
    pub fn set_content(&mut self, content: String, now: u64) {
        self.size = content.len() as u64;
        self.content = content;
        self.modified = now;
    }

    /// Re-key this node under a new path, keeping timestamps and content.
    pub fn relocate(&mut self, new_path: &str) {
        self.path = new_path.to_string();
        self.parent_path = parent_of(new_path);
    }
}

fn parent_of(p: &str) -> Option<String> {
    if p == "/" {
        None
    } else {
        Some(path::parent(p).to_string())
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
