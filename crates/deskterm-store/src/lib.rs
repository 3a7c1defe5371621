//! Persistent filesystem store.
//!
//! Nodes are keyed by normalized absolute path. A [`StoreBackend`] is the
//! raw key-value database (two logical tables: `files` and `metadata`);
//! [`FileSystem`] layers the filesystem semantics on top and commits every
//! multi-node change as one atomic [`Batch`].

pub mod backend;
pub mod batch;
pub mod fs;
pub mod json;
pub mod memory;
pub mod node;
pub mod path;
pub mod scaffold;

pub use backend::StoreBackend;
pub use batch::{Batch, Op};
pub use fs::{FileSystem, FsStats, SCAFFOLDING_KEY};
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use node::{FsNode, NodeKind};
pub use scaffold::Scaffold;
