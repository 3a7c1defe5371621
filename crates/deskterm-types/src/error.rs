//! Error types for deskterm.

use std::io;

/// Failures raised by the persistent store and its filesystem adapter.
///
/// Display strings read like shell diagnostics so that command handlers can
/// surface them as `<cmd>: <message>` without further formatting.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("file exists: {0}")]
    AlreadyExists(String),

    #[error("no such parent directory: {0}")]
    NoSuchParent(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("destination exists: {0}")]
    DestinationExists(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors produced across the deskterm workspace.
#[derive(Debug, thiserror::Error)]
pub enum DesktermError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Command failure. The message is shown verbatim, so it carries its own
    /// `<cmd>:` prefix.
    #[error("{0}")]
    Command(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("speech error: {0}")]
    Speech(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DesktermError>;
