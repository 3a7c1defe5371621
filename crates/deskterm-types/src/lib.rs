//! Foundation types for deskterm.
//!
//! Platform-agnostic types shared by every deskterm crate: the error
//! taxonomy, runtime configuration, and the key events consumed by the
//! terminal's line editor.

pub mod config;
pub mod error;
pub mod input;
