//! Command interpreter and terminal for deskterm.
//!
//! Commands implement the `Command` trait and are registered by name in a
//! `CommandRegistry`. The `Shell` expands and splits input lines (history,
//! variables, aliases, chains, pipes, redirects, globs) and dispatches each
//! simple command. `Terminal` wraps a shell with a prompt, a line editor and
//! a bounded output buffer.

pub mod app_commands;
mod commands;
pub mod file_commands;
pub mod fun_commands;
mod interpreter;
mod line_editor;
pub mod network_commands;
mod registry;
mod safety;
mod services;
pub mod speech_commands;
mod state;
pub mod system_commands;
mod terminal;
pub mod text_commands;

#[cfg(test)]
mod test_support;

/// Register every built-in command module into a registry.
pub use commands::register_builtins;
/// A single executable command.
pub use interpreter::Command;
/// Output produced by a command (text, nothing, or a clear signal).
pub use interpreter::CommandOutput;
/// Mutable context passed to every command.
pub use interpreter::Environment;
/// Line interpreter: expansion, chaining, pipes, redirects and dispatch.
pub use interpreter::Shell;
/// Wildcard matching for `*` and `?`.
pub use interpreter::glob_match;
/// Quote-aware word splitting.
pub use interpreter::tokenize;
/// Editing events and the editable input line.
pub use line_editor::{EditEvent, LineEditor};
/// Registry of available commands.
pub use registry::{CommandInfo, CommandRegistry};
/// Collaborators injected into the shell.
pub use services::{AppLauncher, OutputSink, Services, SpeechService};
/// Per-session shell state.
pub use state::ShellState;
/// Terminal session with prompt, output buffer and completion.
pub use terminal::{KeyOutcome, OutputBuffer, Terminal};
