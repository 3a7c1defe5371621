//! stdin/stdout glue: key decoding, console output and history persistence.

use std::io::Write;
use std::path::Path;

use deskterm_terminal::{KeyOutcome, OutputSink, Terminal};
use deskterm_types::input::Key;

/// Mirrors terminal rows to stdout.
///
/// Echoed prompt lines are only printed when the input is not a terminal;
/// an interactive user already sees what they typed.
pub struct StdoutSink {
    show_echo: bool,
}

impl StdoutSink {
    pub fn new(show_echo: bool) -> Self {
        Self { show_echo }
    }
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, line: &str) {
        println!("{line}");
    }

    fn echo(&mut self, line: &str) {
        if self.show_echo {
            println!("{line}");
        }
    }

    fn clear(&mut self) {
        if let Err(e) = write_clear(&mut std::io::stdout().lock()) {
            log::debug!("Failed to clear stdout: {e}");
        }
    }
}

/// Erase the screen and home the cursor.
fn write_clear(out: &mut impl Write) -> std::io::Result<()> {
    out.write_all(b"\x1b[2J\x1b[H")?;
    out.flush()
}

/// Decode one input line into keys, followed by Enter.
pub fn decode_line(text: &str) -> Vec<Key> {
    let mut keys: Vec<Key> = text
        .chars()
        .filter_map(|c| match u8::try_from(c) {
            Ok(b) if b.is_ascii_control() => Key::from_control_byte(b),
            _ => Some(Key::Char(c)),
        })
        .collect();
    keys.push(Key::Enter);
    keys
}

/// Feed a line through the terminal's line editor.
///
/// Stops early when a key ends the session or submits (a control byte like
/// Ctrl+J inside the line).
pub fn feed_line(terminal: &mut Terminal, text: &str) -> KeyOutcome {
    let mut outcome = KeyOutcome::Continue;
    for key in decode_line(text) {
        outcome = terminal.handle_key(key);
        if outcome == KeyOutcome::Exit {
            return outcome;
        }
    }
    outcome
}

/// Saved history, oldest first. A missing file is an empty history.
pub fn load_history(path: &Path) -> std::io::Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(String::from)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Like [`load_history`], but an unreadable file only costs the history.
pub fn restore_history(path: &Path) -> Vec<String> {
    match load_history(path) {
        Ok(lines) => {
            log::debug!("Restored {} history entries", lines.len());
            lines
        },
        Err(e) => {
            log::warn!("Ignoring history file {}: {e}", path.display());
            Vec::new()
        },
    }
}

pub fn save_history(path: &Path, history: &[String]) -> std::io::Result<()> {
    let mut text = history.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    std::fs::write(path, text)?;
    log::debug!("Saved {} history entries to {}", history.len(), path.display());
    Ok(())
}
