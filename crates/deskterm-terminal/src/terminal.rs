//! Terminal session: prompt, output buffer, line editor and completion
//! around a [`Shell`].

use std::collections::VecDeque;

use deskterm_store::path;
use deskterm_types::input::Key;

use crate::interpreter::{CommandOutput, Shell};
use crate::line_editor::{EditEvent, LineEditor};
use crate::services::{OutputSink, Services};

/// Commands whose arguments complete to app ids instead of paths.
const APP_ARG_COMMANDS: &[&str] = &["open"];

/// Bounded scrollback. Optionally mirrors every row to another sink (a
/// native console, say).
pub struct OutputBuffer {
    lines: VecDeque<String>,
    limit: usize,
    mirror: Option<Box<dyn OutputSink>>,
}

impl OutputBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            limit: limit.max(1),
            mirror: None,
        }
    }

    pub fn set_mirror(&mut self, mirror: Box<dyn OutputSink>) {
        self.mirror = Some(mirror);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append command output: one trailing newline is dropped, then each
    /// line becomes a row.
    pub fn push_text(&mut self, text: &str) {
        let text = text.strip_suffix('\n').unwrap_or(text);
        if text.is_empty() {
            return;
        }
        for row in text.split('\n') {
            self.emit(row);
        }
    }

    fn push(&mut self, line: &str) {
        self.lines.push_back(line.to_string());
        while self.lines.len() > self.limit {
            self.lines.pop_front();
        }
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, line: &str) {
        self.push(line);
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.emit(line);
        }
    }

    fn echo(&mut self, line: &str) {
        self.push(line);
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.echo(line);
        }
    }

    fn clear(&mut self) {
        self.lines.clear();
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.clear();
        }
    }
}

impl std::fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("lines", &self.lines.len())
            .field("limit", &self.limit)
            .field("mirror", &self.mirror.is_some())
            .finish()
    }
}

/// Result of feeding one key to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    /// A line was submitted and run.
    Executed,
    /// Ctrl+D on an empty line.
    Exit,
}

pub struct Terminal {
    shell: Shell,
    services: Services,
    output: OutputBuffer,
    editor: LineEditor,
}

impl Terminal {
    pub fn new(shell: Shell, services: Services) -> Self {
        let output = OutputBuffer::new(services.config.output_lines);
        Self {
            shell,
            services,
            output,
            editor: LineEditor::new(),
        }
    }

    pub fn with_mirror(mut self, mirror: Box<dyn OutputSink>) -> Self {
        self.output.set_mirror(mirror);
        self
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut Shell {
        &mut self.shell
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    /// `user@host:cwd$ `, with the home directory shown as `~`.
    pub fn prompt(&self) -> String {
        let state = &self.shell.state;
        let user = state.var("USER").unwrap_or(&self.services.config.user);
        let home = state.home();
        let cwd = if state.cwd == home {
            "~".to_string()
        } else if home != "/" && path::is_within(&state.cwd, home) {
            format!("~{}", &state.cwd[home.len()..])
        } else {
            state.cwd.clone()
        };
        format!("{user}@{}:{cwd}$ ", self.services.config.hostname)
    }

    /// The input row as it should be drawn: the search prompt while
    /// searching, otherwise the prompt plus the line.
    pub fn input_row(&self) -> String {
        self.editor
            .search_prompt(&self.shell.state)
            .unwrap_or_else(|| format!("{}{}", self.prompt(), self.editor.line()))
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match self.editor.handle_key(key, &mut self.shell.state) {
            EditEvent::Edited => KeyOutcome::Continue,
            EditEvent::Submit(line) => {
                self.submit(&line);
                KeyOutcome::Executed
            },
            EditEvent::Complete => {
                self.complete();
                KeyOutcome::Continue
            },
            EditEvent::ClearScreen => {
                self.output.clear();
                KeyOutcome::Continue
            },
            EditEvent::Interrupt(line) => {
                let row = format!("{}{line}^C", self.prompt());
                self.output.echo(&row);
                KeyOutcome::Continue
            },
            EditEvent::Eof => KeyOutcome::Exit,
        }
    }

    /// Echo and run a complete line.
    pub fn submit(&mut self, line: &str) {
        let row = format!("{}{line}", self.prompt());
        self.output.echo(&row);
        match self
            .shell
            .execute(line, &mut self.services, &mut self.output)
        {
            CommandOutput::Text(text) => self.output.push_text(&text),
            CommandOutput::Clear => self.output.clear(),
            CommandOutput::None => {},
        }
    }

    // -- Tab completion --

    fn complete(&mut self) {
        let before = self.editor.before_cursor();
        let word_start = before
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8());
        let word = &before[word_start..];
        let first_word = before[..word_start].split_whitespace().next();

        let candidates = match first_word {
            None => self.command_candidates(word),
            Some(cmd) if APP_ARG_COMMANDS.contains(&cmd) => self.app_candidates(word),
            Some(_) => self.path_candidates(word),
        };

        match candidates.as_slice() {
            [] => {},
            [only] => {
                let n = word.chars().count();
                self.editor.replace_before_cursor(n, only);
            },
            many => {
                let row = format!("{}{}", self.prompt(), self.editor.line());
                self.output.echo(&row);
                let names: Vec<&str> = many.iter().map(|c| c.trim_end()).collect();
                self.output.emit(&names.join("  "));
            },
        }
    }

    fn command_candidates(&self, partial: &str) -> Vec<String> {
        let mut names = self.shell.registry().completions(partial);
        names.extend(
            self.shell
                .state
                .aliases
                .keys()
                .filter(|a| a.starts_with(partial))
                .cloned(),
        );
        names.sort();
        names.dedup();
        names.into_iter().map(|n| format!("{n} ")).collect()
    }

    fn app_candidates(&self, partial: &str) -> Vec<String> {
        let lower = partial.to_ascii_lowercase();
        self.services
            .config
            .apps
            .iter()
            .filter(|a| a.starts_with(&lower))
            .map(|a| format!("{a} "))
            .collect()
    }

    /// Directory entries matching the last path component of `partial`.
    /// Directories complete with a trailing `/`.
    fn path_candidates(&self, partial: &str) -> Vec<String> {
        let Some(fs) = self.services.fs.as_ref() else {
            return Vec::new();
        };
        let (dir_written, name) = match partial.rfind('/') {
            Some(i) => (&partial[..=i], &partial[i + 1..]),
            None => ("", partial),
        };
        let state = &self.shell.state;
        let dir = if dir_written.is_empty() {
            state.cwd.clone()
        } else {
            path::resolve(&state.cwd, state.home(), dir_written)
        };
        let Ok(entries) = fs.list_directory(&dir) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter(|e| e.name().starts_with(name))
            .filter(|e| !e.name().starts_with('.') || name.starts_with('.'))
            .map(|e| {
                let suffix = if e.is_dir() { "/" } else { " " };
                format!("{dir_written}{}{suffix}", e.name())
            })
            .collect()
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("cwd", &self.shell.state.cwd)
            .field("output", &self.output)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use deskterm_store::{FileSystem, Scaffold};
    use deskterm_types::config::DesktermConfig;

    use super::*;

    fn terminal() -> Terminal {
        let config = DesktermConfig {
            output_lines: 50,
            ..DesktermConfig::default()
        };
        let mut fs = FileSystem::in_memory();
        fs.ensure_scaffolding(&Scaffold::standard(&config.user, &config.hostname))
            .unwrap();
        let shell = Shell::with_builtins(&config);
        Terminal::new(shell, Services::new(Some(fs), config))
    }

    fn type_line(t: &mut Terminal, text: &str) {
        for c in text.chars() {
            t.handle_key(Key::Char(c));
        }
    }

    fn rows(t: &Terminal) -> Vec<&str> {
        t.output().lines().collect()
    }

    #[test]
    fn prompt_uses_tilde() {
        let mut t = terminal();
        assert_eq!(t.prompt(), "guest@deskterm:~$ ");
        t.submit("cd documents");
        assert_eq!(t.prompt(), "guest@deskterm:~/documents$ ");
        t.submit("cd /etc");
        assert_eq!(t.prompt(), "guest@deskterm:/etc$ ");
    }

    #[test]
    fn enter_echoes_and_runs() {
        let mut t = terminal();
        type_line(&mut t, "echo hi");
        assert_eq!(t.handle_key(Key::Enter), KeyOutcome::Executed);
        assert_eq!(rows(&t), vec!["guest@deskterm:~$ echo hi", "hi"]);
        assert_eq!(t.shell().state.history(), ["echo hi"]);
    }

    #[test]
    fn clear_command_and_ctrl_l() {
        let mut t = terminal();
        t.submit("echo one");
        t.submit("clear");
        assert!(t.output().is_empty());
        t.submit("echo two");
        t.handle_key(Key::Ctrl('l'));
        assert!(t.output().is_empty());
    }

    #[test]
    fn ctrl_c_and_ctrl_d() {
        let mut t = terminal();
        type_line(&mut t, "partial");
        t.handle_key(Key::Ctrl('c'));
        assert_eq!(rows(&t), vec!["guest@deskterm:~$ partial^C"]);
        assert_eq!(t.handle_key(Key::Ctrl('d')), KeyOutcome::Exit);
    }

    #[test]
    fn output_is_bounded() {
        let mut t = terminal();
        for i in 0..40 {
            t.submit(&format!("echo {i}"));
        }
        assert_eq!(t.output().len(), 50);
        assert_eq!(rows(&t).last(), Some(&"39"));
    }

    #[test]
    fn up_arrow_recalls_history() {
        let mut t = terminal();
        t.submit("pwd");
        t.submit("whoami");
        t.handle_key(Key::Up);
        assert_eq!(t.editor().line(), "whoami");
        t.handle_key(Key::Up);
        assert_eq!(t.editor().line(), "pwd");
        t.handle_key(Key::Enter);
        assert_eq!(rows(&t).last(), Some(&"/home/guest"));
    }

    #[test]
    fn tab_completes_unique_command() {
        let mut t = terminal();
        type_line(&mut t, "who");
        t.handle_key(Key::Tab);
        assert_eq!(t.editor().line(), "whoami ");
    }

    #[test]
    fn tab_lists_ambiguous_commands() {
        let mut t = terminal();
        type_line(&mut t, "c");
        t.handle_key(Key::Tab);
        assert_eq!(t.editor().line(), "c");
        let listing = rows(&t).last().copied().unwrap_or_default();
        assert!(listing.contains("cat"));
        assert!(listing.contains("cd"));
    }

    #[test]
    fn tab_completes_paths() {
        let mut t = terminal();
        type_line(&mut t, "cat rea");
        t.handle_key(Key::Tab);
        assert_eq!(t.editor().line(), "cat readme.txt ");

        let mut t = terminal();
        type_line(&mut t, "cd doc");
        t.handle_key(Key::Tab);
        assert_eq!(t.editor().line(), "cd documents/");
        type_line(&mut t, "no");
        t.handle_key(Key::Tab);
        assert_eq!(t.editor().line(), "cd documents/notes.txt ");
    }

    #[test]
    fn tab_after_multibyte_space() {
        let mut t = terminal();
        type_line(&mut t, "cat\u{a0}rea");
        t.handle_key(Key::Tab);
        assert_eq!(t.editor().line(), "cat\u{a0}readme.txt ");

        let mut t = terminal();
        type_line(&mut t, "ls\u{3000}");
        assert_eq!(t.handle_key(Key::Tab), KeyOutcome::Continue);
        assert_eq!(t.editor().line(), "ls\u{3000}");
    }

    #[test]
    fn tab_completes_app_ids() {
        let mut t = terminal();
        type_line(&mut t, "open wor");
        t.handle_key(Key::Tab);
        assert_eq!(t.editor().line(), "open wordle ");
    }

    #[test]
    fn search_row_replaces_prompt() {
        let mut t = terminal();
        t.submit("echo needle");
        t.handle_key(Key::Ctrl('r'));
        type_line(&mut t, "need");
        assert_eq!(t.input_row(), "(reverse-i-search)`need': echo needle");
    }

    #[test]
    fn mirror_receives_rows() {
        use std::cell::RefCell;
        use std::rc::Rc;

        #[derive(Clone, Default)]
        struct Shared(Rc<RefCell<Vec<String>>>);
        impl OutputSink for Shared {
            fn emit(&mut self, line: &str) {
                self.0.borrow_mut().push(line.to_string());
            }
            fn echo(&mut self, _line: &str) {}
        }

        let shared = Shared::default();
        let mut t = terminal().with_mirror(Box::new(shared.clone()));
        t.submit("echo mirrored");
        assert_eq!(*shared.0.borrow(), vec!["mirrored"]);
    }
}
