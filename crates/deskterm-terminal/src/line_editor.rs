//! Single-line input editor with emacs-style control keys, history recall
//! and reverse incremental search.

use deskterm_types::input::Key;

use crate::state::ShellState;

/// What the terminal should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    /// The buffer or cursor may have changed; nothing else to do.
    Edited,
    /// Enter: run this line.
    Submit(String),
    /// Tab: complete the word before the cursor.
    Complete,
    /// Ctrl+L.
    ClearScreen,
    /// Ctrl+C: the abandoned line.
    Interrupt(String),
    /// Ctrl+D on an empty line.
    Eof,
}

/// Reverse-i-search progress.
#[derive(Debug, Clone, Default)]
struct Search {
    query: String,
    /// History index of the current match.
    found: Option<usize>,
    /// Line to restore when the search is cancelled.
    saved: String,
}

#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    buffer: Vec<char>,
    /// Char index into `buffer`.
    cursor: usize,
    /// Line being typed before history recall started.
    draft: Option<String>,
    search: Option<Search>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Text before the cursor.
    pub fn before_cursor(&self) -> String {
        self.buffer[..self.cursor].iter().collect()
    }

    /// Replace the buffer, cursor at the end.
    pub fn set_line(&mut self, line: &str) {
        self.buffer = line.chars().collect();
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Replace the `n` chars before the cursor with `text`.
    pub fn replace_before_cursor(&mut self, n: usize, text: &str) {
        let start = self.cursor.saturating_sub(n);
        let inserted: Vec<char> = text.chars().collect();
        let len = inserted.len();
        self.buffer.splice(start..self.cursor, inserted);
        self.cursor = start + len;
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    /// `(reverse-i-search)`query': match` while searching.
    pub fn search_prompt(&self, state: &ShellState) -> Option<String> {
        let search = self.search.as_ref()?;
        let found = search
            .found
            .and_then(|i| state.history().get(i))
            .map_or("", String::as_str);
        Some(format!("(reverse-i-search)`{}': {found}", search.query))
    }

    pub fn handle_key(&mut self, key: Key, state: &mut ShellState) -> EditEvent {
        // `None` means the search ended and the key applies to the accepted line.
        if self.search.is_some()
            && let Some(event) = self.handle_search_key(key, state)
        {
            return event;
        }

        match key {
            Key::Char(c) => self.insert(c),
            Key::Enter => return self.submit(state),
            Key::Tab => return EditEvent::Complete,
            Key::Backspace | Key::Ctrl('h') => self.delete_back(),
            Key::Delete => self.delete_forward(),
            Key::Left | Key::Ctrl('b') => self.cursor = self.cursor.saturating_sub(1),
            Key::Right | Key::Ctrl('f') => self.cursor = (self.cursor + 1).min(self.buffer.len()),
            Key::Home | Key::Ctrl('a') => self.cursor = 0,
            Key::End | Key::Ctrl('e') => self.cursor = self.buffer.len(),
            Key::Up => self.recall_previous(state),
            Key::Down => self.recall_next(state),
            Key::Ctrl('w') => self.delete_word(),
            Key::Ctrl('u') => {
                self.buffer.drain(..self.cursor);
                self.cursor = 0;
            },
            Key::Ctrl('k') => self.buffer.truncate(self.cursor),
            Key::Ctrl('t') => self.transpose(),
            Key::Ctrl('d') => {
                if self.buffer.is_empty() {
                    return EditEvent::Eof;
                }
                self.delete_forward();
            },
            Key::Ctrl('l') => return EditEvent::ClearScreen,
            Key::Ctrl('c') => {
                let line = self.line();
                self.reset(state);
                return EditEvent::Interrupt(line);
            },
            Key::Ctrl('r') => {
                self.search = Some(Search {
                    saved: self.line(),
                    ..Search::default()
                });
            },
            Key::Ctrl(_) | Key::Escape => {},
        }
        EditEvent::Edited
    }

    fn submit(&mut self, state: &mut ShellState) -> EditEvent {
        let line = self.line();
        self.reset(state);
        EditEvent::Submit(line)
    }

    fn reset(&mut self, state: &mut ShellState) {
        self.clear();
        self.draft = None;
        self.search = None;
        state.reset_recall();
    }

    // -- Editing --

    fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
    }

    fn delete_forward(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    /// Delete the word before the cursor, and any whitespace after it.
    fn delete_word(&mut self) {
        let mut start = self.cursor;
        while start > 0 && self.buffer[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !self.buffer[start - 1].is_whitespace() {
            start -= 1;
        }
        self.buffer.drain(start..self.cursor);
        self.cursor = start;
    }

    /// Swap the two chars around the cursor (the last two at end of line).
    fn transpose(&mut self) {
        let len = self.buffer.len();
        if len < 2 || self.cursor == 0 {
            return;
        }
        if self.cursor == len {
            self.buffer.swap(len - 2, len - 1);
        } else {
            self.buffer.swap(self.cursor - 1, self.cursor);
            self.cursor += 1;
        }
    }

    // -- History recall --

    fn recall_previous(&mut self, state: &mut ShellState) {
        if state.history_index().is_none() {
            self.draft = Some(self.line());
        }
        if let Some(entry) = state.recall_previous().map(String::from) {
            self.set_line(&entry);
        }
    }

    fn recall_next(&mut self, state: &mut ShellState) {
        if state.history_index().is_none() {
            return;
        }
        match state.recall_next().map(String::from) {
            Some(entry) => self.set_line(&entry),
            None => {
                let draft = self.draft.take().unwrap_or_default();
                self.set_line(&draft);
            },
        }
    }

    // -- Reverse search --

    /// Handle a key while searching. `None` means the search was accepted
    /// and the key should be processed as a normal edit.
    fn handle_search_key(&mut self, key: Key, state: &mut ShellState) -> Option<EditEvent> {
        let search = self.search.as_mut()?;
        match key {
            Key::Char(c) => {
                search.query.push(c);
                search.found = find_back(state.history(), &search.query, state.history().len());
            },
            Key::Backspace | Key::Ctrl('h') => {
                search.query.pop();
                search.found = find_back(state.history(), &search.query, state.history().len());
            },
            Key::Ctrl('r') => {
                let from = search.found.unwrap_or(state.history().len());
                if let Some(older) = find_back(state.history(), &search.query, from) {
                    search.found = Some(older);
                }
            },
            Key::Escape | Key::Ctrl('g') => {
                let saved = std::mem::take(&mut search.saved);
                self.search = None;
                self.set_line(&saved);
            },
            Key::Ctrl('c') => {
                let line = std::mem::take(&mut search.saved);
                self.reset(state);
                return Some(EditEvent::Interrupt(line));
            },
            _ => {
                self.accept_search(state);
                return None;
            },
        }
        Some(EditEvent::Edited)
    }

    fn accept_search(&mut self, state: &ShellState) {
        if let Some(search) = self.search.take() {
            let line = match search.found.and_then(|i| state.history().get(i)) {
                Some(entry) => entry.clone(),
                None => search.saved,
            };
            self.set_line(&line);
        }
    }
}

/// Newest history index below `before` whose entry contains `query`.
fn find_back(history: &[String], query: &str, before: usize) -> Option<usize> {
    if query.is_empty() {
        return None;
    }
    history[..before.min(history.len())]
        .iter()
        .rposition(|entry| entry.contains(query))
}

#[cfg(test)]
mod tests {
    use deskterm_types::config::DesktermConfig;

    use super::*;

    fn state_with(history: &[&str]) -> ShellState {
        let mut s = ShellState::new(&DesktermConfig::default());
        s.restore_history(history.iter().copied());
        s
    }

    fn type_str(ed: &mut LineEditor, s: &mut ShellState, text: &str) {
        for c in text.chars() {
            ed.handle_key(Key::Char(c), s);
        }
    }

    #[test]
    fn typing_and_cursor_movement() {
        let mut s = state_with(&[]);
        let mut ed = LineEditor::new();
        type_str(&mut ed, &mut s, "helo");
        ed.handle_key(Key::Left, &mut s);
        ed.handle_key(Key::Char('l'), &mut s);
        assert_eq!(ed.line(), "hello");
        ed.handle_key(Key::Ctrl('a'), &mut s);
        assert_eq!(ed.cursor(), 0);
        ed.handle_key(Key::Ctrl('f'), &mut s);
        ed.handle_key(Key::Ctrl('h'), &mut s);
        assert_eq!(ed.line(), "ello");
        ed.handle_key(Key::Ctrl('e'), &mut s);
        assert_eq!(ed.cursor(), 4);
    }

    #[test]
    fn enter_submits_and_clears() {
        let mut s = state_with(&[]);
        let mut ed = LineEditor::new();
        type_str(&mut ed, &mut s, "ls -l");
        assert_eq!(ed.handle_key(Key::Enter, &mut s), EditEvent::Submit("ls -l".into()));
        assert!(ed.is_empty());
    }

    #[test]
    fn kill_commands() {
        let mut s = state_with(&[]);
        let mut ed = LineEditor::new();
        type_str(&mut ed, &mut s, "echo hello world");
        ed.handle_key(Key::Ctrl('w'), &mut s);
        assert_eq!(ed.line(), "echo hello ");
        ed.handle_key(Key::Ctrl('w'), &mut s);
        assert_eq!(ed.line(), "echo ");
        type_str(&mut ed, &mut s, "abc");
        ed.handle_key(Key::Left, &mut s);
        ed.handle_key(Key::Ctrl('k'), &mut s);
        assert_eq!(ed.line(), "echo ab");
        ed.handle_key(Key::Ctrl('u'), &mut s);
        assert_eq!(ed.line(), "");
    }

    #[test]
    fn transpose_chars() {
        let mut s = state_with(&[]);
        let mut ed = LineEditor::new();
        type_str(&mut ed, &mut s, "sl");
        ed.handle_key(Key::Ctrl('t'), &mut s);
        assert_eq!(ed.line(), "ls");
        type_str(&mut ed, &mut s, " ab");
        ed.handle_key(Key::Left, &mut s);
        ed.handle_key(Key::Ctrl('t'), &mut s);
        assert_eq!(ed.line(), "ls ba");
    }

    #[test]
    fn ctrl_d_is_eof_only_when_empty() {
        let mut s = state_with(&[]);
        let mut ed = LineEditor::new();
        type_str(&mut ed, &mut s, "ab");
        ed.handle_key(Key::Home, &mut s);
        assert_eq!(ed.handle_key(Key::Ctrl('d'), &mut s), EditEvent::Edited);
        assert_eq!(ed.line(), "b");
        ed.handle_key(Key::Delete, &mut s);
        assert_eq!(ed.handle_key(Key::Ctrl('d'), &mut s), EditEvent::Eof);
    }

    #[test]
    fn ctrl_c_interrupts() {
        let mut s = state_with(&[]);
        let mut ed = LineEditor::new();
        type_str(&mut ed, &mut s, "oops");
        assert_eq!(ed.handle_key(Key::Ctrl('c'), &mut s), EditEvent::Interrupt("oops".into()));
        assert!(ed.is_empty());
    }

    #[test]
    fn history_recall_restores_draft() {
        let mut s = state_with(&["first", "second"]);
        let mut ed = LineEditor::new();
        type_str(&mut ed, &mut s, "dra");
        ed.handle_key(Key::Up, &mut s);
        assert_eq!(ed.line(), "second");
        ed.handle_key(Key::Up, &mut s);
        assert_eq!(ed.line(), "first");
        ed.handle_key(Key::Down, &mut s);
        assert_eq!(ed.line(), "second");
        ed.handle_key(Key::Down, &mut s);
        assert_eq!(ed.line(), "dra");
        assert_eq!(s.history(), ["first", "second"]);
    }

    #[test]
    fn reverse_search() {
        let mut s = state_with(&["cat notes.txt", "ls", "cat readme.txt", "pwd"]);
        let mut ed = LineEditor::new();
        ed.handle_key(Key::Ctrl('r'), &mut s);
        type_str(&mut ed, &mut s, "cat");
        assert_eq!(
            ed.search_prompt(&s).as_deref(),
            Some("(reverse-i-search)`cat': cat readme.txt")
        );
        ed.handle_key(Key::Ctrl('r'), &mut s);
        assert_eq!(
            ed.search_prompt(&s).as_deref(),
            Some("(reverse-i-search)`cat': cat notes.txt")
        );
        assert_eq!(
            ed.handle_key(Key::Enter, &mut s),
            EditEvent::Submit("cat notes.txt".into())
        );
        assert!(!ed.is_searching());
    }

    #[test]
    fn reverse_search_cancel_and_accept_with_edit() {
        let mut s = state_with(&["echo hi"]);
        let mut ed = LineEditor::new();
        type_str(&mut ed, &mut s, "draft");
        ed.handle_key(Key::Ctrl('r'), &mut s);
        type_str(&mut ed, &mut s, "ech");
        ed.handle_key(Key::Escape, &mut s);
        assert_eq!(ed.line(), "draft");

        ed.clear();
        ed.handle_key(Key::Ctrl('r'), &mut s);
        type_str(&mut ed, &mut s, "hi");
        ed.handle_key(Key::End, &mut s);
        ed.handle_key(Key::Char('!'), &mut s);
        assert_eq!(ed.line(), "echo hi!");
    }

    #[test]
    fn replace_before_cursor_for_completion() {
        let mut s = state_with(&[]);
        let mut ed = LineEditor::new();
        type_str(&mut ed, &mut s, "cat rea");
        ed.replace_before_cursor(3, "readme.txt ");
        assert_eq!(ed.line(), "cat readme.txt ");
        assert_eq!(ed.cursor(), 15);
    }
}
