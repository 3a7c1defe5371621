//! Per-session shell state.

use std::collections::BTreeMap;

use deskterm_types::config::DesktermConfig;

/// Working directory, variables, aliases and history of one session.
#[derive(Debug, Clone)]
pub struct ShellState {
    /// Absolute path of the current directory.
    pub cwd: String,
    /// Directory `cd -` returns to.
    pub previous_dir: Option<String>,
    pub env: BTreeMap<String, String>,
    pub aliases: BTreeMap<String, String>,
    /// Exit status of the last command, exposed as `$?`.
    pub last_status: i32,
    history: Vec<String>,
    history_limit: usize,
    /// Recall cursor into `history`; `None` when editing a fresh line.
    history_index: Option<usize>,
}

impl ShellState {
    pub fn new(config: &DesktermConfig) -> Self {
        let home = config.home();
        let mut env = BTreeMap::new();
        env.insert("USER".to_string(), config.user.clone());
        env.insert("HOME".to_string(), home.clone());
        env.insert("HOSTNAME".to_string(), config.hostname.clone());
        env.insert("SHELL".to_string(), "/bin/dsh".to_string());
        env.insert("TERM".to_string(), "xterm-256color".to_string());
        env.insert("PATH".to_string(), "/bin".to_string());
        env.insert("PWD".to_string(), home.clone());

        let mut aliases = BTreeMap::new();
        aliases.insert("ll".to_string(), "ls -l".to_string());
        aliases.insert("la".to_string(), "ls -a".to_string());

        Self {
            cwd: home,
            previous_dir: None,
            env,
            aliases,
            last_status: 0,
            history: Vec::new(),
            history_limit: config.history_size.max(1),
            history_index: None,
        }
    }

    /// `$HOME`, falling back to `/`.
    pub fn home(&self) -> &str {
        self.env.get("HOME").map_or("/", String::as_str)
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    /// Change directory, remembering the old one and updating `PWD`/`OLDPWD`.
    pub fn set_cwd(&mut self, path: String) {
        let old = std::mem::replace(&mut self.cwd, path);
        self.env.insert("OLDPWD".to_string(), old.clone());
        self.env.insert("PWD".to_string(), self.cwd.clone());
        self.previous_dir = Some(old);
    }

    // -- History --

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Append a line unless it is empty or repeats the last entry. Drops the
    /// oldest entry past the limit and resets the recall cursor.
    pub fn push_history(&mut self, line: &str) {
        self.history_index = None;
        let line = line.trim();
        if line.is_empty() || self.history.last().is_some_and(|last| last == line) {
            return;
        }
        self.history.push(line.to_string());
        if self.history.len() > self.history_limit {
            let excess = self.history.len() - self.history_limit;
            self.history.drain(..excess);
        }
    }

    /// Replace history with previously saved entries (oldest first).
    pub fn restore_history<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.history.clear();
        for line in lines {
            self.push_history(line.as_ref());
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history_index = None;
    }

    /// Move the recall cursor one entry back and return that entry.
    pub fn recall_previous(&mut self) -> Option<&str> {
        if self.history.is_empty() {
            return None;
        }
        let idx = match self.history_index {
            None => self.history.len() - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.history_index = Some(idx);
        self.history.get(idx).map(String::as_str)
    }

    /// Move the recall cursor forward. `None` means the cursor moved past the
    /// newest entry, back to the fresh line.
    pub fn recall_next(&mut self) -> Option<&str> {
        match self.history_index {
            Some(i) if i + 1 < self.history.len() => {
                self.history_index = Some(i + 1);
                self.history.get(i + 1).map(String::as_str)
            },
            _ => {
                self.history_index = None;
                None
            },
        }
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    pub fn reset_recall(&mut self) {
        self.history_index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(limit: usize) -> ShellState {
        let config = DesktermConfig {
            history_size: limit,
            ..DesktermConfig::default()
        };
        ShellState::new(&config)
    }

    #[test]
    fn starts_at_home() {
        let s = state(10);
        assert_eq!(s.cwd, "/home/guest");
        assert_eq!(s.var("USER"), Some("guest"));
    }

    #[test]
    fn history_skips_consecutive_duplicates_and_blank() {
        let mut s = state(10);
        s.push_history("ls");
        s.push_history("ls");
        s.push_history("   ");
        s.push_history("pwd");
        s.push_history("ls");
        assert_eq!(s.history(), ["ls", "pwd", "ls"]);
    }

    #[test]
    fn history_is_bounded() {
        let mut s = state(3);
        for cmd in ["a", "b", "c", "d", "e"] {
            s.push_history(cmd);
        }
        assert_eq!(s.history(), ["c", "d", "e"]);
    }

    #[test]
    fn recall_walks_without_mutating() {
        let mut s = state(10);
        s.push_history("one");
        s.push_history("two");
        assert_eq!(s.recall_previous(), Some("two"));
        assert_eq!(s.recall_previous(), Some("one"));
        assert_eq!(s.recall_previous(), Some("one"));
        assert_eq!(s.recall_next(), Some("two"));
        assert_eq!(s.recall_next(), None);
        assert_eq!(s.history_index(), None);
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn set_cwd_tracks_previous() {
        let mut s = state(10);
        s.set_cwd("/tmp".to_string());
        assert_eq!(s.previous_dir.as_deref(), Some("/home/guest"));
        assert_eq!(s.var("OLDPWD"), Some("/home/guest"));
        assert_eq!(s.var("PWD"), Some("/tmp"));
    }
}
