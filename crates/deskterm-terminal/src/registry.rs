//! Command registry: name -> handler table.

use std::collections::{BTreeMap, HashMap};

use crate::interpreter::Command;

/// Public description of a registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
    pub category: String,
    pub usage: String,
}

impl CommandInfo {
    fn of(cmd: &dyn Command) -> Self {
        Self {
            name: cmd.name().to_ascii_lowercase(),
            description: cmd.description().to_string(),
            category: cmd.category().to_string(),
            usage: cmd.usage().to_string(),
        }
    }
}

/// Registry of available commands. Names are case-insensitive.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let name = cmd.name().to_ascii_lowercase();
        if self.commands.insert(name.clone(), cmd).is_some() {
            log::debug!("command '{name}' re-registered");
        }
    }

    /// Look up a command by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .get(&name.to_ascii_lowercase())
            .map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Sorted command names.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Descriptions of every command, sorted by name.
    pub fn commands(&self) -> Vec<CommandInfo> {
        let mut infos: Vec<CommandInfo> = self
            .commands
            .values()
            .map(|c| CommandInfo::of(c.as_ref()))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Commands grouped by category; both levels sorted.
    pub fn by_category(&self) -> BTreeMap<String, Vec<CommandInfo>> {
        let mut groups: BTreeMap<String, Vec<CommandInfo>> = BTreeMap::new();
        for info in self.commands() {
            groups.entry(info.category.clone()).or_default().push(info);
        }
        groups
    }

    /// Command names starting with `partial` (case-insensitive), sorted.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        let lower = partial.to_ascii_lowercase();
        self.command_names()
            .into_iter()
            .filter(|name| name.starts_with(&lower))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{CommandOutput, Environment};
    use deskterm_types::error::Result;

    struct Named(&'static str, &'static str, &'static str);
    impl Command for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            self.1
        }
        fn usage(&self) -> &str {
            self.0
        }
        fn category(&self) -> &str {
            self.2
        }
        fn execute(&self, _: &[&str], _: &mut Environment<'_>) -> Result<CommandOutput> {
            Ok(CommandOutput::Text(self.1.to_string()))
        }
    }

    #[test]
    fn register_twice_keeps_latest() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(Named("greet", "first", "fun")));
        reg.register(Box::new(Named("GREET", "second", "fun")));
        assert_eq!(reg.command_names(), vec!["greet"]);
        assert_eq!(reg.get("greet").unwrap().description(), "second");
    }

    #[test]
    fn lookup_ignores_case() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(Named("ls", "list", "filesystem")));
        assert!(reg.get("LS").is_some());
        assert!(reg.get("nope").is_none());
    }

    #[test]
    fn grouped_by_category() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(Named("b", "", "text")));
        reg.register(Box::new(Named("a", "", "text")));
        reg.register(Box::new(Named("z", "", "fun")));
        let groups = reg.by_category();
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["fun", "text"]);
        let text: Vec<&str> = groups["text"].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(text, vec!["a", "b"]);
    }

    #[test]
    fn completions_by_prefix() {
        let mut reg = CommandRegistry::new();
        for n in ["cat", "cd", "cp", "ls"] {
            reg.register(Box::new(Named(n, "", "filesystem")));
        }
        assert_eq!(reg.completions("c"), vec!["cat", "cd", "cp"]);
        assert_eq!(reg.completions("CA"), vec!["cat"]);
        assert!(reg.completions("x").is_empty());
    }
}
