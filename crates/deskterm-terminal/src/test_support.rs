//! Shared fixtures for command tests.

use deskterm_store::{FileSystem, Scaffold};
use deskterm_types::config::DesktermConfig;

use crate::interpreter::{CommandOutput, Shell};
use crate::registry::CommandRegistry;
use crate::services::Services;
use crate::state::ShellState;

pub(crate) struct Fixture {
    pub shell: Shell,
    pub services: Services,
    /// Rows streamed through the sink while commands ran.
    pub streamed: Vec<String>,
}

impl Fixture {
    /// Scaffolded in-memory filesystem and every built-in command.
    pub fn new() -> Self {
        let config = DesktermConfig::default();
        let shell = Shell::with_builtins(&config);
        Self::with_shell(shell, config)
    }

    /// Scaffolded in-memory filesystem and an empty registry.
    pub fn bare() -> Self {
        let config = DesktermConfig::default();
        let shell = Shell::new(CommandRegistry::new(), ShellState::new(&config));
        Self::with_shell(shell, config)
    }

    fn with_shell(shell: Shell, config: DesktermConfig) -> Self {
        let mut fs = FileSystem::in_memory();
        fs.ensure_scaffolding(&Scaffold::standard(&config.user, &config.hostname))
            .unwrap();
        Self {
            shell,
            services: Services::new(Some(fs), config),
            streamed: Vec::new(),
        }
    }

    /// Run a line and return its output text without the trailing newline.
    pub fn run(&mut self, line: &str) -> String {
        match self.output(line) {
            CommandOutput::Text(t) => t.strip_suffix('\n').unwrap_or(&t).to_string(),
            CommandOutput::None => String::new(),
            CommandOutput::Clear => "<clear>".to_string(),
        }
    }

    pub fn output(&mut self, line: &str) -> CommandOutput {
        self.shell
            .execute(line, &mut self.services, &mut self.streamed)
    }

    pub fn fs(&mut self) -> &mut FileSystem {
        self.services.fs.as_mut().unwrap()
    }
}
