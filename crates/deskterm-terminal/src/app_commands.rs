//! App commands: open and apps.

use deskterm_types::error::{DesktermError, Result};

use crate::commands::usage_error;
use crate::interpreter::{Command, CommandOutput, Environment};

struct OpenCmd;
impl Command for OpenCmd {
    fn name(&self) -> &str {
        "open"
    }
    fn description(&self) -> &str {
        "Launch an app"
    }
    fn usage(&self) -> &str {
        "open <app>"
    }
    fn category(&self) -> &str {
        "apps"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&requested) = args.first() else {
            return Err(usage_error(self.usage()));
        };
        let app = requested.to_ascii_lowercase();
        if !env.config().apps.contains(&app) {
            return Err(DesktermError::Command(format!(
                "open: unknown app: {requested}\nAvailable: {}",
                env.config().apps.join(", ")
            )));
        }
        let launcher = env
            .services
            .launcher
            .as_deref()
            .ok_or_else(|| DesktermError::Command("open: no window manager attached".to_string()))?;
        launcher.launch(&app)?;
        Ok(CommandOutput::Text(format!("Opening {app}...")))
    }
}

struct AppsCmd;
impl Command for AppsCmd {
    fn name(&self) -> &str {
        "apps"
    }
    fn description(&self) -> &str {
        "List apps that can be opened"
    }
    fn usage(&self) -> &str {
        "apps"
    }
    fn category(&self) -> &str {
        "apps"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.config().apps.join("\n")))
    }
}

/// Register app commands.
pub fn register_app_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(OpenCmd));
    reg.register(Box::new(AppsCmd));
}
