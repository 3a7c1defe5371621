//! System commands: identity, time, environment, aliases, history, process
//! tables and filesystem maintenance.

use std::time::{SystemTime, UNIX_EPOCH};

use deskterm_store::Scaffold;
use deskterm_types::error::{DesktermError, Result};

use crate::commands::{days_to_ymd, usage_error};
use crate::interpreter::{Command, CommandOutput, Environment};

// ---------------------------------------------------------------------------
// whoami / hostname / uname
// ---------------------------------------------------------------------------

struct WhoamiCmd;
impl Command for WhoamiCmd {
    fn name(&self) -> &str {
        "whoami"
    }
    fn description(&self) -> &str {
        "Print current user"
    }
    fn usage(&self) -> &str {
        "whoami"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let user = env.state.var("USER").unwrap_or(&env.services.config.user);
        Ok(CommandOutput::Text(user.to_string()))
    }
}

struct HostnameCmd;
impl Command for HostnameCmd {
    fn name(&self) -> &str {
        "hostname"
    }
    fn description(&self) -> &str {
        "Print host name"
    }
    fn usage(&self) -> &str {
        "hostname"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.config().hostname.clone()))
    }
}

struct UnameCmd;
impl Command for UnameCmd {
    fn name(&self) -> &str {
        "uname"
    }
    fn description(&self) -> &str {
        "Print system information"
    }
    fn usage(&self) -> &str {
        "uname [-a]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.contains(&"-a") {
            return Ok(CommandOutput::Text(format!(
                "Deskterm {} {} {} deskterm",
                env.config().hostname,
                env!("CARGO_PKG_VERSION"),
                std::env::consts::ARCH,
            )));
        }
        Ok(CommandOutput::Text("Deskterm".to_string()))
    }
}

// ---------------------------------------------------------------------------
// date
// ---------------------------------------------------------------------------

const WEEKDAYS: [&str; 7] = ["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

struct DateCmd;
impl Command for DateCmd {
    fn name(&self) -> &str {
        "date"
    }
    fn description(&self) -> &str {
        "Print the current date and time (UTC)"
    }
    fn usage(&self) -> &str {
        "date"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DesktermError::Command(format!("date: clock error: {e}")))?
            .as_secs();
        Ok(CommandOutput::Text(format_date(secs)))
    }
}

/// `Thu Jan  1 00:00:00 UTC 1970` style.
fn format_date(secs: u64) -> String {
    let days = secs / 86_400;
    let (y, m, d) = days_to_ymd(days);
    let rem = secs % 86_400;
    format!(
        "{} {} {d:>2} {:02}:{:02}:{:02} UTC {y}",
        WEEKDAYS[(days % 7) as usize],
        MONTHS[(m - 1) as usize],
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60,
    )
}

// ---------------------------------------------------------------------------
// env / export / unset
// ---------------------------------------------------------------------------

struct EnvCmd;
impl Command for EnvCmd {
    fn name(&self) -> &str {
        "env"
    }
    fn description(&self) -> &str {
        "List environment variables"
    }
    fn usage(&self) -> &str {
        "env"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let lines: Vec<String> = env
            .state
            .env
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct ExportCmd;
impl Command for ExportCmd {
    fn name(&self) -> &str {
        "export"
    }
    fn description(&self) -> &str {
        "Set environment variables"
    }
    fn usage(&self) -> &str {
        "export [NAME=value...]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            let lines: Vec<String> = env
                .state
                .env
                .iter()
                .map(|(k, v)| format!("declare -x {k}=\"{v}\""))
                .collect();
            return Ok(CommandOutput::Text(lines.join("\n")));
        }
        for &arg in args {
            let (name, value) = arg.split_once('=').unwrap_or((arg, ""));
            if !is_identifier(name) {
                return Err(DesktermError::Command(format!(
                    "export: not a valid identifier: {name}"
                )));
            }
            if !arg.contains('=') && env.state.env.contains_key(name) {
                continue;
            }
            env.state.env.insert(name.to_string(), value.to_string());
        }
        Ok(CommandOutput::None)
    }
}

struct UnsetCmd;
impl Command for UnsetCmd {
    fn name(&self) -> &str {
        "unset"
    }
    fn description(&self) -> &str {
        "Remove environment variables"
    }
    fn usage(&self) -> &str {
        "unset <NAME...>"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(usage_error(self.usage()));
        }
        for name in args {
            env.state.env.remove(*name);
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// alias / unalias
// ---------------------------------------------------------------------------

struct AliasCmd;
impl Command for AliasCmd {
    fn name(&self) -> &str {
        "alias"
    }
    fn description(&self) -> &str {
        "Define or list aliases"
    }
    fn usage(&self) -> &str {
        "alias [name=value...]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            let lines: Vec<String> = env
                .state
                .aliases
                .iter()
                .map(|(k, v)| format!("alias {k}='{v}'"))
                .collect();
            return Ok(CommandOutput::Text(lines.join("\n")));
        }
        let mut shown = Vec::new();
        for arg in args {
            match arg.split_once('=') {
                Some((name, value)) if !name.is_empty() => {
                    env.state
                        .aliases
                        .insert(name.to_string(), value.to_string());
                },
                Some(_) => return Err(usage_error(self.usage())),
                None => match env.state.aliases.get(*arg) {
                    Some(value) => shown.push(format!("alias {arg}='{value}'")),
                    None => {
                        return Err(DesktermError::Command(format!("alias: {arg}: not found")));
                    },
                },
            }
        }
        if shown.is_empty() {
            Ok(CommandOutput::None)
        } else {
            Ok(CommandOutput::Text(shown.join("\n")))
        }
    }
}

struct UnaliasCmd;
impl Command for UnaliasCmd {
    fn name(&self) -> &str {
        "unalias"
    }
    fn description(&self) -> &str {
        "Remove aliases"
    }
    fn usage(&self) -> &str {
        "unalias <name...>"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(usage_error(self.usage()));
        }
        for name in args {
            if env.state.aliases.remove(*name).is_none() {
                return Err(DesktermError::Command(format!("unalias: {name}: not found")));
            }
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

struct HistoryCmd;
impl Command for HistoryCmd {
    fn name(&self) -> &str {
        "history"
    }
    fn description(&self) -> &str {
        "Show or clear command history"
    }
    fn usage(&self) -> &str {
        "history [clear|N]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let limit = match args.first() {
            Some(&"clear" | &"-c") => {
                env.state.clear_history();
                return Ok(CommandOutput::Text("History cleared.".to_string()));
            },
            Some(n) => Some(n.parse::<usize>().map_err(|_| {
                DesktermError::Command(format!("history: numeric argument required: {n}"))
            })?),
            None => None,
        };

        let history = env.state.history();
        if history.is_empty() {
            return Ok(CommandOutput::Text("(no history)".to_string()));
        }
        let start = limit.map_or(0, |n| history.len().saturating_sub(n));
        let lines: Vec<String> = history
            .iter()
            .enumerate()
            .skip(start)
            .map(|(i, entry)| format!("  {:4}  {entry}", i + 1))
            .collect();
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// ps / top
// ---------------------------------------------------------------------------

/// Processes the desktop pretends to run.
const PROCESSES: &[(u32, &str, f32, u32)] = &[
    (1, "init", 0.0, 1_024),
    (42, "window-manager", 1.3, 18_432),
    (77, "dsh", 0.4, 4_096),
    (101, "wordle-helper", 0.1, 2_048),
    (133, "doom", 12.5, 65_536),
    (204, "sadtrombone", 0.0, 512),
    (311, "coffee-maker", 99.9, 128),
];

struct PsCmd;
impl Command for PsCmd {
    fn name(&self) -> &str {
        "ps"
    }
    fn description(&self) -> &str {
        "List processes"
    }
    fn usage(&self) -> &str {
        "ps"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let user = env.config().user.clone();
        let mut lines = vec!["  PID USER     CMD".to_string()];
        lines.extend(
            PROCESSES
                .iter()
                .map(|(pid, cmd, _, _)| format!("{pid:>5} {user:<8} {cmd}")),
        );
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

struct TopCmd;
impl Command for TopCmd {
    fn name(&self) -> &str {
        "top"
    }
    fn description(&self) -> &str {
        "Show a snapshot of resource usage"
    }
    fn usage(&self) -> &str {
        "top"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let total_cpu: f32 = PROCESSES.iter().map(|p| p.2).sum();
        let mut lines = vec![
            format!(
                "Tasks: {} total   CPU: {total_cpu:.1}%   Mem: 92160K used",
                PROCESSES.len()
            ),
            String::new(),
            "  PID  %CPU     RES COMMAND".to_string(),
        ];
        let mut sorted: Vec<_> = PROCESSES.iter().collect();
        sorted.sort_by(|a, b| b.2.total_cmp(&a.2));
        lines.extend(
            sorted
                .iter()
                .map(|(pid, cmd, cpu, res)| format!("{pid:>5} {cpu:>5.1} {res:>6}K {cmd}")),
        );
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// clear / reset / clearfs
// ---------------------------------------------------------------------------

struct ClearCmd;
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn description(&self) -> &str {
        "Clear the screen"
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Clear)
    }
}

struct ResetCmd;
impl Command for ResetCmd {
    fn name(&self) -> &str {
        "reset"
    }
    fn description(&self) -> &str {
        "Restore the default filesystem"
    }
    fn usage(&self) -> &str {
        "reset --filesystem"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if !args.contains(&"--filesystem") {
            return Err(DesktermError::Command(
                "reset: this erases every file and restores the defaults.\n\
                 Run 'reset --filesystem' to confirm."
                    .to_string(),
            ));
        }
        let scaffold = Scaffold::standard(&env.config().user, &env.config().hostname);
        env.fs()?.reset(&scaffold)?;
        let home = env.state.home().to_string();
        env.state.set_cwd(home);
        Ok(CommandOutput::Text("Filesystem reset to defaults.".to_string()))
    }
}

struct ClearfsCmd;
impl Command for ClearfsCmd {
    fn name(&self) -> &str {
        "clearfs"
    }
    fn description(&self) -> &str {
        "Remove every file and directory"
    }
    fn usage(&self) -> &str {
        "clearfs --force"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if !args.contains(&"--force") {
            return Err(DesktermError::Command(
                "clearfs: this removes everything except '/'.\n\
                 Run 'clearfs --force' to confirm."
                    .to_string(),
            ));
        }
        let removed = env.fs()?.clear()?;
        env.state.set_cwd("/".to_string());
        Ok(CommandOutput::Text(format!("Removed {removed} items.")))
    }
}

// ---------------------------------------------------------------------------
// help / which
// ---------------------------------------------------------------------------

/// Registered so they show up in listings and completion; the shell answers
/// them itself because they need the registry.
struct ShellBuiltin {
    name: &'static str,
    description: &'static str,
    usage: &'static str,
}

impl Command for ShellBuiltin {
    fn name(&self) -> &str {
        self.name
    }
    fn description(&self) -> &str {
        self.description
    }
    fn usage(&self) -> &str {
        self.usage
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Err(DesktermError::Command(format!(
            "{}: only available inside the shell",
            self.name
        )))
    }
}

/// Register system commands.
pub fn register_system_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(WhoamiCmd));
    reg.register(Box::new(HostnameCmd));
    reg.register(Box::new(UnameCmd));
    reg.register(Box::new(DateCmd));
    reg.register(Box::new(EnvCmd));
    reg.register(Box::new(ExportCmd));
    reg.register(Box::new(UnsetCmd));
    reg.register(Box::new(AliasCmd));
    reg.register(Box::new(UnaliasCmd));
    reg.register(Box::new(HistoryCmd));
    reg.register(Box::new(PsCmd));
    reg.register(Box::new(TopCmd));
    reg.register(Box::new(ClearCmd));
    reg.register(Box::new(ResetCmd));
    reg.register(Box::new(ClearfsCmd));
    reg.register(Box::new(ShellBuiltin {
        name: "help",
        description: "List commands or describe one",
        usage: "help [command]",
    }));
    reg.register(Box::new(ShellBuiltin {
        name: "which",
        description: "Show how a command name resolves",
        usage: "which <command...>",
    }));
}
