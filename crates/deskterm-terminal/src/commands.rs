//! Built-in command registration and helpers shared by the command modules.

use deskterm_types::error::DesktermError;

use crate::registry::CommandRegistry;

/// Register every built-in command module, in a fixed order.
pub fn register_builtins(reg: &mut CommandRegistry) {
    crate::file_commands::register_file_commands(reg);
    crate::text_commands::register_text_commands(reg);
    crate::system_commands::register_system_commands(reg);
    crate::fun_commands::register_fun_commands(reg);
    crate::network_commands::register_network_commands(reg);
    crate::speech_commands::register_speech_commands(reg);
    crate::app_commands::register_app_commands(reg);
}

/// Arguments split into short flags, long flags and operands.
///
/// `-la` yields the flags `l` and `a`; `--` ends flag parsing; a lone `-`
/// is an operand.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Args<'a> {
    pub short: Vec<char>,
    pub long: Vec<&'a str>,
    pub operands: Vec<&'a str>,
}

impl<'a> Args<'a> {
    pub fn parse(args: &[&'a str]) -> Self {
        let mut parsed = Self::default();
        let mut rest = args.iter();
        for &arg in rest.by_ref() {
            if arg == "--" {
                break;
            }
            if let Some(name) = arg.strip_prefix("--") {
                parsed.long.push(name);
            } else if arg.len() > 1 && arg.starts_with('-') {
                parsed.short.extend(arg[1..].chars());
            } else {
                parsed.operands.push(arg);
            }
        }
        parsed.operands.extend(rest.copied());
        parsed
    }

    pub fn has(&self, flag: char) -> bool {
        self.short.contains(&flag)
    }

    pub fn has_long(&self, name: &str) -> bool {
        self.long.contains(&name)
    }
}

/// `usage: <usage>` as a command error.
pub(crate) fn usage_error(usage: &str) -> DesktermError {
    DesktermError::Command(format!("usage: {usage}"))
}

/// Milliseconds since the epoch (UTC) as `YYYY-MM-DD HH:MM`.
pub(crate) fn format_timestamp(millis: u64) -> String {
    let secs = millis / 1000;
    let (y, m, d) = days_to_ymd(secs / 86_400);
    let day_secs = secs % 86_400;
    format!(
        "{y:04}-{m:02}-{d:02} {:02}:{:02}",
        day_secs / 3600,
        (day_secs % 3600) / 60
    )
}

/// Civil date from days since 1970-01-01 (proleptic Gregorian).
pub(crate) fn days_to_ymd(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + u64::from(m <= 2);
    (y, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_split_clusters_and_operands() {
        let a = Args::parse(&["-la", "--force", "dir", "-", "--", "-x"]);
        assert_eq!(a.short, vec!['l', 'a']);
        assert_eq!(a.long, vec!["force"]);
        assert_eq!(a.operands, vec!["dir", "-", "-x"]);
        assert!(a.has('l'));
        assert!(!a.has('x'));
        assert!(a.has_long("force"));
    }

    #[test]
    fn epoch_dates() {
        assert_eq!(days_to_ymd(0), (1970, 1, 1));
        assert_eq!(days_to_ymd(59), (1970, 3, 1));
        assert_eq!(days_to_ymd(19_723), (2024, 1, 1));
        assert_eq!(format_timestamp(0), "1970-01-01 00:00");
        assert_eq!(format_timestamp(90_061_000), "1970-01-02 01:01");
    }

    #[test]
    fn builtins_cover_every_module() {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg);
        let groups = reg.by_category();
        for cat in ["filesystem", "text", "system", "fun", "network", "speech", "apps"] {
            assert!(groups.contains_key(cat), "missing category {cat}");
        }
    }

    #[test]
    fn registering_twice_is_idempotent() {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg);
        let names = reg.command_names();
        register_builtins(&mut reg);
        assert_eq!(reg.command_names(), names);
    }
}
