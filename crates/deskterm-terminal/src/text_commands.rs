//! Text processing commands: echo, grep, head, tail, wc, sort, uniq.
//!
//! Every command except `echo` reads the named file or, without one, the
//! previous pipeline stage.

use deskterm_types::error::{DesktermError, Result};

use crate::commands::{usage_error, Args};
use crate::interpreter::{Command, CommandOutput, Environment};

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Print text"
    }
    fn usage(&self) -> &str {
        "echo [-n] [text...]"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (newline, words) = match args.split_first() {
            Some((&"-n", rest)) => (false, rest),
            _ => (true, args),
        };
        let mut text = words.join(" ");
        if newline {
            text.push('\n');
        }
        Ok(CommandOutput::Text(text))
    }
}

// ---------------------------------------------------------------------------
// grep
// ---------------------------------------------------------------------------

struct GrepCmd;
impl Command for GrepCmd {
    fn name(&self) -> &str {
        "grep"
    }
    fn description(&self) -> &str {
        "Print lines containing a pattern"
    }
    fn usage(&self) -> &str {
        "grep [-i] [-n] [-v] [-c] <pattern> [file...]"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = Args::parse(args);
        let Some((pattern, files)) = args.operands.split_first() else {
            return Err(usage_error(self.usage()));
        };
        let ignore_case = args.has('i');
        let needle = if ignore_case {
            pattern.to_lowercase()
        } else {
            pattern.to_string()
        };
        let matches = |line: &str| {
            let found = if ignore_case {
                line.to_lowercase().contains(&needle)
            } else {
                line.contains(&needle)
            };
            found != args.has('v')
        };

        let sources: Vec<(Option<&str>, String)> = if files.is_empty() {
            vec![(None, read_text_input(None, env)?)]
        } else {
            files
                .iter()
                .map(|&f| -> Result<(Option<&str>, String)> {
                    Ok((Some(f), read_text_input(Some(f), env)?))
                })
                .collect::<Result<_>>()?
        };
        let label = sources.len() > 1;

        let mut out = Vec::new();
        for (name, text) in &sources {
            let prefix = match name {
                Some(n) if label => format!("{n}:"),
                _ => String::new(),
            };
            let hits: Vec<(usize, &str)> = text
                .lines()
                .enumerate()
                .filter(|(_, l)| matches(l))
                .collect();
            if args.has('c') {
                out.push(format!("{prefix}{}", hits.len()));
                continue;
            }
            for (i, line) in hits {
                if args.has('n') {
                    out.push(format!("{prefix}{}:{line}", i + 1));
                } else {
                    out.push(format!("{prefix}{line}"));
                }
            }
        }
        if out.is_empty() {
            return Ok(CommandOutput::None);
        }
        Ok(CommandOutput::Text(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// head / tail
// ---------------------------------------------------------------------------

struct HeadCmd;
impl Command for HeadCmd {
    fn name(&self) -> &str {
        "head"
    }
    fn description(&self) -> &str {
        "Show the first lines of input"
    }
    fn usage(&self) -> &str {
        "head [-n N] [file]"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (n, file) = parse_n_flag(args, 10)?;
        let text = read_text_input(file, env)?;
        let result: Vec<&str> = text.lines().take(n).collect();
        Ok(CommandOutput::Text(result.join("\n")))
    }
}

struct TailCmd;
impl Command for TailCmd {
    fn name(&self) -> &str {
        "tail"
    }
    fn description(&self) -> &str {
        "Show the last lines of input"
    }
    fn usage(&self) -> &str {
        "tail [-n N] [file]"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (n, file) = parse_n_flag(args, 10)?;
        let text = read_text_input(file, env)?;
        let lines: Vec<&str> = text.lines().collect();
        let start = lines.len().saturating_sub(n);
        Ok(CommandOutput::Text(lines[start..].join("\n")))
    }
}

// ---------------------------------------------------------------------------
// wc
// ---------------------------------------------------------------------------

struct WcCmd;
impl Command for WcCmd {
    fn name(&self) -> &str {
        "wc"
    }
    fn description(&self) -> &str {
        "Count lines, words and bytes"
    }
    fn usage(&self) -> &str {
        "wc [-l] [-w] [-c] [file]"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = Args::parse(args);
        let file = args.operands.first().copied();
        let text = read_text_input(file, env)?;
        let counts = [
            ('l', text.lines().count()),
            ('w', text.split_whitespace().count()),
            ('c', text.len()),
        ];
        let all = !counts.iter().any(|(f, _)| args.has(*f));
        let mut out: String = counts
            .iter()
            .filter(|(f, _)| all || args.has(*f))
            .map(|(_, n)| format!("{n:>8}"))
            .collect();
        if let Some(f) = file {
            out.push(' ');
            out.push_str(f);
        }
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// sort
// ---------------------------------------------------------------------------

struct SortCmd;
impl Command for SortCmd {
    fn name(&self) -> &str {
        "sort"
    }
    fn description(&self) -> &str {
        "Sort lines"
    }
    fn usage(&self) -> &str {
        "sort [-r] [-n] [file]"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = Args::parse(args);
        let text = read_text_input(args.operands.first().copied(), env)?;
        let mut lines: Vec<&str> = text.lines().collect();
        if args.has('n') {
            lines.sort_by(|a, b| leading_number(a).total_cmp(&leading_number(b)).then(a.cmp(b)));
        } else {
            lines.sort();
        }
        if args.has('r') {
            lines.reverse();
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

/// Numeric sort key: the leading number of a line, 0 when there is none.
fn leading_number(line: &str) -> f64 {
    let trimmed = line.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// uniq
// ---------------------------------------------------------------------------

struct UniqCmd;
impl Command for UniqCmd {
    fn name(&self) -> &str {
        "uniq"
    }
    fn description(&self) -> &str {
        "Collapse adjacent duplicate lines"
    }
    fn usage(&self) -> &str {
        "uniq [-c] [file]"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = Args::parse(args);
        let text = read_text_input(args.operands.first().copied(), env)?;
        let mut runs: Vec<(usize, &str)> = Vec::new();
        for line in text.lines() {
            match runs.last_mut() {
                Some((count, prev)) if *prev == line => *count += 1,
                _ => runs.push((1, line)),
            }
        }
        let out: Vec<String> = runs
            .into_iter()
            .map(|(count, line)| {
                if args.has('c') {
                    format!("{count:>7} {line}")
                } else {
                    line.to_string()
                }
            })
            .collect();
        Ok(CommandOutput::Text(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse `-n N` or `-N` and an optional file operand.
fn parse_n_flag<'a>(args: &[&'a str], default: usize) -> Result<(usize, Option<&'a str>)> {
    let invalid = |s: &str| DesktermError::Command(format!("invalid line count: {s}"));
    let mut n = default;
    let mut file = None;
    let mut rest = args.iter();
    while let Some(&arg) = rest.next() {
        if arg == "-n" {
            let value = rest.next().ok_or_else(|| invalid(""))?;
            n = value.parse().map_err(|_| invalid(value))?;
        } else if let Some(num) = arg.strip_prefix('-').filter(|s| !s.is_empty()) {
            n = num.parse().map_err(|_| invalid(num))?;
        } else {
            file = Some(arg);
        }
    }
    Ok((n, file))
}

/// Read text from a file path or stdin.
fn read_text_input(file: Option<&str>, env: &mut Environment<'_>) -> Result<String> {
    match file {
        Some(path) => {
            let full = env.resolve(path);
            Ok(env.fs()?.read_file(&full)?)
        },
        None => Ok(env.stdin.clone().unwrap_or_default()),
    }
}

/// Register text processing commands.
pub fn register_text_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(EchoCmd));
    reg.register(Box::new(GrepCmd));
    reg.register(Box::new(HeadCmd));
    reg.register(Box::new(TailCmd));
    reg.register(Box::new(WcCmd));
    reg.register(Box::new(SortCmd));
    reg.register(Box::new(UniqCmd));
}
