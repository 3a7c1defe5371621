//! Command trait, execution environment and the shell that dispatches lines.
//!
//! A line goes through history expansion, chain splitting (`;`, `&&`,
//! `||`), pipes, redirection (`>`, `>>`), tokenizing with variable
//! expansion, alias substitution, the safety check and glob expansion before the
//! command is looked up in the registry.

use std::iter::Peekable;
use std::str::Chars;

use deskterm_store::path;
use deskterm_store::FileSystem;
use deskterm_types::config::DesktermConfig;
use deskterm_types::error::{DesktermError, Result, StoreError};

use crate::registry::CommandRegistry;
use crate::safety;
use crate::services::{OutputSink, Services};
use crate::state::ShellState;

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Text; each line becomes one output row.
    Text(String),
    /// Nothing to show.
    None,
    /// Clear the terminal output buffer.
    Clear,
}

impl CommandOutput {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Text form used for pipes and redirection.
    fn into_text(self) -> String {
        match self {
            Self::Text(t) => t,
            Self::None | Self::Clear => String::new(),
        }
    }
}

/// Everything a command can touch while it runs.
pub struct Environment<'a> {
    pub state: &'a mut ShellState,
    pub services: &'a mut Services,
    /// Early output (used by slow commands such as `ping`).
    pub sink: &'a mut dyn OutputSink,
    /// Output of the previous stage of a pipeline.
    pub stdin: Option<String>,
}

impl Environment<'_> {
    /// The filesystem, or an error when the store is unavailable.
    pub fn fs(&mut self) -> Result<&mut FileSystem> {
        self.services
            .fs
            .as_mut()
            .ok_or_else(|| StoreError::Backend("filesystem unavailable".to_string()).into())
    }

    pub fn config(&self) -> &DesktermConfig {
        &self.services.config
    }

    pub fn cwd(&self) -> &str {
        &self.state.cwd
    }

    /// Resolve user input against the cwd, expanding `~`.
    pub fn resolve(&self, input: &str) -> String {
        path::resolve(&self.state.cwd, self.state.home(), input)
    }

    /// Show a row immediately instead of waiting for the command to return.
    pub fn emit(&mut self, line: &str) {
        self.sink.emit(line);
    }
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[-l\] \[path\]").
    fn usage(&self) -> &str;

    /// Category used to group `help` output.
    fn category(&self) -> &str {
        "general"
    }

    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

/// Name the shell reports its own errors under.
const SHELL_NAME: &str = "dsh";

/// Exit status for an unknown command.
const STATUS_NOT_FOUND: i32 = 127;

/// Commands answered by the shell itself because they need the registry.
const SHELL_BUILTINS: &[&str] = &["help", "which"];

/// The interpreter: owns the registry and the session state.
pub struct Shell {
    registry: CommandRegistry,
    pub state: ShellState,
}

impl Shell {
    pub fn new(registry: CommandRegistry, state: ShellState) -> Self {
        Self { registry, state }
    }

    /// A shell with every built-in command module registered.
    pub fn with_builtins(config: &DesktermConfig) -> Self {
        let mut registry = CommandRegistry::new();
        crate::register_builtins(&mut registry);
        log::info!("Registered {} commands", registry.len());
        Self::new(registry, ShellState::new(config))
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Run one input line. Never fails: errors become output text.
    pub fn execute(
        &mut self,
        line: &str,
        services: &mut Services,
        sink: &mut dyn OutputSink,
    ) -> CommandOutput {
        let mut runner = Runner {
            registry: &self.registry,
            state: &mut self.state,
            services,
            sink,
        };
        runner.run_line(line)
    }
}

/// A failed pipeline: the rendered message and the exit status.
#[derive(Debug)]
struct Failure {
    message: String,
    status: i32,
}

impl Failure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 1,
        }
    }

    /// Render a command error as `<cmd>: <message>`. Command errors already
    /// carry their prefix.
    fn from_command(name: &str, err: DesktermError) -> Self {
        match err {
            DesktermError::Command(msg) => Self::new(msg),
            other => Self::new(format!("{name}: {other}")),
        }
    }
}

type Outcome = std::result::Result<CommandOutput, Failure>;

struct Runner<'a> {
    registry: &'a CommandRegistry,
    state: &'a mut ShellState,
    services: &'a mut Services,
    sink: &'a mut dyn OutputSink,
}

impl Runner<'_> {
    fn run_line(&mut self, line: &str) -> CommandOutput {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return CommandOutput::None;
        }

        let line = match expand_history(trimmed, self.state.history()) {
            Ok(Some(expanded)) => {
                self.sink.emit(&expanded);
                expanded
            },
            Ok(None) => trimmed.to_string(),
            Err(msg) => {
                self.state.last_status = 1;
                return CommandOutput::Text(msg);
            },
        };
        self.state.push_history(&line);
        log::debug!("execute: {line}");

        let segments = match split_chains(&line) {
            Ok(s) => s,
            Err(f) => {
                self.state.last_status = f.status;
                return CommandOutput::Text(f.message);
            },
        };

        let mut combined = Vec::new();
        let mut cleared = false;
        for segment in &segments {
            let should_run = match segment.op {
                ChainOp::Always => true,
                ChainOp::And => self.state.last_status == 0,
                ChainOp::Or => self.state.last_status != 0,
            };
            if !should_run {
                continue;
            }
            match self.run_pipeline(&segment.command) {
                Ok(CommandOutput::Text(text)) => {
                    self.state.last_status = 0;
                    let text = text.strip_suffix('\n').unwrap_or(&text);
                    if !text.is_empty() {
                        combined.push(text.to_string());
                    }
                },
                Ok(CommandOutput::Clear) => {
                    self.state.last_status = 0;
                    // Output produced before a clear is wiped with it.
                    combined.clear();
                    cleared = true;
                },
                Ok(CommandOutput::None) => self.state.last_status = 0,
                Err(failure) => {
                    log::debug!("command failed ({}): {}", failure.status, failure.message);
                    self.state.last_status = failure.status;
                    combined.push(failure.message);
                },
            }
        }

        match (cleared, combined.is_empty()) {
            (true, true) => CommandOutput::Clear,
            (true, false) => {
                self.sink.clear();
                CommandOutput::Text(combined.join("\n"))
            },
            (false, true) => CommandOutput::None,
            (false, false) => CommandOutput::Text(combined.join("\n")),
        }
    }

    /// `a | b | c`: each stage's text becomes the next stage's stdin. The
    /// last stage may redirect into the filesystem.
    fn run_pipeline(&mut self, pipeline: &str) -> Outcome {
        let stages = split_pipes(pipeline);
        let last = stages.len().saturating_sub(1);
        let mut stdin: Option<String> = None;
        let mut output = CommandOutput::None;

        for (i, stage) in stages.iter().enumerate() {
            let result = if i == last {
                self.run_with_redirect(stage, stdin.take())?
            } else {
                self.run_single(stage, stdin.take())?
            };
            if i == last {
                output = result;
            } else {
                stdin = Some(result.into_text());
            }
        }
        Ok(output)
    }

    fn run_with_redirect(&mut self, command: &str, stdin: Option<String>) -> Outcome {
        let (command, redirect) = parse_redirect(command);
        let result = self.run_single(command, stdin)?;
        let Some(redirect) = redirect else {
            return Ok(result);
        };

        let target = lex_with(redirect.target, Some(&*self.state))
            .map_err(Failure::new)?
            .into_iter()
            .next()
            .map(|w| w.text)
            .ok_or_else(|| Failure::new(format!("{SHELL_NAME}: syntax error: missing redirect target")))?;
        let path = path::resolve(&self.state.cwd, self.state.home(), &target);
        let text = result.into_text();
        let fs = self
            .services
            .fs
            .as_mut()
            .ok_or_else(|| Failure::new(format!("{SHELL_NAME}: {target}: filesystem unavailable")))?;

        let written = if redirect.append {
            let existing = match fs.get_item(&path) {
                Ok(Some(node)) => node.content,
                _ => String::new(),
            };
            let text = if existing.is_empty() || existing.ends_with('\n') {
                text
            } else {
                format!("\n{text}")
            };
            fs.append_file(&path, &text)
        } else {
            fs.create_file(&path, &text, true)
        };
        written.map_err(|e| Failure::new(format!("{SHELL_NAME}: {e}")))?;
        Ok(CommandOutput::None)
    }

    /// Expand, tokenize and dispatch a single command.
    fn run_single(&mut self, command: &str, stdin: Option<String>) -> Outcome {
        let words = lex_with(command.trim(), Some(&*self.state)).map_err(Failure::new)?;
        let words = expand_alias(words, self.state);
        if words.is_empty() {
            return Ok(CommandOutput::None);
        }

        let texts: Vec<String> = words.iter().map(|w| w.text.clone()).collect();
        if let Some(warning) = safety::check(&texts, &self.state.cwd, self.state.home()) {
            return Err(Failure::new(warning));
        }

        let tokens = match self.services.fs.as_ref() {
            Some(fs) => expand_globs(&words, fs, &self.state.cwd, self.state.home()),
            None => texts,
        };
        let name = tokens[0].to_ascii_lowercase();
        let args: Vec<&str> = tokens[1..].iter().map(String::as_str).collect();

        match name.as_str() {
            "help" => return self.help(&args).map_err(|e| Failure::from_command(&name, e)),
            "which" => return self.which(&args).map_err(|e| Failure::from_command(&name, e)),
            _ => {},
        }

        let Some(cmd) = self.registry.get(&name) else {
            return Err(Failure {
                message: format!("{}: command not found", tokens[0]),
                status: STATUS_NOT_FOUND,
            });
        };
        log::debug!("dispatch {name} {args:?}");
        let mut env = Environment {
            state: &mut *self.state,
            services: &mut *self.services,
            sink: &mut *self.sink,
            stdin,
        };
        cmd.execute(&args, &mut env)
            .map_err(|e| Failure::from_command(&name, e))
    }

    // -- Registry-aware built-ins --

    fn help(&self, args: &[&str]) -> Result<CommandOutput> {
        if let Some(&name) = args.first() {
            let cmd = self
                .registry
                .get(name)
                .ok_or_else(|| DesktermError::Command(format!("help: no such command: {name}")))?;
            return Ok(CommandOutput::Text(format!(
                "{} ({})\n  {}\n  Usage: {}",
                cmd.name(),
                cmd.category(),
                cmd.description(),
                cmd.usage()
            )));
        }

        let groups = self.registry.by_category();
        let mut out = format!("Available commands ({}):\n", self.registry.len());
        for (category, infos) in &groups {
            out.push_str(&format!("\n  [{category}]\n"));
            for info in infos {
                out.push_str(&format!("    {:<10} {}\n", info.name, info.description));
            }
        }
        out.push_str("\nType 'help <command>' for details.");
        Ok(CommandOutput::Text(out))
    }

    fn which(&self, args: &[&str]) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(DesktermError::Command("usage: which <command>".to_string()));
        }
        let mut lines = Vec::new();
        let mut missing = Vec::new();
        for &arg in args {
            let name = arg.to_ascii_lowercase();
            if let Some(expansion) = self.state.aliases.get(arg) {
                lines.push(format!("{arg}: aliased to '{expansion}'"));
            } else if SHELL_BUILTINS.contains(&name.as_str()) {
                lines.push(format!("{name}: shell built-in"));
            } else if let Some(cmd) = self.registry.get(&name) {
                lines.push(format!("/bin/{}", cmd.name()));
            } else {
                missing.push(format!("which: {arg}: not found"));
            }
        }
        if !missing.is_empty() && lines.is_empty() {
            return Err(DesktermError::Command(missing.join("\n")));
        }
        lines.extend(missing);
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// History expansion
// ---------------------------------------------------------------------------

/// Expand `!!` (anywhere outside single quotes) and a whole-line `!N`.
/// Returns `Ok(None)` when nothing was expanded.
fn expand_history(line: &str, history: &[String]) -> std::result::Result<Option<String>, String> {
    if let Some(n) = line.strip_prefix('!').and_then(|n| n.parse::<usize>().ok()) {
        return match n.checked_sub(1).and_then(|i| history.get(i)) {
            Some(entry) => Ok(Some(entry.clone())),
            None => Err(format!("{SHELL_NAME}: !{n}: event not found")),
        };
    }

    if !line.contains("!!") {
        return Ok(None);
    }
    let mut out = String::with_capacity(line.len());
    let mut in_single = false;
    let mut chars = line.chars().peekable();
    let mut expanded = false;
    while let Some(c) = chars.next() {
        if c == '\'' {
            in_single = !in_single;
        }
        if c == '!' && !in_single && chars.peek() == Some(&'!') {
            chars.next();
            let last = history
                .last()
                .ok_or_else(|| format!("{SHELL_NAME}: !!: event not found"))?;
            out.push_str(last);
            expanded = true;
        } else {
            out.push(c);
        }
    }
    Ok(expanded.then_some(out))
}

// ---------------------------------------------------------------------------
// Variable expansion
// ---------------------------------------------------------------------------

/// Read the reference after a `$` and return its value. `None` leaves the
/// `$` literal.
fn read_variable(chars: &mut Peekable<Chars<'_>>, state: &ShellState) -> Option<String> {
    match chars.peek().copied()? {
        '?' => {
            chars.next();
            Some(state.last_status.to_string())
        },
        '{' => {
            chars.next();
            let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
            Some(lookup_var(state, &name).to_string())
        },
        n if n.is_ascii_alphabetic() || n == '_' => {
            let mut name = String::new();
            while let Some(&n) = chars.peek() {
                if n.is_ascii_alphanumeric() || n == '_' {
                    name.push(n);
                    chars.next();
                } else {
                    break;
                }
            }
            Some(lookup_var(state, &name).to_string())
        },
        _ => None,
    }
}

fn lookup_var<'s>(state: &'s ShellState, name: &str) -> &'s str {
    match name {
        "PWD" => &state.cwd,
        _ => state.var(name).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Lexer: quotes, escapes and variables
// ---------------------------------------------------------------------------

/// One shell word. `quoted` words are exempt from glob and alias expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Word {
    text: String,
    quoted: bool,
}

#[derive(Default)]
struct WordBuilder {
    words: Vec<Word>,
    text: String,
    quoted: bool,
    started: bool,
}

impl WordBuilder {
    fn push(&mut self, c: char) {
        self.text.push(c);
        self.started = true;
    }

    fn finish(&mut self) {
        if self.started {
            self.words.push(Word {
                text: std::mem::take(&mut self.text),
                quoted: self.quoted,
            });
            self.quoted = false;
            self.started = false;
        }
    }
}

fn lex(input: &str) -> std::result::Result<Vec<Word>, String> {
    lex_with(input, None)
}

/// Split `input` into words. With `vars`, `$VAR`, `${VAR}` and `$?` expand
/// outside single quotes. Expanded text is never lexed again: inside double
/// quotes it is literal, unquoted it only splits on whitespace. Unknown
/// variables expand to nothing.
fn lex_with(input: &str, vars: Option<&ShellState>) -> std::result::Result<Vec<Word>, String> {
    let mut b = WordBuilder::default();
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some('\'') if c == '\'' => quote = None,
            Some('\'') => b.text.push(c),
            Some(_) if c == '"' => quote = None,
            Some(_) if c == '\\' => match chars.next() {
                Some(n @ ('"' | '\\' | '$')) => b.text.push(n),
                Some(n) => {
                    b.text.push('\\');
                    b.text.push(n);
                },
                None => b.text.push('\\'),
            },
            Some(_) if c == '$' => match vars.and_then(|s| read_variable(&mut chars, s)) {
                Some(value) => b.text.push_str(&value),
                None => b.text.push('$'),
            },
            Some(_) => b.text.push(c),
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    b.quoted = true;
                    b.started = true;
                },
                '\\' => {
                    if let Some(n) = chars.next() {
                        b.text.push(n);
                    }
                    b.started = true;
                },
                '$' => match vars.and_then(|s| read_variable(&mut chars, s)) {
                    Some(value) => {
                        for v in value.chars() {
                            if v.is_whitespace() {
                                b.finish();
                            } else {
                                b.push(v);
                            }
                        }
                    },
                    None => b.push('$'),
                },
                c if c.is_whitespace() => b.finish(),
                c => b.push(c),
            },
        }
    }

    match quote {
        Some('\'') => return Err(format!("{SHELL_NAME}: unterminated single quote")),
        Some(_) => return Err(format!("{SHELL_NAME}: unterminated double quote")),
        None => {},
    }
    b.finish();
    Ok(b.words)
}

/// Split a command line into words, honouring quotes and backslash escapes.
///
/// - Single quotes preserve everything literally.
/// - Inside double quotes, `\"`, `\\` and `\$` are escapes.
/// - Outside quotes, a backslash escapes the next character.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    lex(input)
        .map(|words| words.into_iter().map(|w| w.text).collect())
        .map_err(DesktermError::Command)
}

/// Replace the first word with its alias, once. The replacement is not
/// itself alias-expanded.
fn expand_alias(mut words: Vec<Word>, state: &ShellState) -> Vec<Word> {
    let Some(first) = words.first() else {
        return words;
    };
    if first.quoted {
        return words;
    }
    if let Some(expansion) = state.aliases.get(&first.text) {
        match lex_with(expansion, Some(state)) {
            Ok(replacement) => {
                words.splice(0..1, replacement);
            },
            Err(e) => log::warn!("alias {} is malformed: {e}", first.text),
        }
    }
    words
}

// ---------------------------------------------------------------------------
// Operators: chains, pipes, redirection
// ---------------------------------------------------------------------------

/// Byte offsets of characters outside quotes and not backslash-escaped.
fn unquoted_chars(input: &str) -> Vec<(usize, char)> {
    let mut out = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some('\''), '\'') => quote = None,
            (Some('\''), _) => {},
            (Some(_), '\\') => escaped = true,
            (Some(_), '"') => quote = None,
            (Some(_), _) => {},
            (None, '\\') => escaped = true,
            (None, '\'' | '"') => quote = Some(c),
            (None, _) => out.push((i, c)),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainOp {
    /// First command or after `;`.
    Always,
    /// After `&&`: only if the previous command succeeded.
    And,
    /// After `||`: only if the previous command failed.
    Or,
}

#[derive(Debug)]
struct ChainSegment {
    command: String,
    op: ChainOp,
}

/// Split on `;`, `&&` and `||` outside quotes.
fn split_chains(input: &str) -> std::result::Result<Vec<ChainSegment>, Failure> {
    let chars = unquoted_chars(input);
    let mut segments = Vec::new();
    let mut start = 0;
    let mut op = ChainOp::Always;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        let doubled = chars
            .get(i + 1)
            .is_some_and(|&(next_pos, next)| next == c && next_pos == pos + 1);
        let (next_op, width) = match c {
            ';' => (ChainOp::Always, 1),
            '&' if doubled => (ChainOp::And, 2),
            '|' if doubled => (ChainOp::Or, 2),
            _ => {
                i += 1;
                continue;
            },
        };
        let command = input[start..pos].trim();
        if command.is_empty() && next_op != ChainOp::Always {
            return Err(Failure {
                message: format!("{SHELL_NAME}: syntax error near unexpected token '{}'", &input[pos..pos + width]),
                status: 2,
            });
        }
        if !command.is_empty() {
            segments.push(ChainSegment {
                command: command.to_string(),
                op,
            });
        }
        op = next_op;
        start = pos + width;
        i += width;
    }

    let command = input[start..].trim();
    if !command.is_empty() {
        segments.push(ChainSegment {
            command: command.to_string(),
            op,
        });
    }
    Ok(segments)
}

/// Split on single `|` outside quotes.
fn split_pipes(input: &str) -> Vec<&str> {
    let mut stages = Vec::new();
    let mut start = 0;
    for (pos, c) in unquoted_chars(input) {
        if c == '|' {
            stages.push(input[start..pos].trim());
            start = pos + 1;
        }
    }
    stages.push(input[start..].trim());
    stages
}

#[derive(Debug, PartialEq, Eq)]
struct Redirect<'a> {
    target: &'a str,
    append: bool,
}

/// Split `cmd > file` / `cmd >> file` at the first unquoted `>`.
fn parse_redirect(input: &str) -> (&str, Option<Redirect<'_>>) {
    let Some(&(pos, _)) = unquoted_chars(input).iter().find(|&&(_, c)| c == '>') else {
        return (input, None);
    };
    let rest = &input[pos + 1..];
    let (target, append) = match rest.strip_prefix('>') {
        Some(after) => (after, true),
        None => (rest, false),
    };
    (
        &input[..pos],
        Some(Redirect {
            target: target.trim(),
            append,
        }),
    )
}

// ---------------------------------------------------------------------------
// Glob expansion
// ---------------------------------------------------------------------------

/// Expand unquoted `*`/`?` patterns (never the command name) against the
/// filesystem. A pattern without matches is passed through unchanged.
fn expand_globs(words: &[Word], fs: &FileSystem, cwd: &str, home: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(words.len());
    for (i, word) in words.iter().enumerate() {
        let is_pattern = word.text.contains(['*', '?']);
        if i == 0 || word.quoted || !is_pattern {
            out.push(word.text.clone());
            continue;
        }
        let matches = glob_one(&word.text, fs, cwd, home);
        if matches.is_empty() {
            out.push(word.text.clone());
        } else {
            out.extend(matches);
        }
    }
    out
}

fn glob_one(pattern: &str, fs: &FileSystem, cwd: &str, home: &str) -> Vec<String> {
    // Keep the directory part as the user wrote it so results stay relative.
    let (dir_written, name_pattern) = match pattern.rfind('/') {
        Some(i) => (&pattern[..=i], &pattern[i + 1..]),
        None => ("", pattern),
    };
    if dir_written.contains(['*', '?']) {
        return Vec::new();
    }
    let dir = if dir_written.is_empty() {
        cwd.to_string()
    } else {
        path::resolve(cwd, home, dir_written)
    };
    let Ok(entries) = fs.list_directory(&dir) else {
        return Vec::new();
    };
    entries
        .iter()
        .map(|e| e.name())
        // Hidden entries only match patterns that start with a dot.
        .filter(|name| !name.starts_with('.') || name_pattern.starts_with('.'))
        .filter(|name| glob_match(name_pattern, name))
        .map(|name| format!("{dir_written}{name}"))
        .collect()
}

/// Wildcard match: `*` matches any run of characters, `?` exactly one.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    // Position of the last `*` and the text index it was tried at.
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}
