//! Guard against commands that would wipe the whole filesystem.
//!
//! Checked on the tokens before glob expansion, so `rm -rf *` is caught as
//! written. Operands are resolved and normalized first, so `/./*`, `//*`
//! and `/..` are treated like `/*` and `/`.

use deskterm_store::path;

/// Return a warning when `tokens` (command first) is a destructive pattern.
pub fn check(tokens: &[String], cwd: &str, home: &str) -> Option<String> {
    let (cmd, args) = tokens.split_first()?;
    if !cmd.eq_ignore_ascii_case("rm") {
        return None;
    }
    let recursive = args.iter().any(|a| is_recursive_flag(a));
    if !recursive {
        return None;
    }
    let target = args
        .iter()
        .filter(|a| !a.starts_with('-'))
        .find(|a| is_protected(a, cwd, home))?;
    log::warn!("blocked destructive command: {}", tokens.join(" "));
    Some(format!(
        "rm: refusing to recursively remove '{target}': that would wipe the filesystem.\n\
         Nice try. Remove specific paths instead."
    ))
}

fn is_protected(operand: &str, cwd: &str, home: &str) -> bool {
    match operand.find(['*', '?']) {
        Some(first_glob) => {
            // Everything up to the component holding the first wildcard.
            let (dir, rest) = match operand[..first_glob].rfind('/') {
                Some(i) => (&operand[..=i], &operand[i + 1..]),
                None => ("", operand),
            };
            let only_stars = rest
                .split('/')
                .filter(|c| !c.is_empty())
                .all(|c| c.chars().all(|ch| ch == '*'));
            let dir = if dir.is_empty() {
                cwd.to_string()
            } else {
                path::resolve(cwd, home, dir)
            };
            only_stars && (dir == "/" || dir == home || dir == cwd)
        },
        None => {
            let target = path::resolve(cwd, home, operand);
            let dots_only = !operand.starts_with('/')
                && operand
                    .split('/')
                    .all(|c| c.is_empty() || c == "." || c == "..");
            target == "/" || target == home || dots_only
        },
    }
}

fn is_recursive_flag(arg: &str) -> bool {
    if arg == "--recursive" {
        return true;
    }
    match arg.strip_prefix('-') {
        Some(flags) if !flags.starts_with('-') => flags.contains(['r', 'R']),
        _ => false,
    }
}
