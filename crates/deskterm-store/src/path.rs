//! Path helpers.
//!
//! Store keys are normalized absolute paths: leading `/`, no `//`, no
//! trailing `/` except for root, and no `.`/`..` components.

use std::borrow::Cow;

/// Check whether a path is already in normal form.
fn is_normalized(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }
    if path.len() > 1 && path.ends_with('/') {
        return false;
    }
    !path.contains("//")
        && !path
            .split('/')
            .any(|component| component == "." || component == "..")
}

/// Normalize an absolute path: ensure leading `/`, collapse `//`, resolve
/// `.` and `..`, strip the trailing `/`. Returns the input unchanged
/// (zero-alloc) when already in normal form.
pub fn normalize(path: &str) -> Cow<'_, str> {
    if is_normalized(path) {
        return Cow::Borrowed(path);
    }
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", parts.join("/")))
    }
}

/// Return the parent of a normalized path (root is its own parent).
pub fn parent(path: &str) -> &str {
    if path == "/" {
        return "/";
    }
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

/// Return the final component of a normalized path.
pub fn file_name(path: &str) -> &str {
    if path == "/" {
        return "/";
    }
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Join a child name onto a normalized directory path.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Whether `path` equals `ancestor` or lies beneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == "/" {
        return true;
    }
    path == ancestor
        || (path.starts_with(ancestor) && path.as_bytes().get(ancestor.len()) == Some(&b'/'))
}

/// Rewrite `path` so that its `old_prefix` is replaced with `new_prefix`.
///
/// `path` must satisfy `is_within(path, old_prefix)`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> String {
    if path == old_prefix {
        return new_prefix.to_string();
    }
    let rest = if old_prefix == "/" {
        &path[1..]
    } else {
        &path[old_prefix.len() + 1..]
    };
    join(new_prefix, rest)
}

/// Resolve user input against the current directory.
///
/// Handles absolute paths, relative paths, `.`/`..`, and a leading `~`
/// (expanded to `home`).
pub fn resolve(cwd: &str, home: &str, input: &str) -> String {
    let raw = if input == "~" {
        home.to_string()
    } else if let Some(rest) = input.strip_prefix("~/") {
        join(home, rest)
    } else if input.starts_with('/') {
        input.to_string()
    } else {
        join(cwd, input)
    };
    normalize(&raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_strips() {
        assert_eq!(normalize("//a//b/"), "/a/b");
        assert_eq!(normalize("a/b"), "/a/b");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn normalize_resolves_dots() {
        assert_eq!(normalize("/a/./b/../c"), "/a/c");
        assert_eq!(normalize("/.."), "/");
    }

    #[test]
    fn normalize_borrowed_when_clean() {
        assert!(matches!(normalize("/home/user"), Cow::Borrowed(_)));
    }

    #[test]
    fn parent_and_name() {
        assert_eq!(parent("/a/b"), "/a");
        assert_eq!(parent("/a"), "/");
        assert_eq!(parent("/"), "/");
        assert_eq!(file_name("/a/b.txt"), "b.txt");
        assert_eq!(file_name("/"), "/");
    }

    #[test]
    fn within_checks_component_boundary() {
        assert!(is_within("/a/b", "/a"));
        assert!(is_within("/a", "/a"));
        assert!(!is_within("/ab", "/a"));
        assert!(is_within("/anything", "/"));
    }

    #[test]
    fn rebase_prefix() {
        assert_eq!(rebase("/a/x/y", "/a", "/b"), "/b/x/y");
        assert_eq!(rebase("/a", "/a", "/b"), "/b");
    }

    #[test]
    fn resolve_relative_and_home() {
        assert_eq!(resolve("/home/u", "/home/u", "docs"), "/home/u/docs");
        assert_eq!(resolve("/home/u", "/home/u", ".."), "/home");
        assert_eq!(resolve("/", "/home/u", "~"), "/home/u");
        assert_eq!(resolve("/", "/home/u", "~/a"), "/home/u/a");
        assert_eq!(resolve("/tmp", "/home/u", "/etc/./motd"), "/etc/motd");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_is_idempotent(path in "[/a-z0-9_.]{0,50}") {
                let once = normalize(&path).into_owned();
                let twice = normalize(&once).into_owned();
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn normalize_shape(path in "[/a-z0-9_.]{0,50}") {
                let normed = normalize(&path);
                prop_assert!(normed.starts_with('/'));
                prop_assert!(!normed.contains("//"));
                if normed != "/" {
                    prop_assert!(!normed.ends_with('/'));
                }
            }

            #[test]
            fn join_then_parent(dir in "(/[a-z]{1,6}){0,4}", name in "[a-z]{1,6}") {
                let dir = if dir.is_empty() { "/".to_string() } else { dir };
                let joined = join(&dir, &name);
                prop_assert_eq!(parent(&joined), dir.as_str());
                prop_assert_eq!(file_name(&joined), name.as_str());
            }
        }
    }
}
