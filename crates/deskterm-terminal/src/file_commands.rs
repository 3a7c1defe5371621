//! Filesystem commands: ls, cd, pwd, cat, mkdir, touch, rm, cp, mv, find,
//! tree, stat, df.

use deskterm_store::{path, FileSystem, FsNode};
use deskterm_types::error::{DesktermError, Result, StoreError};

use crate::commands::{format_timestamp, usage_error, Args};
use crate::interpreter::{glob_match, Command, CommandOutput, Environment};

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [-l] [-a] [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = Args::parse(args);
        let target = args
            .operands
            .first()
            .map_or_else(|| env.cwd().to_string(), |p| env.resolve(p));
        let fs = env.fs()?;
        let node = fs
            .get_item(&target)?
            .ok_or(StoreError::NotFound(target.clone()))?;

        let entries = if node.is_dir() {
            fs.list_directory(&target)?
        } else {
            vec![node]
        };
        let lines: Vec<String> = entries
            .iter()
            .filter(|e| args.has('a') || !e.name().starts_with('.'))
            .map(|e| {
                if args.has('l') {
                    long_entry(e)
                } else {
                    display_name(e)
                }
            })
            .collect();
        if lines.is_empty() {
            return Ok(CommandOutput::None);
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

fn display_name(node: &FsNode) -> String {
    if node.is_dir() {
        format!("{}/", node.name())
    } else {
        node.name().to_string()
    }
}

fn long_entry(node: &FsNode) -> String {
    let mode = if node.is_dir() {
        "drwxr-xr-x"
    } else {
        "-rw-r--r--"
    };
    format!(
        "{mode} {:>8} {} {}",
        node.size,
        format_timestamp(node.modified),
        display_name(node)
    )
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change working directory"
    }
    fn usage(&self) -> &str {
        "cd [path|-|~]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (target, announce) = match args.first() {
            None => (env.state.home().to_string(), false),
            Some(&"-") => {
                let prev = env
                    .state
                    .previous_dir
                    .clone()
                    .ok_or_else(|| DesktermError::Command("cd: OLDPWD not set".to_string()))?;
                (prev, true)
            },
            Some(p) => (env.resolve(p), false),
        };
        let shown = args.first().copied().unwrap_or("~");

        match env.fs()?.get_item(&target)? {
            Some(node) if node.is_dir() => {},
            Some(_) => {
                return Err(DesktermError::Command(format!("cd: not a directory: {shown}")));
            },
            None => {
                return Err(DesktermError::Command(format!(
                    "cd: no such file or directory: {shown}"
                )));
            },
        }
        env.state.set_cwd(target.clone());
        if announce {
            Ok(CommandOutput::Text(target))
        } else {
            Ok(CommandOutput::None)
        }
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.cwd().to_string()))
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Print file contents"
    }
    fn usage(&self) -> &str {
        "cat [file...]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Ok(env
                .stdin
                .take()
                .map_or(CommandOutput::None, CommandOutput::Text));
        }
        let paths: Vec<String> = args.iter().map(|a| env.resolve(a)).collect();
        let fs = env.fs()?;
        let mut out = String::new();
        for p in &paths {
            let content = fs.read_file(p)?;
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&content);
        }
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create directories"
    }
    fn usage(&self) -> &str {
        "mkdir [-p] <dir...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = Args::parse(args);
        if args.operands.is_empty() {
            return Err(usage_error(self.usage()));
        }
        let parents = args.has('p');
        let paths: Vec<String> = args.operands.iter().map(|a| env.resolve(a)).collect();
        let fs = env.fs()?;
        for p in &paths {
            if parents {
                fs.create_dir_all(p)?;
            } else {
                fs.create_directory(p)?;
            }
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// touch
// ---------------------------------------------------------------------------

struct TouchCmd;
impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn description(&self) -> &str {
        "Create files or update timestamps"
    }
    fn usage(&self) -> &str {
        "touch <file...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(usage_error(self.usage()));
        }
        let paths: Vec<String> = args.iter().map(|a| env.resolve(a)).collect();
        let fs = env.fs()?;
        for p in &paths {
            fs.touch(p)?;
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Remove files or directories"
    }
    fn usage(&self) -> &str {
        "rm [-r] [-f] <path...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = Args::parse(args);
        if args.operands.is_empty() {
            return Err(usage_error(self.usage()));
        }
        let recursive = args.has('r') || args.has('R') || args.has_long("recursive");
        let force = args.has('f') || args.has_long("force");
        let paths: Vec<String> = args.operands.iter().map(|a| env.resolve(a)).collect();

        let removed = remove_paths(env.fs()?, &paths, recursive, force);
        settle_cwd(env)?;
        removed.map(|()| CommandOutput::None)
    }
}

fn remove_paths(fs: &mut FileSystem, paths: &[String], recursive: bool, force: bool) -> Result<()> {
    for p in paths {
        match fs.get_item(p)? {
            None if force => continue,
            None => return Err(StoreError::NotFound(p.clone()).into()),
            Some(node) if node.is_dir() && !recursive => {
                return Err(StoreError::IsADirectory(p.clone()).into());
            },
            Some(_) => {
                let removed = fs.delete_item(p, recursive)?;
                log::debug!("rm {p}: {removed} node(s)");
            },
        }
    }
    Ok(())
}

/// Move the session up to the nearest directory that still exists.
fn settle_cwd(env: &mut Environment<'_>) -> Result<()> {
    let mut cwd = env.state.cwd.clone();
    let fs = env.fs()?;
    while cwd != "/" && !fs.get_item(&cwd)?.is_some_and(|n| n.is_dir()) {
        cwd = path::parent(&cwd).to_string();
    }
    if cwd != env.state.cwd {
        log::debug!("cwd {} was removed, moving to {cwd}", env.state.cwd);
        env.state.set_cwd(cwd);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// cp / mv
// ---------------------------------------------------------------------------

/// When `dst` is an existing directory, the source lands inside it.
fn into_directory(fs: &FileSystem, src: &str, dst: String) -> Result<String> {
    match fs.get_item(&dst)? {
        Some(node) if node.is_dir() => Ok(path::join(&dst, path::file_name(src))),
        _ => Ok(dst),
    }
}

struct CpCmd;
impl Command for CpCmd {
    fn name(&self) -> &str {
        "cp"
    }
    fn description(&self) -> &str {
        "Copy files or directories"
    }
    fn usage(&self) -> &str {
        "cp [-r] <src> <dst>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = Args::parse(args);
        let [src, dst] = args.operands[..] else {
            return Err(usage_error(self.usage()));
        };
        let recursive = args.has('r') || args.has('R');
        let (src, dst) = (env.resolve(src), env.resolve(dst));
        let fs = env.fs()?;
        let dst = into_directory(fs, &src, dst)?;
        fs.copy_item(&src, &dst, recursive)?;
        Ok(CommandOutput::None)
    }
}

struct MvCmd;
impl Command for MvCmd {
    fn name(&self) -> &str {
        "mv"
    }
    fn description(&self) -> &str {
        "Move or rename files and directories"
    }
    fn usage(&self) -> &str {
        "mv <src> <dst>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let [src, dst] = args[..] else {
            return Err(usage_error(self.usage()));
        };
        let (src, dst) = (env.resolve(src), env.resolve(dst));
        let fs = env.fs()?;
        let dst = into_directory(fs, &src, dst)?;
        fs.move_item(&src, &dst)?;

        // Keep the session inside the moved tree.
        if path::is_within(&env.state.cwd, &src) {
            let cwd = path::rebase(&env.state.cwd, &src, &dst);
            env.state.set_cwd(cwd);
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// find
// ---------------------------------------------------------------------------

struct FindCmd;
impl Command for FindCmd {
    fn name(&self) -> &str {
        "find"
    }
    fn description(&self) -> &str {
        "Search for files by name"
    }
    fn usage(&self) -> &str {
        "find [path] [-name <pattern>]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut root = None;
        let mut pattern = None;
        let mut rest = args.iter();
        while let Some(&arg) = rest.next() {
            match arg {
                "-name" | "-iname" => {
                    pattern = Some(*rest.next().ok_or_else(|| usage_error(self.usage()))?);
                },
                _ if root.is_none() => root = Some(arg),
                _ => return Err(usage_error(self.usage())),
            }
        }
        let root = root.map_or_else(|| env.cwd().to_string(), |r| env.resolve(r));
        let fs = env.fs()?;
        fs.require_dir(&root)?;

        let mut found = Vec::new();
        walk(fs, &root, &mut |node| {
            let hit = match pattern {
                None => true,
                Some(p) if p.contains(['*', '?']) => glob_match(p, node.name()),
                Some(p) => node.name().contains(p),
            };
            if hit {
                found.push(node.path.clone());
            }
        })?;
        if found.is_empty() {
            return Ok(CommandOutput::None);
        }
        Ok(CommandOutput::Text(found.join("\n")))
    }
}

/// Depth-first visit of every descendant of `dir`, in name order.
fn walk(fs: &FileSystem, dir: &str, visit: &mut dyn FnMut(&FsNode)) -> Result<()> {
    for entry in fs.list_directory(dir)? {
        visit(&entry);
        if entry.is_dir() {
            walk(fs, &entry.path, visit)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// tree
// ---------------------------------------------------------------------------

struct TreeCmd;
impl Command for TreeCmd {
    fn name(&self) -> &str {
        "tree"
    }
    fn description(&self) -> &str {
        "Display directory tree"
    }
    fn usage(&self) -> &str {
        "tree [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let root = args
            .first()
            .map_or_else(|| env.cwd().to_string(), |p| env.resolve(p));
        let fs = env.fs()?;
        fs.require_dir(&root)?;

        let mut lines = vec![root.clone()];
        let mut counts = (0u32, 0u32);
        tree_lines(fs, &root, "", &mut lines, &mut counts)?;
        lines.push(String::new());
        lines.push(format!("{} directories, {} files", counts.0, counts.1));
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

fn tree_lines(
    fs: &FileSystem,
    dir: &str,
    prefix: &str,
    lines: &mut Vec<String>,
    counts: &mut (u32, u32),
) -> Result<()> {
    let entries = fs.list_directory(dir)?;
    let last = entries.len().saturating_sub(1);
    for (i, entry) in entries.iter().enumerate() {
        let (branch, indent) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        lines.push(format!("{prefix}{branch}{}", display_name(entry)));
        if entry.is_dir() {
            counts.0 += 1;
            tree_lines(fs, &entry.path, &format!("{prefix}{indent}"), lines, counts)?;
        } else {
            counts.1 += 1;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// stat
// ---------------------------------------------------------------------------

struct StatCmd;
impl Command for StatCmd {
    fn name(&self) -> &str {
        "stat"
    }
    fn description(&self) -> &str {
        "Show file or directory details"
    }
    fn usage(&self) -> &str {
        "stat <path>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(arg) = args.first() else {
            return Err(usage_error(self.usage()));
        };
        let target = env.resolve(arg);
        let node = env
            .fs()?
            .get_item(&target)?
            .ok_or(StoreError::NotFound(target))?;
        let kind = if node.is_dir() { "directory" } else { "file" };
        Ok(CommandOutput::Text(format!(
            "  File: {}\n  Type: {kind}\n  Size: {}\nCreated: {}\nModified: {}",
            node.path,
            node.size,
            format_timestamp(node.created),
            format_timestamp(node.modified),
        )))
    }
}

// ---------------------------------------------------------------------------
// df
// ---------------------------------------------------------------------------

struct DfCmd;
impl Command for DfCmd {
    fn name(&self) -> &str {
        "df"
    }
    fn description(&self) -> &str {
        "Show filesystem usage"
    }
    fn usage(&self) -> &str {
        "df"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let stats = env.fs()?.get_stats()?;
        Ok(CommandOutput::Text(format!(
            "Filesystem      Items   Files   Dirs   Used\n\
             deskterm-store {:>6} {:>7} {:>6}   {}",
            stats.total_items,
            stats.files,
            stats.directories,
            format_size(stats.total_size)
        )))
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1}M", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}B")
    }
}

/// Register filesystem commands.
pub fn register_file_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(CatCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(TouchCmd));
    reg.register(Box::new(RmCmd));
    reg.register(Box::new(CpCmd));
    reg.register(Box::new(MvCmd));
    reg.register(Box::new(FindCmd));
    reg.register(Box::new(TreeCmd));
    reg.register(Box::new(StatCmd));
    reg.register(Box::new(DfCmd));
}

#[cfg(test)]
mod tests {
    use crate::test_support::Fixture;

    #[test]
    fn mkdir_touch_ls() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("mkdir /x"), "");
        assert_eq!(fx.run("touch /x/a.txt"), "");
        assert_eq!(fx.run("ls /x"), "a.txt");
        fx.run("touch /x/a.txt");
        assert_eq!(fx.run("ls /x"), "a.txt");
    }

    #[test]
    fn ls_marks_directories_and_long_format() {
        let mut fx = Fixture::new();
        let out = fx.run("ls");
        assert!(out.lines().any(|l| l == "documents/"));
        assert!(out.lines().any(|l| l == "readme.txt"));
        let long = fx.run("ls -l /etc");
        assert!(long.lines().all(|l| l.starts_with("-rw-r--r--")));
        assert!(long.contains("hostname"));
    }

    #[test]
    fn ls_hides_dotfiles_without_a() {
        let mut fx = Fixture::new();
        fx.run("touch .secret");
        assert!(!fx.run("ls").contains(".secret"));
        assert!(fx.run("ls -a").contains(".secret"));
        assert!(fx.run("la").contains(".secret"));
    }

    #[test]
    fn ls_missing_path() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("ls /nope"), "ls: no such file or directory: /nope");
    }

    #[test]
    fn cd_nonexistent_keeps_cwd() {
        let mut fx = Fixture::new();
        let before = fx.shell.state.cwd.clone();
        assert_eq!(
            fx.run("cd /nonexistent"),
            "cd: no such file or directory: /nonexistent"
        );
        assert_eq!(fx.shell.state.cwd, before);
    }

    #[test]
    fn cd_variants() {
        let mut fx = Fixture::new();
        fx.run("cd documents");
        assert_eq!(fx.run("pwd"), "/home/guest/documents");
        fx.run("cd ..");
        assert_eq!(fx.run("pwd"), "/home/guest");
        fx.run("cd /tmp");
        assert_eq!(fx.run("cd -"), "/home/guest");
        fx.run("cd /");
        fx.run("cd");
        assert_eq!(fx.run("pwd"), "/home/guest");
        assert_eq!(fx.run("cd readme.txt"), "cd: not a directory: readme.txt");
    }

    #[test]
    fn cat_files_and_stdin() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("cat /etc/hostname"), "deskterm");
        assert_eq!(fx.run("echo piped | cat"), "piped");
        assert_eq!(fx.run("cat /etc/hostname /etc/hostname"), "deskterm\ndeskterm");
        assert_eq!(fx.run("cat /etc"), "cat: is a directory: /etc");
        assert_eq!(fx.run("cat nope"), "cat: no such file or directory: /home/guest/nope");
    }

    #[test]
    fn mkdir_parents() {
        let mut fx = Fixture::new();
        assert!(fx.run("mkdir a/b/c").starts_with("mkdir: no such parent directory"));
        fx.run("mkdir -p a/b/c");
        assert!(fx.fs().get_item("/home/guest/a/b/c").unwrap().unwrap().is_dir());
        assert_eq!(fx.run("mkdir a"), "mkdir: file exists: /home/guest/a");
    }

    #[test]
    fn rm_flags() {
        let mut fx = Fixture::new();
        fx.run("mkdir -p d/e");
        fx.run("touch d/e/f");
        assert_eq!(fx.run("rm d"), "rm: is a directory: /home/guest/d");
        assert_eq!(fx.run("rm ghost"), "rm: no such file or directory: /home/guest/ghost");
        assert_eq!(fx.run("rm -f ghost"), "");
        fx.run("rm -r d");
        assert!(!fx.fs().exists("/home/guest/d").unwrap());
        assert!(!fx.fs().exists("/home/guest/d/e/f").unwrap());
    }

    #[test]
    fn rm_of_cwd_moves_to_nearest_existing_parent() {
        let mut fx = Fixture::new();
        fx.run("cd documents");
        fx.run("rm -r /home/guest/documents");
        assert_eq!(fx.run("pwd"), "/home/guest");
        assert!(fx.run("ls").contains("readme.txt"));
        assert_eq!(fx.run("touch new.txt"), "");
        assert!(fx.fs().exists("/home/guest/new.txt").unwrap());

        fx.run("mkdir -p /tmp/a/b/c");
        fx.run("cd /tmp/a/b/c");
        fx.run("rm -r /tmp/a ghost");
        assert_eq!(fx.run("pwd"), "/tmp");
    }

    #[test]
    fn rm_elsewhere_keeps_cwd() {
        let mut fx = Fixture::new();
        fx.run("cd documents");
        fx.run("rm -r /home/guest/projects");
        assert_eq!(fx.run("pwd"), "/home/guest/documents");
        assert_eq!(fx.shell.state.previous_dir.as_deref(), Some("/home/guest"));
    }

    #[test]
    fn rm_glob_removes_matches_only() {
        let mut fx = Fixture::new();
        fx.run("mkdir junk");
        fx.run("cd junk");
        fx.run("touch a.log b.log keep.txt");
        fx.run("rm *.log");
        assert_eq!(fx.run("ls"), "keep.txt");
    }

    #[test]
    fn cp_into_directory_and_recursive() {
        let mut fx = Fixture::new();
        fx.run("cp readme.txt documents");
        assert!(fx.fs().exists("/home/guest/documents/readme.txt").unwrap());
        assert!(fx.run("cp documents docs2").contains("is a directory"));
        fx.run("cp -r documents docs2");
        assert_eq!(
            fx.run("cat docs2/readme.txt"),
            fx.run("cat readme.txt")
        );
    }

    #[test]
    fn mv_renames_and_moves_into() {
        let mut fx = Fixture::new();
        fx.run("mv about.txt info.txt");
        assert!(fx.fs().exists("/home/guest/info.txt").unwrap());
        assert!(!fx.fs().exists("/home/guest/about.txt").unwrap());
        fx.run("mv info.txt projects");
        assert!(fx.fs().exists("/home/guest/projects/info.txt").unwrap());
        fx.run("cd projects");
        fx.run("mv /home/guest/projects /home/guest/work");
        assert_eq!(fx.run("pwd"), "/home/guest/work");
        assert!(fx.fs().exists("/home/guest/work/ideas.md").unwrap());
    }

    #[test]
    fn find_by_name() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("find / -name notes"), "/home/guest/documents/notes.txt");
        let all = fx.run("find documents");
        assert_eq!(all, "/home/guest/documents/notes.txt");
        let md = fx.run("find ~ -name '*.md'");
        assert_eq!(md, "/home/guest/projects/ideas.md");
        assert_eq!(fx.run("find / -name zzz"), "");
    }

    #[test]
    fn tree_counts() {
        let mut fx = Fixture::new();
        let out = fx.run("tree /var");
        assert_eq!(out, "/var\n└── log/\n    └── boot.log\n\n1 directories, 1 files");
    }

    #[test]
    fn stat_reports_kind_and_size() {
        let mut fx = Fixture::new();
        let out = fx.run("stat /etc/hostname");
        assert!(out.contains("Type: file"));
        assert!(out.contains("Size: 8"));
        assert!(fx.run("stat /etc").contains("Type: directory"));
    }

    #[test]
    fn df_reports_counts() {
        let mut fx = Fixture::new();
        let stats = fx.fs().get_stats().unwrap();
        let out = fx.run("df");
        assert!(out.starts_with("Filesystem"));
        assert!(out.contains(&stats.total_items.to_string()));
    }
}
