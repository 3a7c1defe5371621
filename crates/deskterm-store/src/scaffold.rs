//! First-run seed tree.

/// Default directories and files created the first time a store is used.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaffold {
    /// Directories, parents before children.
    pub directories: Vec<String>,
    /// `(path, content)` pairs; parents must appear in `directories`.
    pub files: Vec<(String, String)>,
}

impl Scaffold {
    /// The standard seed for `user` on `hostname`.
    pub fn standard(user: &str, hostname: &str) -> Self {
        let home = format!("/home/{user}");
        let directories = vec![
            "/bin".to_string(),
            "/etc".to_string(),
            "/home".to_string(),
            home.clone(),
            format!("{home}/documents"),
            format!("{home}/projects"),
            format!("{home}/downloads"),
            "/tmp".to_string(),
            "/var".to_string(),
            "/var/log".to_string(),
        ];
        let files = vec![
            (
                format!("{home}/readme.txt"),
                format!(
                    "Welcome to {hostname}, {user}!\n\
                     This terminal keeps a small filesystem that survives restarts.\n\
                     Type 'help' to see what you can do, or 'open <app>' to launch an app."
                ),
            ),
            (
                format!("{home}/about.txt"),
                "A personal site dressed up as a desktop OS.\n\
                 Apps: calculator, sadtrombone, stepmania, wordle, doom, notepad, youtube.\n\
                 Everything here is a toy, and that is the point."
                    .to_string(),
            ),
            (
                format!("{home}/documents/notes.txt"),
                "todo: finish the rhythm game charts\n\
                 todo: teach the wordle helper new words\n\
                 done: port doom"
                    .to_string(),
            ),
            (
                format!("{home}/projects/ideas.md"),
                "# Ideas\n\n- a shell that forgets nothing\n- a calculator that tells jokes\n"
                    .to_string(),
            ),
            ("/etc/hostname".to_string(), hostname.to_string()),
            (
                "/etc/motd".to_string(),
                format!("{hostname}: have a look around. Nothing here bites."),
            ),
            (
                "/bin/README".to_string(),
                "Commands live in the shell, not on disk. Try 'help'.".to_string(),
            ),
            ("/var/log/boot.log".to_string(), "boot: ok".to_string()),
        ];
        Self { directories, files }
    }
}
