//! Collaborators the shell talks to but does not own the behaviour of.

use deskterm_net::HttpClient;
use deskterm_store::FileSystem;
use deskterm_types::config::DesktermConfig;
use deskterm_types::error::Result;

/// Receives output rows as they are produced.
pub trait OutputSink {
    /// One output row.
    fn emit(&mut self, line: &str);

    /// The prompt plus submitted line, echoed before the command runs.
    fn echo(&mut self, line: &str) {
        self.emit(line);
    }

    /// Drop everything shown so far.
    fn clear(&mut self) {}
}

impl OutputSink for Vec<String> {
    fn emit(&mut self, line: &str) {
        self.push(line.to_string());
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

/// Window-manager hook used by `open`.
pub trait AppLauncher {
    fn launch(&self, app_id: &str) -> Result<()>;
}

/// Text-to-speech backend used by `say`, `voices` and `voice`.
pub trait SpeechService {
    /// Whether the voice list has finished loading.
    fn voices_ready(&self) -> bool;

    /// Available voice names (empty until ready).
    fn voices(&self) -> Vec<String>;

    /// Speak `text`, optionally with a named voice.
    fn speak(&self, text: &str, voice: Option<&str>) -> Result<()>;
}

/// Everything a command may reach besides the shell state.
///
/// `fs` is `None` when the persistent store failed to open; filesystem
/// commands then fail while the rest keep working.
pub struct Services {
    pub fs: Option<FileSystem>,
    pub config: DesktermConfig,
    pub launcher: Option<Box<dyn AppLauncher>>,
    pub speech: Option<Box<dyn SpeechService>>,
    pub http: Option<Box<dyn HttpClient>>,
}

impl Services {
    /// Services with a filesystem and no optional collaborators.
    pub fn new(fs: Option<FileSystem>, config: DesktermConfig) -> Self {
        Self {
            fs,
            config,
            launcher: None,
            speech: None,
            http: None,
        }
    }

    pub fn with_launcher(mut self, launcher: Box<dyn AppLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_speech(mut self, speech: Box<dyn SpeechService>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_http(mut self, http: Box<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("fs", &self.fs.is_some())
            .field("launcher", &self.launcher.is_some())
            .field("speech", &self.speech.is_some())
            .field("http", &self.http.is_some())
            .finish_non_exhaustive()
    }
}
