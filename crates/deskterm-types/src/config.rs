//! Runtime configuration.
//!
//! Loaded from a TOML file. Every field has a default, so a partial file
//! (or no file at all) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DESKTERM_CONFIG";

/// Environment variable overriding [`DesktermConfig::store_path`].
pub const STORE_ENV: &str = "DESKTERM_STORE";

/// Config file looked up in the working directory when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "deskterm.toml";

/// Top-level deskterm configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktermConfig {
    /// Login name shown in the prompt and by `whoami`.
    pub user: String,
    /// Host name shown in the prompt and by `hostname`/`uname`.
    pub hostname: String,
    /// JSON document backing the persistent filesystem.
    pub store_path: PathBuf,
    /// File the session history is restored from and saved to.
    pub history_file: Option<PathBuf>,
    /// Maximum number of history entries kept.
    pub history_size: usize,
    /// Maximum number of rows kept in the terminal output buffer.
    pub output_lines: usize,
    /// App ids the `open` command accepts.
    pub apps: Vec<String>,
    pub network: NetworkConfig,
    pub speech: SpeechConfig,
}

/// Settings for `ping` and `curl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-probe timeout for `ping`, in milliseconds.
    pub ping_timeout_ms: u64,
    /// Probes sent by `ping` when `-c` is not given.
    pub ping_count: u32,
    /// Timeout for `curl` requests, in milliseconds.
    pub request_timeout_ms: u64,
    /// Response bodies longer than this are truncated by `curl`.
    pub curl_max_bytes: usize,
    /// Prefix prepended to the percent-encoded target URL by `curl --proxy`.
    pub cors_proxy: String,
}

/// Settings for the speech backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Synthesizer executable (`espeak-ng`, `espeak`, ...).
    pub program: String,
    /// How long `voices` waits for the voice list, in milliseconds.
    pub voice_wait_ms: u64,
}

impl Default for DesktermConfig {
    fn default() -> Self {
        Self {
            user: "guest".to_string(),
            hostname: "deskterm".to_string(),
            store_path: PathBuf::from("deskterm-fs.json"),
            history_file: Some(PathBuf::from(".deskterm_history")),
            history_size: 100,
            output_lines: 1000,
            apps: [
                "calculator",
                "sadtrombone",
                "stepmania",
                "wordle",
                "doom",
                "notepad",
                "youtube",
                "terminal",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            network: NetworkConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ping_timeout_ms: 5000,
            ping_count: 4,
            request_timeout_ms: 10_000,
            curl_max_bytes: 5000,
            cors_proxy: "https://corsproxy.io/?".to_string(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            voice_wait_ms: 2000,
        }
    }
}

impl DesktermConfig {
    /// Home directory of the configured user inside the virtual filesystem.
    pub fn home(&self) -> String {
        format!("/home/{}", self.user)
    }

    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the config file from the environment and apply overrides.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::load(&path)?;
        if let Some(store) = std::env::var_os(STORE_ENV) {
            config.store_path = PathBuf::from(store);
        }
        Ok(config)
    }
}
