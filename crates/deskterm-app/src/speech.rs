//! Speech through an external `espeak`-style synthesizer.

use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

use deskterm_terminal::SpeechService;
use deskterm_types::error::{DesktermError, Result};

/// Runs `<program> [-v voice] <text>` per utterance. The voice list comes
/// from `<program> --voices`, loaded on a background thread at startup.
pub struct EspeakSpeech {
    program: String,
    voices: Arc<Mutex<Option<Vec<String>>>>,
}

impl EspeakSpeech {
    pub fn spawn(program: &str) -> Self {
        let voices = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&voices);
        let prog = program.to_string();
        thread::spawn(move || {
            let list = match Command::new(&prog).arg("--voices").output() {
                Ok(out) if out.status.success() => {
                    parse_voice_list(&String::from_utf8_lossy(&out.stdout))
                },
                Ok(out) => {
                    log::warn!("{prog} --voices exited with {}", out.status);
                    Vec::new()
                },
                Err(e) => {
                    log::warn!("Speech unavailable, cannot run {prog}: {e}");
                    Vec::new()
                },
            };
            log::debug!("Loaded {} voices", list.len());
            if let Ok(mut guard) = slot.lock() {
                *guard = Some(list);
            }
        });
        Self {
            program: program.to_string(),
            voices,
        }
    }
}

impl SpeechService for EspeakSpeech {
    fn voices_ready(&self) -> bool {
        self.voices.lock().is_ok_and(|v| v.is_some())
    }

    fn voices(&self) -> Vec<String> {
        self.voices
            .lock()
            .ok()
            .and_then(|v| v.clone())
            .unwrap_or_default()
    }

    fn speak(&self, text: &str, voice: Option<&str>) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        if let Some(voice) = voice {
            cmd.args(["-v", voice]);
        }
        let mut child = cmd
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DesktermError::Speech(format!("cannot run {}: {e}", self.program)))?;
        // Speaking must not block the prompt; reap the child in the background.
        thread::spawn(move || {
            if let Err(e) = child.wait() {
                log::warn!("Speech process failed: {e}");
            }
        });
        Ok(())
    }
}

/// Voice names from `espeak --voices` output: the language column of every
/// row after the header.
fn parse_voice_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|row| row.split_whitespace().nth(1))
        .map(String::from)
        .collect()
}
