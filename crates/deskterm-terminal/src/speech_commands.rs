//! Speech commands: say, voices, voice.
//!
//! The selected voice lives in `$VOICE`, so `export VOICE=...` works too.

use std::thread;
use std::time::{Duration, Instant};

use deskterm_types::error::{DesktermError, Result};

use crate::commands::usage_error;
use crate::interpreter::{Command, CommandOutput, Environment};
use crate::services::SpeechService;

const VOICE_VAR: &str = "VOICE";
const POLL_INTERVAL: Duration = Duration::from_millis(25);

fn speech<'e>(env: &'e Environment<'_>, cmd: &str) -> Result<&'e dyn SpeechService> {
    env.services
        .speech
        .as_deref()
        .ok_or_else(|| DesktermError::Command(format!("{cmd}: speech is not available")))
}

/// Wait up to `wait` for the backend's voice list.
fn wait_for_voices(speech: &dyn SpeechService, wait: Duration) -> Option<Vec<String>> {
    let deadline = Instant::now() + wait;
    while !speech.voices_ready() {
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(POLL_INTERVAL);
    }
    Some(speech.voices())
}

// ---------------------------------------------------------------------------
// say
// ---------------------------------------------------------------------------

struct SayCmd;
impl Command for SayCmd {
    fn name(&self) -> &str {
        "say"
    }
    fn description(&self) -> &str {
        "Speak text aloud"
    }
    fn usage(&self) -> &str {
        "say <text...>"
    }
    fn category(&self) -> &str {
        "speech"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let text = if args.is_empty() {
            env.stdin.as_deref().unwrap_or_default().trim().to_string()
        } else {
            args.join(" ")
        };
        if text.is_empty() {
            return Err(usage_error(self.usage()));
        }
        let voice = env.state.var(VOICE_VAR).filter(|v| !v.is_empty());
        speech(env, "say")?.speak(&text, voice)?;
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// voices
// ---------------------------------------------------------------------------

struct VoicesCmd;
impl Command for VoicesCmd {
    fn name(&self) -> &str {
        "voices"
    }
    fn description(&self) -> &str {
        "List available voices"
    }
    fn usage(&self) -> &str {
        "voices"
    }
    fn category(&self) -> &str {
        "speech"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let wait = Duration::from_millis(env.config().speech.voice_wait_ms);
        let voices = wait_for_voices(speech(env, "voices")?, wait).ok_or_else(|| {
            DesktermError::Command("voices: voice list is still loading, try again".to_string())
        })?;
        if voices.is_empty() {
            return Ok(CommandOutput::Text("(no voices available)".to_string()));
        }
        let selected = env.state.var(VOICE_VAR).unwrap_or_default();
        let lines: Vec<String> = voices
            .iter()
            .map(|v| {
                let mark = if v.eq_ignore_ascii_case(selected) { '*' } else { ' ' };
                format!("{mark} {v}")
            })
            .collect();
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// voice
// ---------------------------------------------------------------------------

struct VoiceCmd;
impl Command for VoiceCmd {
    fn name(&self) -> &str {
        "voice"
    }
    fn description(&self) -> &str {
        "Show or select the speaking voice"
    }
    fn usage(&self) -> &str {
        "voice [name]"
    }
    fn category(&self) -> &str {
        "speech"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&name) = args.first() else {
            let current = env.state.var(VOICE_VAR).unwrap_or("(default)");
            return Ok(CommandOutput::Text(current.to_string()));
        };
        let service = speech(env, "voice")?;
        // Validate only against a loaded list; an unknown name is still
        // passed to the synthesizer while the list loads.
        let resolved = if service.voices_ready() {
            service
                .voices()
                .into_iter()
                .find(|v| v.eq_ignore_ascii_case(name))
                .ok_or_else(|| DesktermError::Command(format!("voice: unknown voice: {name}")))?
        } else {
            name.to_string()
        };
        env.state.env.insert(VOICE_VAR.to_string(), resolved.clone());
        Ok(CommandOutput::Text(format!("Voice set to {resolved}")))
    }
}

/// Register speech commands.
pub fn register_speech_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(SayCmd));
    reg.register(Box::new(VoicesCmd));
    reg.register(Box::new(VoiceCmd));
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::test_support::Fixture;

    #[derive(Clone, Default)]
    struct FakeSpeech {
        ready: Rc<Cell<bool>>,
        spoken: Rc<RefCell<Vec<(String, Option<String>)>>>,
    }

    impl SpeechService for FakeSpeech {
        fn voices_ready(&self) -> bool {
            self.ready.get()
        }
        fn voices(&self) -> Vec<String> {
            if self.ready.get() {
                vec!["en-us".to_string(), "de".to_string()]
            } else {
                Vec::new()
            }
        }
        fn speak(&self, text: &str, voice: Option<&str>) -> Result<()> {
            self.spoken
                .borrow_mut()
                .push((text.to_string(), voice.map(String::from)));
            Ok(())
        }
    }

    fn fixture(speech: FakeSpeech) -> Fixture {
        let mut fx = Fixture::new();
        fx.services.config.speech.voice_wait_ms = 30;
        fx.services.speech = Some(Box::new(speech));
        fx
    }

    #[test]
    fn say_uses_selected_voice() {
        let speech = FakeSpeech::default();
        speech.ready.set(true);
        let mut fx = fixture(speech.clone());
        fx.run("say hello there");
        assert_eq!(fx.run("voice DE"), "Voice set to de");
        fx.run("echo piped | say");
        let spoken = speech.spoken.borrow();
        assert_eq!(spoken[0], ("hello there".to_string(), None));
        assert_eq!(spoken[1], ("piped".to_string(), Some("de".to_string())));
    }

    #[test]
    fn voices_marks_selection() {
        let speech = FakeSpeech::default();
        speech.ready.set(true);
        let mut fx = fixture(speech);
        fx.run("voice en-us");
        assert_eq!(fx.run("voices"), "* en-us\n  de");
        assert_eq!(fx.run("voice klingon"), "voice: unknown voice: klingon");
        assert_eq!(fx.run("voice"), "en-us");
    }

    #[test]
    fn voices_times_out_while_loading() {
        let mut fx = fixture(FakeSpeech::default());
        assert_eq!(fx.run("voices"), "voices: voice list is still loading, try again");
        // Selection is accepted unchecked until the list is available.
        assert_eq!(fx.run("voice robot"), "Voice set to robot");
    }

    #[test]
    fn without_backend() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("say hi"), "say: speech is not available");
        assert_eq!(fx.run("voice"), "(default)");
    }
}
