//! deskterm desktop entry point.
//!
//! Loads the config, opens the persistent store, seeds it on first run and
//! runs the terminal over stdin/stdout. Type a line and press Enter; control
//! characters in the line (Tab, Ctrl+L, ...) go through the line editor.
//! End of input or Ctrl+D on an empty line quits.

mod console;
mod launch;
mod speech;

use std::io::{BufRead, IsTerminal, Write};

use anyhow::Result;

use console::StdoutSink;
use deskterm_net::StdHttpClient;
use deskterm_store::{FileSystem, JsonFileStore, Scaffold};
use deskterm_terminal::{KeyOutcome, Services, Shell, Terminal};
use deskterm_types::config::DesktermConfig;
use launch::LogLauncher;
use speech::EspeakSpeech;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DesktermConfig::from_env()?;
    log::info!("Starting deskterm as {}@{}", config.user, config.hostname);

    let fs = open_store(&config);

    let mut shell = Shell::with_builtins(&config);
    if let Some(path) = &config.history_file {
        shell.state.restore_history(console::restore_history(path));
    }

    let services = Services::new(fs, config.clone())
        .with_launcher(Box::new(LogLauncher))
        .with_speech(Box::new(EspeakSpeech::spawn(&config.speech.program)))
        .with_http(Box::new(StdHttpClient::new()));

    let interactive = std::io::stdin().is_terminal();
    let mut terminal =
        Terminal::new(shell, services).with_mirror(Box::new(StdoutSink::new(!interactive)));

    if let Some(motd) = read_motd(&terminal) {
        println!("{motd}");
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        // Piped input gets the prompt with the echoed line instead.
        if interactive {
            print!("{}", terminal.prompt());
            std::io::stdout().flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            if interactive {
                println!();
            }
            break;
        }
        let text = line.trim_end_matches(['\r', '\n']);
        if console::feed_line(&mut terminal, text) == KeyOutcome::Exit {
            break;
        }
    }

    if let Some(path) = &config.history_file {
        if let Err(e) = console::save_history(path, terminal.shell().state.history()) {
            log::warn!("Failed to save history to {}: {e}", path.display());
        }
    }
    log::info!("Session ended");
    Ok(())
}

/// Open the JSON store and seed it on first run. A store that cannot be
/// opened leaves the session without a filesystem.
fn open_store(config: &DesktermConfig) -> Option<FileSystem> {
    let opened = JsonFileStore::open(&config.store_path)
        .and_then(|store| FileSystem::new(Box::new(store)))
        .and_then(|mut fs| {
            let scaffold = Scaffold::standard(&config.user, &config.hostname);
            if fs.ensure_scaffolding(&scaffold)? {
                log::info!("Seeded filesystem at {}", config.store_path.display());
            }
            Ok(fs)
        });
    match opened {
        Ok(fs) => Some(fs),
        Err(e) => {
            log::warn!(
                "Filesystem unavailable ({}): {e}",
                config.store_path.display()
            );
            eprintln!("deskterm: filesystem unavailable: {e}");
            None
        },
    }
}

fn read_motd(terminal: &Terminal) -> Option<String> {
    let fs = terminal.services().fs.as_ref()?;
    let text = fs.read_file("/etc/motd").ok()?;
    Some(text.trim_end().to_string()).filter(|t| !t.is_empty())
}
