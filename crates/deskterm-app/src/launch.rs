//! App launching for the console build.

use deskterm_terminal::AppLauncher;
use deskterm_types::error::Result;

/// Stands in for a window manager: records the launch in the log.
pub struct LogLauncher;

impl AppLauncher for LogLauncher {
    fn launch(&self, app_id: &str) -> Result<()> {
        log::info!("Launching app {app_id}");
        Ok(())
    }
}
