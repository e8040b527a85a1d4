use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `TECHNOVA_LOG=technova=debug`.
pub const LOG_ENV: &str = "TECHNOVA_LOG";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Used while the terminal UI owns the screen; stderr would draw over it.
    File(PathBuf),
}

impl LogTarget {
    /// Log file for interactive sessions, under the user cache directory.
    pub fn tui_default() -> Self {
        match dirs::cache_dir() {
            Some(dir) => LogTarget::File(dir.join("technova").join("technova.log")),
            None => LogTarget::File(PathBuf::new()),
        }
    }
}

/// Install the global subscriber. Defaults to warnings only.
pub fn init(target: &LogTarget) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let ansi = *target == LogTarget::Stderr && std::io::stderr().is_terminal();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer(target))
        .with_ansi(ansi)
        .with_target(false)
        .try_init();
}

fn make_writer(target: &LogTarget) -> BoxMakeWriter {
    match target {
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogTarget::File(path) => match open_log(path) {
            Some(file) => BoxMakeWriter::new(Mutex::new(file)),
            // Never fall back to stderr here: the UI is on screen.
            None => BoxMakeWriter::new(std::io::sink),
        },
    }
}

fn open_log(path: &Path) -> Option<File> {
    if path.as_os_str().is_empty() {
        return None;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
