use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::app_dirs::AppDirs;

const DEFAULT_FILTER: &str = "warn";

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Route `tracing` output to a log file; the terminal belongs to the TUI.
/// `RUST_LOG` overrides the default `warn` filter. Logging is skipped when
/// no log file can be opened.
pub fn init() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    let Ok(file) = open_log(&path) else {
        return;
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
