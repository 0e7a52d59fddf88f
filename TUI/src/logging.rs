//! Tracing setup.
//!
//! The TUI owns the terminal, so interactive sessions log to a file. Headless
//! runs log to stderr.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "codebuddy-tui.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    /// Append to a file chosen on the command line
    File(&'a Path),
    /// Per-user state directory, or a fresh private file in the temp dir
    /// when the platform has none
    UserDefault,
}

/// Per-user log location, e.g. `~/.local/state/codebuddy/codebuddy-tui.log`.
pub fn user_log_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("codebuddy").join(LOG_FILE_NAME))
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Create a new log file with a random name in the shared temp dir. The name
/// is never reused, so a pre-planted file or symlink cannot be opened.
fn create_private_temp_log() -> std::io::Result<(File, PathBuf)> {
    tempfile::Builder::new()
        .prefix("codebuddy-tui-")
        .suffix(".log")
        .tempfile()?
        .keep()
        .map_err(|e| e.error)
}

fn open_user_default() -> std::io::Result<(File, PathBuf)> {
    if let Some(path) = user_log_path() {
        if let Ok(file) = open_append(&path) {
            return Ok((file, path));
        }
    }
    create_private_temp_log()
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("codebuddy=debug,info")
            } else {
                EnvFilter::try_new("codebuddy=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns the log file path, if any.
pub fn init_tracing(verbose: bool, target: LogTarget<'_>) -> anyhow::Result<Option<PathBuf>> {
    let layer = fmt::layer()
        .with_target(verbose)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .compact();

    let (file, path) = match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter(verbose))
                .with(layer.with_writer(std::io::stderr))
                .try_init()?;
            return Ok(None);
        }
        LogTarget::File(path) => (open_append(path)?, path.to_path_buf()),
        LogTarget::UserDefault => open_user_default()?,
    };

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(layer.with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()?;

    Ok(Some(path))
}
