use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Where log lines go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),

    /// Drop everything. Used while the full screen UI owns the terminal.
    Discard,
}

impl LogTarget {
    /// Pick the target for a run: an explicit file always wins, otherwise
    /// logs go to stderr unless the terminal is taken over by the UI.
    pub fn select(log_file: Option<&Path>, full_screen: bool) -> Self {
        match log_file {
            Some(path) => Self::File(path.to_path_buf()),
            None if full_screen => Self::Discard,
            None => Self::Stderr,
        }
    }
}

/// Build the filter: `RUST_LOG` when set, the given level otherwise.
pub fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder().with_default_directive(level.into()).from_env_lossy()
}

/// Install the global subscriber.
pub fn init(level: Level, target: &LogTarget) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(level));
    let result = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).try_init()
        }
        LogTarget::Discard => builder.with_writer(io::sink).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!(e)).context("installing log subscriber")
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}
