//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the default filter. Interactive playback
//! logs to a daily file so log lines never land in the middle of the player
//! screen; everything else logs to stderr.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_PREFIX: &str = "ritual-player.log";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub json: bool,
    /// Write to a rolling file in this directory instead of stderr
    pub file_dir: Option<PathBuf>,
}

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "ritual_player=debug"
    } else {
        "ritual_player=info"
    }
}

/// Default directory for player log files.
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("ritual-player").join("logs"))
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when logging to a file; it must be kept
/// alive until exit or buffered lines are lost.
pub fn init(options: &LogOptions) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(options.verbose)));

    let Some(dir) = options.file_dir.as_ref() else {
        let registry = tracing_subscriber::registry().with(filter);
        let result = if options.json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
        result.context("Failed to install tracing subscriber")?;
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if options.json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init()
    };
    result.context("Failed to install tracing subscriber")?;
    Ok(Some(guard))
}
