//! `tracing` subscriber set-up for the tracker binary.
//!
//! Levels used across the workspace:
//!
//! - `warn`: malformed replay lines, missing hardware
//! - `info`: gesture completions, grips, session summary
//! - `debug`: arm/cancel transitions, hand changes
//! - `trace`: per-frame pose snapshots
//!
//! `RUST_LOG` overrides the level chosen on the command line.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level:           Level,
    pub with_timestamps: bool,
    /// Include the module path of each event.
    pub with_target:     bool,
    pub with_ansi:       bool,
    pub format:          LogFormat,
    /// Append to this file instead of stderr.
    pub log_file:        Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    /// One JSON object per event.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level:           Level::INFO,
            with_timestamps: false,
            with_target:     false,
            with_ansi:       true,
            format:          LogFormat::default(),
            log_file:        None,
        }
    }
}

impl LogConfig {
    /// Level from `-v`/`-q` counts: quiet wins, then 0 → info, 1 → debug, 2+ → trace.
    #[must_use]
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let level = if quiet {
            Level::WARN
        } else {
            match verbose {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };
        Self { level, ..Default::default() }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_timestamps(mut self, enable: bool) -> Self {
        self.with_timestamps = enable;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            // No colour codes in files
            let config = LogConfig { with_ansi: false, ..config.clone() };
            init_logging_with_writer(&config, SharedFileWriter::new(file))
        }
        None => init_logging_with_writer(config, io::stderr),
    }
}

/// Install the global subscriber writing to `writer`.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W) -> io::Result<()>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter(config.level);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match (config.format, config.with_timestamps) {
        (LogFormat::Json, _) => registry
            .with(fmt::layer().json().with_writer(writer).with_target(config.with_target))
            .try_init(),
        (LogFormat::Compact, true) => registry
            .with(fmt::layer().compact().with_writer(writer)
                .with_ansi(config.with_ansi).with_target(config.with_target))
            .try_init(),
        (LogFormat::Compact, false) => registry
            .with(fmt::layer().compact().without_time().with_writer(writer)
                .with_ansi(config.with_ansi).with_target(config.with_target))
            .try_init(),
        (LogFormat::Pretty, true) => registry
            .with(fmt::layer().with_writer(writer)
                .with_ansi(config.with_ansi).with_target(config.with_target))
            .try_init(),
        (LogFormat::Pretty, false) => registry
            .with(fmt::layer().without_time().with_writer(writer)
                .with_ansi(config.with_ansi).with_target(config.with_target))
            .try_init(),
    };
    result.map_err(io::Error::other)
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<File>>,
}

impl SharedFileWriter {
    fn new(file: File) -> Self {
        Self { file: Arc::new(Mutex::new(file)) }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard { file: Arc::clone(&self.file) }
    }
}

/// Workspace crates at `level`, everything else at warn, unless `RUST_LOG` is set.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("warn,pose_filter={level},extra_gestures={level},leap_gestures={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(LogConfig::from_verbosity(0, false).level, Level::INFO);
        assert_eq!(LogConfig::from_verbosity(1, false).level, Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity(5, false).level, Level::TRACE);
        assert_eq!(LogConfig::from_verbosity(2, true).level, Level::WARN);
    }

    #[test]
    fn directives_name_every_workspace_crate() {
        let d = default_directives(Level::DEBUG);
        assert_eq!(d, "warn,pose_filter=debug,extra_gestures=debug,leap_gestures=debug");
        assert!(EnvFilter::try_new(&d).is_ok());
    }

    #[test]
    fn builder_methods() {
        let cfg = LogConfig::default()
            .with_format(LogFormat::Json)
            .with_timestamps(true)
            .with_ansi(false)
            .with_log_file(Some(PathBuf::from("session.log")));
        assert_eq!(cfg.format, LogFormat::Json);
        assert!(cfg.with_timestamps);
        assert!(!cfg.with_ansi);
        assert_eq!(cfg.log_file.as_deref(), Some(std::path::Path::new("session.log")));
    }
}
