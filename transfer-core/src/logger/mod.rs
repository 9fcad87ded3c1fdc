//! Structured, leveled logging with mandatory secret redaction: a console
//! sink (ANSI colors by level), an optional file sink
//! (plain, append, optionally time-rotated), both passed through
//! [`transfer_shr::redact::redact`] before formatting.
//!
//! [`Logger`] implements the process-wide [`log::Log`] facade so library
//! code written against `log::{debug!, info!, warn!, error!}` is captured
//! without each component holding a direct reference to it; `TransferManager`
//! still keeps its own [`Logger`] clone to expose via `get_logger()`.

mod sink;

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use console::Style;
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use transfer_shr::redact::redact;

pub use sink::RotationOptions;
use sink::FileSink;

const DEFAULT_FILE_PATH: &str = "logs/transfer.log";

/// Where the optional file sink writes, and how it rotates.
#[derive(Clone, Debug, Default)]
pub struct FileSinkOptions {
    /// Defaults to `logs/transfer.log` relative to the current working
    /// directory when `None`.
    pub path: Option<PathBuf>,
    pub rotation: Option<RotationOptions>,
}

/// Constructor options for [`Logger::new`].
#[derive(Clone, Debug)]
pub struct LoggerOptions {
    pub level: LevelFilter,
    pub console: bool,
    pub file: Option<FileSinkOptions>,
}
impl Default for LoggerOptions {
    fn default() -> Self { Self { level: LevelFilter::Info, console: true, file: None } }
}

struct Inner {
    level: LevelFilter,
    console: bool,
    file: Option<Mutex<FileSink>>,
}

/// A cheaply cloneable logger handle; every clone shares the same sinks.
#[derive(Clone)]
pub struct Logger(Arc<Inner>);
impl Logger {
    /// Builds sinks per `options`. Creates the file sink's parent directory
    /// if it does not already exist.
    ///
    /// # Errors
    /// Returns [`LoggerError::Io`] if the file sink cannot be opened.
    pub fn new(options: LoggerOptions) -> Result<Self, LoggerError> {
        let file = match options.file {
            Some(file_opts) => {
                let path = file_opts.path.unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_PATH));
                let sink = FileSink::open(path, file_opts.rotation).map_err(LoggerError::Io)?;
                Some(Mutex::new(sink))
            },
            None => None,
        };
        Ok(Self(Arc::new(Inner { level: options.level, console: options.console, file })))
    }

    /// Installs this logger as the process-wide [`log`] facade
    /// implementation and sets the global max level to match.
    ///
    /// # Errors
    /// Returns [`log::SetLoggerError`] if a logger was already installed.
    pub fn install(&self) -> Result<(), log::SetLoggerError> {
        log::set_max_level(self.0.level);
        log::set_boxed_logger(Box::new(self.clone()))
    }

    /// Flushes and releases the file handle, if any.
    pub fn close(&self) {
        if let Some(sink) = &self.0.file {
            let _ = sink.lock().flush();
        }
    }

    fn format_plain(record: &Record<'_>) -> String {
        let timestamp = Local::now().to_rfc3339();
        let message = redact(&record.args().to_string());
        format!("{timestamp} {:<5} {message}", record.level())
    }

    fn style_for(level: Level) -> Style {
        match level {
            Level::Error => Style::new().red().bold(),
            Level::Warn => Style::new().yellow(),
            Level::Info => Style::new().green(),
            Level::Debug => Style::new().cyan(),
            Level::Trace => Style::new().dim(),
        }
    }
}
impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool { metadata.level() <= self.0.level }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format_plain(record);

        if self.0.console {
            let styled_level = Self::style_for(record.level()).apply_to(format!("{:<5}", record.level()));
            println!("{} {styled_level} {}", Local::now().to_rfc3339(), redact(&record.args().to_string()));
        }
        if let Some(sink) = &self.0.file {
            let mut sink = sink.lock();
            let _ = sink.write_line(&format!("{line}\n"));
        }
    }

    fn flush(&self) {
        if let Some(sink) = &self.0.file {
            let _ = sink.lock().flush();
        }
    }
}

/// Errors raised while constructing a [`Logger`].
#[derive(Debug)]
pub enum LoggerError {
    Io(io::Error),
}
impl Display for LoggerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Io(err) => write!(f, "failed to initialize log file: {err}"),
        }
    }
}
impl error::Error for LoggerError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn writes_redacted_records_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");
        let logger = Logger::new(LoggerOptions { level: LevelFilter::Debug, console: false, file: Some(FileSinkOptions { path: Some(path.clone()), rotation: None }) }).unwrap();

        logger.log(
            &Record::builder()
                .args(format_args!("using key n8n_api_1234567890abcdef1234"))
                .level(Level::Info)
                .target("test")
                .build(),
        );
        logger.close();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("n8n_api_1234567890abcdef1234"));
        assert!(contents.contains("INFO"));
    }

    #[test]
    fn filters_below_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");
        let logger = Logger::new(LoggerOptions { level: LevelFilter::Warn, console: false, file: Some(FileSinkOptions { path: Some(path.clone()), rotation: None }) }).unwrap();

        logger.log(&Record::builder().args(format_args!("should not appear")).level(Level::Debug).target("test").build());
        logger.close();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.is_empty());
    }
}
