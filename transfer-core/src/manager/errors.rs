//! [`TransferError`]: the errors that abort an entire `transfer()`/
//! `validate()` call before (or instead of) producing a summary.
//!
//! Per-workflow failures never reach this type — they are contained in
//! [`transfer_spec::TransferSummary::workflows`] as `failed`/`skipped`
//! records. A whole run aborts only on invalid options, a failed
//! connectivity probe, a missing required deduplicator, a logger/client
//! construction fault, or a manager that is already running.

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use transfer_spec::OptionsError;

use crate::http::HttpClientError;
use crate::logger::LoggerError;
use crate::Side;

/// Errors that abort a whole run before (or without) producing a summary.
#[derive(Debug)]
pub enum TransferError {
    /// `TransferOptions::validate` rejected the options passed to
    /// `transfer()`/`validate()`.
    InvalidOptions(OptionsError),
    /// An `HttpClient` call failed: either the construction-time
    /// `HttpClient::new` (a bad API key) or a fetch issued before any
    /// per-workflow processing began (`getWorkflows()` against SOURCE or
    /// TARGET).
    Http(HttpClientError),
    /// The default `Logger` could not be constructed.
    Logger(LoggerError),
    /// `testConnection()` failed against one side before any workflow was
    /// touched.
    Connectivity { side: Side, message: String, suggestion: Option<String> },
    /// The configured deduplicator name has no registered plugin; dedup is
    /// load-bearing so this aborts rather than degrading.
    MissingDeduplicator { name: String },
    /// `transfer()` was called while a previous call on the same manager
    /// was still running. The engine supports a single run at a time per
    /// instance and rejects the second call rather than racing its
    /// progress counters.
    AlreadyRunning,
}
impl TransferError {
    /// The process exit code a CLI caller should use: every variant of
    /// this type represents an abort before processing began, which
    /// always maps to `2`.
    #[must_use]
    pub fn exit_code(&self) -> i32 { 2 }
}
impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::InvalidOptions(err) => write!(f, "invalid transfer options: {err}"),
            Self::Http(err) => write!(f, "HTTP client error: {err}"),
            Self::Logger(err) => write!(f, "failed to construct logger: {err}"),
            Self::Connectivity { side, message, suggestion } => match suggestion {
                Some(suggestion) => write!(f, "{side} is unreachable: {message} ({suggestion})"),
                None => write!(f, "{side} is unreachable: {message}"),
            },
            Self::MissingDeduplicator { name } => write!(f, "no deduplicator plugin named '{name}' is registered"),
            Self::AlreadyRunning => write!(f, "a transfer is already running on this manager"),
        }
    }
}
impl error::Error for TransferError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InvalidOptions(err) => Some(err),
            Self::Http(err) => Some(err),
            Self::Logger(err) => Some(err),
            Self::Connectivity { .. } | Self::MissingDeduplicator { .. } | Self::AlreadyRunning => None,
        }
    }
}
