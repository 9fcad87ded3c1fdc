//! The n8n workflow transfer engine.
//!
//! This crate is the "core" described by the project's specification: it
//! knows how to load a `{SOURCE, TARGET}` configuration, talk to either
//! server over HTTP with retry/backoff/rate-limiting, log safely, classify
//! failures into a fixed taxonomy, discover deduplicator/validator/reporter
//! plugins, and orchestrate a full transfer run across them. It does not
//! know how to parse command-line arguments, prompt a user, or ship a
//! concrete deduplicator/validator/reporter implementation — those are the
//! caller's concern.

pub mod config_loader;
pub mod error_reporter;
pub mod http;
pub mod logger;
pub mod manager;
pub mod plugins;

use std::fmt::{Display, Formatter, Result as FResult};

pub use config_loader::{ConfigLoader, ConnectivityReport};
pub use error_reporter::{ClassifiedError, ErrorCategory, ErrorReporter};
pub use http::{HttpClient, HttpClientError, HttpClientOptions, HttpClientStats};
pub use logger::{FileSinkOptions, Logger, LoggerError, LoggerOptions, RotationOptions};
pub use manager::{TransferError, TransferManager, TransferManagerOptions};
pub use plugins::{AnyPlugin, Deduplicator, DiscoveryResult, PluginKind, PluginMeta, PluginRegistry, PluginStats, PluginValidation, Reporter, ReporterError, Validator};

/// Which of the two configured servers an operation concerns.
///
/// Shared by [`ConfigLoader::test_connectivity`] and [`TransferError::Connectivity`]
/// rather than each defining its own — both describe the same SOURCE/TARGET
/// distinction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}
impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Source => write!(f, "SOURCE"),
            Self::Target => write!(f, "TARGET"),
        }
    }
}
