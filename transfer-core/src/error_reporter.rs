//! Classifies raw errors into a fixed taxonomy and
//! attaches human-readable remediation text.
//!
//! `ErrorReporter::classify` is a pure function: no I/O, no logging, just a
//! match over whatever signal is available (a `reqwest::Error`, an HTTP
//! status, or a plain error message) into a `ClassifiedError` a caller can
//! show a user or fold into a report.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed error taxonomy a run's failures are classified into.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Authentication,
    NotFound,
    Timeout,
    Network,
    Storage,
    Validation,
    Unknown,
}
impl ErrorCategory {
    /// The remediation text shown alongside this category.
    #[must_use]
    pub fn suggestion(self) -> &'static str {
        match self {
            Self::Authentication => "verify the configured API key is correct and has not expired",
            Self::NotFound => "verify the workflow or resource id exists on this server",
            Self::Timeout => "check network connectivity or increase the configured timeout",
            Self::Network => "verify the server URL is reachable and DNS resolves correctly",
            Self::Storage => "check available disk space or use a different report/log path",
            Self::Validation => "check the supplied options or workflow against the expected schema",
            Self::Unknown => "no further information is available for this error",
        }
    }
}

/// The runtime shape of a classified error: a category, a human message,
/// a suggestion, and optional structured details (e.g. the offending
/// status code) for machine consumers.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ClassifiedError {
    pub code: ErrorCategory,
    pub message: String,
    pub suggestion: String,
    pub details: Option<Value>,
}

/// Stateless classifier: turns a raw error (optionally paired with an HTTP
/// status) into a [`ClassifiedError`].
#[derive(Debug, Default)]
pub struct ErrorReporter;
impl ErrorReporter {
    /// Classifies `err` using the fixed error taxonomy.
    ///
    /// When `status` is known (the error originated from an HTTP response),
    /// it takes priority over message sniffing: `401`/`403` is always
    /// `AUTHENTICATION`, `404` is always `NOT_FOUND`. Without a status, the
    /// classifier falls back to matching against the error's `Display`
    /// text and, transitively, its full [`transfer_shr::ErrorTrace`] chain.
    #[must_use]
    pub fn classify(err: &dyn StdError, status: Option<u16>) -> ClassifiedError {
        let code = status.and_then(Self::category_for_status).unwrap_or_else(|| Self::category_for_message(err));
        let details = status.map(|code| serde_json::json!({ "statusCode": code }));
        ClassifiedError { code, message: err.to_string(), suggestion: code.suggestion().to_string(), details }
    }

    fn category_for_status(status: u16) -> Option<ErrorCategory> {
        match status {
            401 | 403 => Some(ErrorCategory::Authentication),
            404 => Some(ErrorCategory::NotFound),
            408 => Some(ErrorCategory::Timeout),
            _ => None,
        }
    }

    fn category_for_message(err: &dyn StdError) -> ErrorCategory {
        let full = transfer_shr::ErrorTrace::trace(err).to_string().to_lowercase();
        if full.contains("unauthorized") || full.contains("forbidden") || full.contains("401") || full.contains("403") || full.contains("api key") {
            ErrorCategory::Authentication
        } else if full.contains("not found") || full.contains("404") {
            ErrorCategory::NotFound
        } else if full.contains("timed out") || full.contains("timeout") {
            ErrorCategory::Timeout
        } else if full.contains("connection refused")
            || full.contains("connection reset")
            || full.contains("dns")
            || full.contains("network")
            || full.contains("could not connect")
        {
            ErrorCategory::Network
        } else if full.contains("permission denied") || full.contains("no space left") || full.contains("disk") {
            ErrorCategory::Storage
        } else if full.contains("invalid") || full.contains("validation") || full.contains("must ") || full.contains("required") {
            ErrorCategory::Validation
        } else {
            ErrorCategory::Unknown
        }
    }
}
