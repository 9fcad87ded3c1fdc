//! The three plugin contracts: exactly one active
//! [`Deduplicator`], zero or more [`Validator`]s, zero or more
//! [`Reporter`]s, all extending the shared [`PluginMeta`] identity.

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::path::PathBuf;

use transfer_spec::{TransferSummary, Workflow};

/// Which of the three plugin kinds an object satisfies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Deduplicator,
    Validator,
    Reporter,
}
impl Display for PluginKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Deduplicator => write!(f, "deduplicator"),
            Self::Validator => write!(f, "validator"),
            Self::Reporter => write!(f, "reporter"),
        }
    }
}

/// Identity and lifecycle shared by every plugin kind.
///
/// `enable`/`is_enabled` use interior mutability (an `AtomicBool` in
/// implementors) since plugins are shared behind `Arc` across concurrent
/// pipelines; all three kind-specific traits require `Send + Sync` for the
/// same reason — the engine invokes them from multiple pipelines at once
/// under `parallelism > 1`.
pub trait PluginMeta: Send + Sync {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn kind(&self) -> PluginKind;
    fn is_enabled(&self) -> bool;
    fn enable(&self);
}

/// Detects whether a candidate workflow already exists on TARGET.
///
/// Exactly one active instance participates in a given `transfer()` call.
pub trait Deduplicator: PluginMeta {
    fn is_duplicate(&self, candidate: &Workflow, existing: &[Workflow]) -> bool;
    /// A human description of the match for `candidate`, called only after
    /// [`Deduplicator::is_duplicate`] returned `true` for it. Takes
    /// `candidate` directly rather than remembering the last checked
    /// workflow, since concurrent pipelines under `parallelism > 1` call
    /// both methods interleaved across workflows.
    fn reason(&self, candidate: &Workflow) -> Option<String>;
}

/// The result of one [`Validator::validate`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PluginValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Checks a single workflow against a validity rule.
///
/// Any number may be configured; an error-severity result skips the
/// workflow, a warning-severity result is recorded but does not.
pub trait Validator: PluginMeta {
    fn validate(&self, workflow: &Workflow) -> PluginValidation;
}

/// Renders a completed [`TransferSummary`] to a report file.
pub trait Reporter: PluginMeta {
    fn generate(&self, summary: &TransferSummary) -> Result<PathBuf, ReporterError>;
}

/// Errors a [`Reporter::generate`] implementation may return.
///
/// A failing reporter is logged and skipped; it never fails the run.
#[derive(Debug)]
pub enum ReporterError {
    Io(std::io::Error),
    Render(String),
}
impl Display for ReporterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Io(err) => write!(f, "failed to write report file: {err}"),
            Self::Render(msg) => write!(f, "failed to render report: {msg}"),
        }
    }
}
impl error::Error for ReporterError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Render(_) => None,
        }
    }
}
