//! Wire and data-model types shared across the transfer engine.
//!
//! This crate defines the shapes that cross the engine's boundaries: the
//! `Workflow` the two servers exchange, the `TransferOptions` a caller hands
//! to a run, the `TransferSummary` and `ValidationResult` a run hands back,
//! and the small `Config`/`HttpUrl` types that describe a server endpoint.
//! Nothing in here talks to a network or a filesystem; that is
//! `transfer-core`'s job.

pub mod address;
pub mod config;
pub mod options;
pub mod report;
pub mod summary;
pub mod validation;
pub mod workflow;

pub use address::{AddressError, HttpUrl};
pub use config::{Config, ConfigError, ServerConfig};
pub use options::{Filters, OptionsError, TransferOptions};
pub use report::{ReportFile, ReportFormat};
pub use summary::{ProgressSnapshot, RunStatus, TransferSummary, WorkflowRecord, WorkflowStatus};
pub use validation::{Severity, ValidationIssue, ValidationPhase, ValidationResult, WorkflowIssues};
pub use workflow::{Node, Tag, Workflow};
