//! The result of a `transfer()` call ([`TransferSummary`]) and the live
//! progress snapshot ([`ProgressSnapshot`]) a caller can poll mid-run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::ReportFile;

/// The terminal outcome of one workflow that went through the transfer
/// pipeline.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Transferred,
    Skipped,
    Failed,
}

/// One entry in [`TransferSummary::workflows`], recording what happened to
/// a single SOURCE workflow.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub name: String,
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    pub status: WorkflowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub simulated: bool,
}

/// The status of a `TransferManager` as reported by
/// [`ProgressSnapshot::status`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// A live snapshot of an in-progress (or just-finished) run's counters, as
/// returned by `TransferManager::get_progress`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub status: RunStatus,
    pub total: u64,
    pub processed: u64,
    pub transferred: u64,
    pub skipped: u64,
    pub failed: u64,
    pub percentage: u8,
}
impl ProgressSnapshot {
    /// An idle snapshot with every counter at zero, the state before a
    /// `TransferManager` has ever run `transfer()`.
    #[must_use]
    pub fn idle() -> Self { Self { status: RunStatus::Idle, total: 0, processed: 0, transferred: 0, skipped: 0, failed: 0, percentage: 0 } }

    /// Recomputes `percentage` as `round(100 * processed / total)`, or `0`
    /// when `total` is zero.
    pub fn recompute_percentage(&mut self) {
        self.percentage = if self.total == 0 { 0 } else { ((self.processed as f64 * 100.0 / self.total as f64).round() as u8).min(100) };
    }
}

/// The full result of one `transfer()` call.
///
/// Invariant: `transferred + skipped + failed == processed <= total`, and
/// on a non-cancelled, non-aborted completion `processed == total`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummary {
    pub total: u64,
    pub transferred: u64,
    pub skipped: u64,
    pub failed: u64,
    pub processed: u64,
    pub duration_ms: u64,
    pub workflows: Vec<WorkflowRecord>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub source_url: String,
    pub target_url: String,
    pub dry_run: bool,
    pub cancelled: bool,
    #[serde(default)]
    pub reports: Vec<ReportFile>,
}
impl TransferSummary {
    /// The process exit code a CLI caller should use for this summary:
    /// `0` on a clean run, `1` if anything failed or the run was
    /// cancelled.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.cancelled || self.failed > 0 { 1 } else { 0 }
    }
}
