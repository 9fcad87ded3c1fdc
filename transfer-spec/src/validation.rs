//! The result of a standalone `validate()` call: [`ValidationResult`] and
//! the per-workflow, per-validator [`ValidationIssue`]s it aggregates.

use serde::{Deserialize, Serialize};

/// Whether a [`ValidationIssue`] should skip the workflow (`Error`) or
/// merely be recorded (`Warning`).
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Which stage of the pipeline a [`ValidationIssue`] was raised in.
///
/// Only `Pre` (the pipeline's pre-validation step) and `Standalone` (a bare
/// `validate()` call) are modeled; a theoretical `post` phase (validation
/// after a workflow lands on TARGET) is never actually invoked anywhere in
/// this engine, so no dead variant is carried here.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPhase {
    Pre,
    Standalone,
}

/// One message a single validator plugin produced for a single workflow.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub validator: String,
    pub phase: ValidationPhase,
    pub message: String,
    pub severity: Severity,
}

/// All issues raised for one workflow, across every configured validator.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowIssues {
    pub workflow: String,
    pub workflow_id: Option<String>,
    pub issues: Vec<ValidationIssue>,
}

/// The aggregate result of running every configured validator over every
/// filtered SOURCE workflow, without touching TARGET.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub total: u64,
    pub valid: u64,
    pub invalid: u64,
    pub errors: u64,
    pub warnings: u64,
    pub issues: Vec<WorkflowIssues>,
    pub validators: Vec<String>,
}
