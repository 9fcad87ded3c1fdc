//! The per-workflow pipeline: duplicate check,
//! pre-validation, credential gate, transfer (or simulate). Stops at the
//! first terminal outcome.

use std::sync::Arc;

use log::warn;
use transfer_spec::{TransferOptions, Workflow, WorkflowRecord, WorkflowStatus};

use crate::http::HttpClient;
use crate::plugins::{Deduplicator, Validator};

/// Runs one workflow through the pipeline, never returning an `Err`: every
/// outcome — including a failed `createWorkflow` call — is captured as a
/// [`WorkflowRecord`].
pub(super) async fn process_one(
    target_client: &HttpClient,
    workflow: Workflow,
    dedup: &Arc<dyn Deduplicator>,
    validators: &[Arc<dyn Validator>],
    target_existing: &[Workflow],
    options: &TransferOptions,
) -> WorkflowRecord {
    let source_id = workflow.id.clone();
    let name = workflow.name.clone();

    if dedup.is_duplicate(&workflow, target_existing) {
        let reason = dedup.reason(&workflow).unwrap_or_else(|| "Duplicate detected".to_string());
        return skipped(name, source_id, reason);
    }

    let mut validation_errors = Vec::new();
    let mut validation_warnings = Vec::new();
    for validator in validators {
        let result = validator.validate(&workflow);
        validation_errors.extend(result.errors);
        validation_warnings.extend(result.warnings);
    }
    if !validation_warnings.is_empty() {
        warn!("workflow '{name}' passed validation with warnings: {}", validation_warnings.join("; "));
    }
    if !validation_errors.is_empty() {
        return skipped(name, source_id, format!("Validation failed: {}", validation_errors.join("; ")));
    }

    if options.skip_credentials && workflow.has_credentials() {
        return skipped(name, source_id, "Workflow contains credentials (skipCredentials=true)".to_string());
    }

    if options.dry_run {
        return WorkflowRecord {
            name,
            source_id,
            target_id: Some("simulated".to_string()),
            status: WorkflowStatus::Transferred,
            reason: None,
            error: None,
            simulated: true,
        };
    }

    match target_client.create_workflow(&workflow).await {
        Ok(created) => {
            WorkflowRecord { name, source_id, target_id: created.id, status: WorkflowStatus::Transferred, reason: None, error: None, simulated: false }
        },
        Err(err) => WorkflowRecord { name, source_id, target_id: None, status: WorkflowStatus::Failed, reason: None, error: Some(err.to_string()), simulated: false },
    }
}

fn skipped(name: String, source_id: Option<String>, reason: String) -> WorkflowRecord {
    WorkflowRecord { name, source_id, target_id: None, status: WorkflowStatus::Skipped, reason: Some(reason), error: None, simulated: false }
}
