//! [`TransferManager`]: the orchestrator. Validates options, loads
//! plugins, fetches and filters workflows, runs the per-workflow pipeline
//! in parallel batches, tracks progress, and generates reports.

mod errors;
mod filter;
mod pipeline;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use log::{error, warn};
use parking_lot::Mutex;
use transfer_spec::{Config, ProgressSnapshot, ReportFile, ReportFormat, RunStatus, Severity, TransferOptions, TransferSummary, ValidationIssue, ValidationPhase, ValidationResult, Workflow, WorkflowIssues};

pub use self::errors::TransferError;
use crate::http::{HttpClient, HttpClientOptions};
use crate::logger::{Logger, LoggerOptions};
use crate::plugins::{Deduplicator, PluginRegistry, Validator};
use crate::Side;

/// Optional collaborators a caller can inject into [`TransferManager::new`]
/// instead of letting it construct defaults.
#[derive(Default)]
pub struct TransferManagerOptions {
    pub logger: Option<Logger>,
    pub plugin_registry: Option<Arc<PluginRegistry>>,
}

/// Orchestrates a full transfer (or standalone validation) between two
/// configured servers.
///
/// Owns both `HttpClient`s and, unless injected, the `Logger`; the
/// `PluginRegistry` is always shared behind an `Arc` since plugins
/// themselves are `Arc`-shared across concurrent pipelines. `TransferManager`
/// is `Send + Sync` and safe to hold across threads, but only one
/// `transfer()` call runs at a time per instance: a second call made while
/// one is in flight returns [`TransferError::AlreadyRunning`] immediately
/// rather than racing the shared progress/cancellation state.
pub struct TransferManager {
    config: Config,
    source_client: HttpClient,
    target_client: HttpClient,
    logger: Logger,
    registry: Arc<PluginRegistry>,
    progress: Mutex<ProgressSnapshot>,
    cancelled: AtomicBool,
    running: AtomicBool,
}

/// Releases [`TransferManager::running`] when a `transfer()` call returns by
/// any path, including the early returns on a failed connectivity probe or a
/// missing deduplicator.
struct RunGuard<'a>(&'a AtomicBool);
impl Drop for RunGuard<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::Release); }
}
impl TransferManager {
    /// Validates `config` (already validated by construction, so this only
    /// constructs collaborators), builds both `HttpClient`s, and adopts or
    /// constructs a logger and plugin registry.
    ///
    /// # Errors
    /// [`TransferError::Http`] if either server's API key is
    /// blank; [`TransferError::Logger`] if a default logger could not be
    /// built (only possible if a caller-supplied logger is absent and the
    /// default file sink, which is disabled by default, were enabled).
    pub fn new(config: Config, options: TransferManagerOptions) -> Result<Self, TransferError> {
        let source_client =
            HttpClient::new(config.source.url.clone(), config.source.api_key.clone(), HttpClientOptions::default()).map_err(TransferError::Http)?;
        let target_client =
            HttpClient::new(config.target.url.clone(), config.target.api_key.clone(), HttpClientOptions::default()).map_err(TransferError::Http)?;
        let logger = match options.logger {
            Some(logger) => logger,
            None => Logger::new(LoggerOptions::default()).map_err(TransferError::Logger)?,
        };
        let registry = options.plugin_registry.unwrap_or_else(|| Arc::new(PluginRegistry::new()));

        Ok(Self {
            config,
            source_client,
            target_client,
            logger,
            registry,
            progress: Mutex::new(ProgressSnapshot::idle()),
            cancelled: AtomicBool::new(false),
            running: AtomicBool::new(false),
        })
    }

    /// Runs one full transfer end to end: connectivity checks, plugin
    /// resolution, fetch, filter, per-workflow pipeline, and reporting.
    ///
    /// # Errors
    /// Aborts with [`TransferError`] on invalid options, a failed
    /// connectivity probe against either side, a missing required
    /// deduplicator, or a `transfer()` already running on this manager.
    /// Every other failure is contained per-workflow in the returned
    /// [`TransferSummary`].
    pub async fn transfer(&self, options: TransferOptions) -> Result<TransferSummary, TransferError> {
        if self.running.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Err(TransferError::AlreadyRunning);
        }
        let _guard = RunGuard(&self.running);

        options.validate().map_err(TransferError::InvalidOptions)?;

        self.cancelled.store(false, Ordering::Relaxed);
        *self.progress.lock() = ProgressSnapshot { status: RunStatus::Running, ..ProgressSnapshot::idle() };
        let start_time = Utc::now();

        if let Err(err) = self.check_connectivity(Side::Source).await {
            self.progress.lock().status = RunStatus::Failed;
            return Err(err);
        }
        if let Err(err) = self.check_connectivity(Side::Target).await {
            self.progress.lock().status = RunStatus::Failed;
            return Err(err);
        }

        let dedup = self.registry.get_deduplicator(&options.deduplicator).ok_or_else(|| {
            self.progress.lock().status = RunStatus::Failed;
            TransferError::MissingDeduplicator { name: options.deduplicator.clone() }
        })?;
        ensure_enabled(dedup.as_ref(), "deduplicator");

        let validators = self.resolve_validators(&options.validators);
        let reporters = self.resolve_reporters(&options.reporters);

        let source_workflows = self.source_client.get_workflows().await.map_err(TransferError::Http)?;
        let filtered = filter::apply(source_workflows, options.filters.as_ref());
        let target_workflows = self.target_client.get_workflows().await.map_err(TransferError::Http)?;

        let total = filtered.len() as u64;
        self.progress.lock().total = total;

        let records = if filtered.is_empty() {
            Vec::new()
        } else {
            self.process_all(filtered, &dedup, &validators, &target_workflows, &options).await
        };

        let cancelled = self.cancelled.load(Ordering::Relaxed);
        let end_time = Utc::now();
        let mut summary = build_summary(total, &records, &self.config, &options, start_time, end_time, cancelled);

        {
            let mut progress = self.progress.lock();
            progress.status = if cancelled { RunStatus::Cancelled } else { RunStatus::Completed };
        }

        summary.reports = self.run_reporters(&reporters, &summary);
        Ok(summary)
    }

    /// Runs every configured validator over the filtered SOURCE workflow
    /// list without ever touching TARGET. Every issue's `phase` is
    /// `Standalone`.
    ///
    /// # Errors
    /// Aborts with [`TransferError`] on invalid options or a failed SOURCE
    /// connectivity probe.
    pub async fn validate(&self, options: TransferOptions) -> Result<ValidationResult, TransferError> {
        options.validate().map_err(TransferError::InvalidOptions)?;
        self.check_connectivity(Side::Source).await?;

        let validators = self.resolve_validators(&options.validators);
        let source_workflows = self.source_client.get_workflows().await.map_err(TransferError::Http)?;
        let filtered = filter::apply(source_workflows, options.filters.as_ref());

        let mut total = 0u64;
        let mut valid = 0u64;
        let mut invalid = 0u64;
        let mut error_count = 0u64;
        let mut warning_count = 0u64;
        let mut issues = Vec::new();

        for workflow in &filtered {
            total += 1;
            let mut workflow_issues = Vec::new();
            for validator in &validators {
                let result = validator.validate(workflow);
                for message in result.errors {
                    error_count += 1;
                    workflow_issues.push(ValidationIssue { validator: validator.name().to_string(), phase: ValidationPhase::Standalone, message, severity: Severity::Error });
                }
                for message in result.warnings {
                    warning_count += 1;
                    workflow_issues.push(ValidationIssue { validator: validator.name().to_string(), phase: ValidationPhase::Standalone, message, severity: Severity::Warning });
                }
            }
            if workflow_issues.iter().any(|issue| issue.severity == Severity::Error) {
                invalid += 1;
            } else {
                valid += 1;
            }
            issues.push(WorkflowIssues { workflow: workflow.name.clone(), workflow_id: workflow.id.clone(), issues: workflow_issues });
        }

        Ok(ValidationResult { total, valid, invalid, errors: error_count, warnings: warning_count, issues, validators: validators.iter().map(|v| v.name().to_string()).collect() })
    }

    /// A snapshot of the current (or most recently finished) run's
    /// counters.
    #[must_use]
    pub fn get_progress(&self) -> ProgressSnapshot { self.progress.lock().clone() }

    /// Requests cancellation. Never aborts an in-flight HTTP call — it
    /// only prevents new work from starting.
    ///
    /// # Returns
    /// `true` iff the manager was `RUNNING` at the time of the call.
    pub fn cancel(&self) -> bool {
        let was_running = matches!(self.progress.lock().status, RunStatus::Running);
        if was_running {
            self.cancelled.store(true, Ordering::Relaxed);
            warn!("cancellation requested; no new workflows will start");
        }
        was_running
    }

    /// Registers a plugin directly on this manager's registry.
    ///
    /// # Errors
    /// Propagates [`crate::plugins::PluginError`] from the underlying
    /// `PluginRegistry::register` call, wrapped as a `String` for a stable
    /// error surface at this boundary.
    pub fn register_plugin(&self, plugin: crate::plugins::AnyPlugin) -> Result<(), String> { self.registry.register(plugin).map_err(|err| err.to_string()) }

    #[must_use]
    pub fn get_plugin_registry(&self) -> Arc<PluginRegistry> { Arc::clone(&self.registry) }

    #[must_use]
    pub fn get_logger(&self) -> Logger { self.logger.clone() }

    async fn check_connectivity(&self, side: Side) -> Result<(), TransferError> {
        let client = match side {
            Side::Source => &self.source_client,
            Side::Target => &self.target_client,
        };
        let result = client.test_connection().await;
        if result.success {
            Ok(())
        } else {
            Err(TransferError::Connectivity { side, message: result.error.unwrap_or_else(|| "unknown connectivity failure".to_string()), suggestion: result.suggestion })
        }
    }

    fn resolve_validators(&self, names: &[String]) -> Vec<Arc<dyn Validator>> {
        names
            .iter()
            .filter_map(|name| match self.registry.get_validator(name) {
                Some(validator) => {
                    ensure_enabled(validator.as_ref(), "validator");
                    Some(validator)
                },
                None => {
                    warn!("validator '{name}' is not registered; skipping");
                    None
                },
            })
            .collect()
    }

    fn resolve_reporters(&self, names: &[String]) -> Vec<Arc<dyn crate::plugins::Reporter>> {
        names
            .iter()
            .filter_map(|name| match self.registry.get_reporter(name) {
                Some(reporter) => {
                    ensure_enabled(reporter.as_ref(), "reporter");
                    Some(reporter)
                },
                None => {
                    warn!("reporter '{name}' is not registered; skipping");
                    None
                },
            })
            .collect()
    }

    async fn process_all(
        &self,
        filtered: Vec<Workflow>,
        dedup: &Arc<dyn Deduplicator>,
        validators: &[Arc<dyn Validator>],
        target_workflows: &[Workflow],
        options: &TransferOptions,
    ) -> Vec<transfer_spec::WorkflowRecord> {
        let mut records = Vec::with_capacity(filtered.len());
        let batch_size = (options.parallelism as usize).max(1);

        for batch in filtered.chunks(batch_size) {
            if self.cancelled.load(Ordering::Relaxed) {
                break;
            }
            let outcomes = join_all(batch.iter().cloned().map(|workflow| pipeline::process_one(&self.target_client, workflow, dedup, validators, target_workflows, options))).await;
            for record in outcomes {
                self.bump_progress(&record.status);
                records.push(record);
            }
        }
        records
    }

    fn bump_progress(&self, status: &transfer_spec::WorkflowStatus) {
        use transfer_spec::WorkflowStatus::*;
        let mut progress = self.progress.lock();
        progress.processed += 1;
        match status {
            Transferred => progress.transferred += 1,
            Skipped => progress.skipped += 1,
            Failed => progress.failed += 1,
        }
        progress.recompute_percentage();
    }

    fn run_reporters(&self, reporters: &[Arc<dyn crate::plugins::Reporter>], summary: &TransferSummary) -> Vec<ReportFile> {
        let mut reports = Vec::new();
        for reporter in reporters {
            match reporter.generate(summary) {
                Ok(path) => reports.push(ReportFile { reporter: reporter.name().to_string(), path, format: ReportFormat::from_reporter_name(reporter.name()) }),
                Err(err) => error!("reporter '{}' failed: {err}", reporter.name()),
            }
        }
        reports
    }
}

fn ensure_enabled(plugin: &(impl crate::plugins::PluginMeta + ?Sized), kind: &str) {
    if !plugin.is_enabled() {
        warn!("{kind} '{}' was disabled; enabling it for this run", plugin.name());
        plugin.enable();
    }
}

#[allow(clippy::too_many_arguments)]
fn build_summary(
    total: u64,
    records: &[transfer_spec::WorkflowRecord],
    config: &Config,
    options: &TransferOptions,
    start_time: chrono::DateTime<Utc>,
    end_time: chrono::DateTime<Utc>,
    cancelled: bool,
) -> TransferSummary {
    use transfer_spec::WorkflowStatus::*;

    let processed = records.len() as u64;
    let transferred = records.iter().filter(|r| r.status == Transferred).count() as u64;
    let skipped = records.iter().filter(|r| r.status == Skipped).count() as u64;
    let failed = records.iter().filter(|r| r.status == Failed).count() as u64;

    TransferSummary {
        total,
        transferred,
        skipped,
        failed,
        processed,
        duration_ms: (end_time - start_time).num_milliseconds().max(0) as u64,
        workflows: records.to_vec(),
        start_time,
        end_time,
        source_url: config.source.url.to_string(),
        target_url: config.target.url.to_string(),
        dry_run: options.dry_run,
        cancelled,
        reports: Vec::new(),
    }
}
