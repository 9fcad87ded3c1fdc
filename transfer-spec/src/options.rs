//! [`TransferOptions`]: the configuration of one `transfer()` (or
//! `validate()`) invocation, and its validation errors.

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use serde::{Deserialize, Serialize};

/// The allowed range for [`TransferOptions::parallelism`], inclusive on
/// both ends.
///
/// The upper bound of 10 is an arbitrary safety rail; it is cheap to raise
/// later since it is not baked into any wire format.
pub const PARALLELISM_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// A workflow selector applied to the filtered SOURCE list before any
/// other processing.
///
/// All four fields are AND-composed; within one field, membership is an OR
/// (e.g. a workflow matches `tags` if it carries *any* of the listed
/// tags). A `None` field imposes no constraint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<Vec<String>>,
}

/// Configuration of one `transfer()`/`validate()` invocation.
///
/// Construct with [`TransferOptions::default`] and override fields, or
/// deserialize from a caller-provided JSON document; either way, call
/// [`TransferOptions::validate`] before use — the `TransferManager` does
/// this itself as step 1 of `transfer()`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    #[serde(default = "default_deduplicator")]
    pub deduplicator: String,
    #[serde(default = "default_validators")]
    pub validators: Vec<String>,
    #[serde(default = "default_reporters")]
    pub reporters: Vec<String>,
    #[serde(default)]
    pub skip_credentials: bool,
}
impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            filters: None,
            dry_run: false,
            parallelism: default_parallelism(),
            deduplicator: default_deduplicator(),
            validators: default_validators(),
            reporters: default_reporters(),
            skip_credentials: false,
        }
    }
}
impl TransferOptions {
    /// Validates every field, returning *every* offending field rather
    /// than just the first.
    ///
    /// # Errors
    /// Returns [`OptionsError::Invalid`] with one [`FieldError`] per
    /// violated constraint; the list is never empty when `Err` is
    /// returned.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let mut errors = Vec::new();
        if !PARALLELISM_RANGE.contains(&self.parallelism) {
            errors.push(FieldError {
                field: "parallelism",
                message: format!("must be between {} and {} (was {})", PARALLELISM_RANGE.start(), PARALLELISM_RANGE.end(), self.parallelism),
            });
        }
        if self.deduplicator.trim().is_empty() {
            errors.push(FieldError { field: "deduplicator", message: "must not be empty".into() });
        }
        if errors.is_empty() { Ok(()) } else { Err(OptionsError::Invalid { errors }) }
    }
}

fn default_parallelism() -> u32 { 3 }
fn default_deduplicator() -> String { "standard-deduplicator".into() }
fn default_validators() -> Vec<String> { vec!["integrity-validator".into()] }
fn default_reporters() -> Vec<String> { vec!["markdown-reporter".into()] }

/// One field that failed [`TransferOptions::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}
impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}: {}", self.field, self.message) }
}

/// Errors raised by [`TransferOptions::validate`].
#[derive(Debug)]
pub enum OptionsError {
    /// One or more fields violated the schema.
    Invalid { errors: Vec<FieldError> },
}
impl Display for OptionsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Invalid { errors } => {
                write!(f, "invalid transfer options: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            },
        }
    }
}
impl error::Error for OptionsError {}
