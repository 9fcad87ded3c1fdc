//! [`ReportFile`]: the record of one reporter plugin's output.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The format of a generated report, inferred from the reporter's name by
/// substring match rather than a plugin-reported field — a custom reporter
/// named e.g. `"json-lines-exporter"` is classified as `Json` under this
/// rule, which is a known, accepted quirk rather than a bug to silently fix.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Markdown,
    Json,
    Csv,
    Unknown,
}
impl ReportFormat {
    /// Infers a format from a reporter's registered name.
    #[must_use]
    pub fn from_reporter_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("markdown") {
            Self::Markdown
        } else if lower.contains("json") {
            Self::Json
        } else if lower.contains("csv") {
            Self::Csv
        } else {
            Self::Unknown
        }
    }
}

/// One reporter's generated output, recorded in
/// [`TransferSummary::reports`](crate::TransferSummary::reports).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportFile {
    pub reporter: String,
    pub path: PathBuf,
    pub format: ReportFormat,
}
