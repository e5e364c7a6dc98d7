use std::path::PathBuf;

use cadoc_core::EntityKind;
use serde::{Deserialize, Serialize};

/// Which side of the comparison drives the key walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Only generated keys are looked up in the external collection.
    #[default]
    GeneratedOnly,
    /// Also report external keys that were never generated.
    Both,
}

/// Options for a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOptions {
    pub direction: Direction,
    /// Limit the number of examples emitted in the markdown report.
    pub max_examples: usize,
    /// Fail when any error-level diagnostic is found.
    pub strict: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            direction: Direction::GeneratedOnly,
            max_examples: 20,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingInExternal,
    MissingInGenerated,
    Mismatch,
    CountMismatch,
    DuplicateKey,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingInExternal => "missing_in_external",
            Self::MissingInGenerated => "missing_in_generated",
            Self::Mismatch => "mismatch",
            Self::CountMismatch => "count_mismatch",
            Self::DuplicateKey => "duplicate_key",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::CountMismatch | Self::DuplicateKey => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One discrepancy between the two collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
    /// Differing field names, for mismatches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub generated_rows: u64,
    pub external_rows: u64,
    pub matched: u64,
    pub missing_in_external: u64,
    pub missing_in_generated: u64,
    pub mismatches: u64,
    pub duplicate_keys: u64,
    pub count_mismatch: bool,
}

/// Outcome of reconciling one entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub kind: EntityKind,
    pub direction: Direction,
    pub generated_label: String,
    pub external_label: String,
    pub summary: ReconciliationSummary,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReconciliationReport {
    pub fn with_labels(mut self, generated: impl Into<String>, external: impl Into<String>) -> Self {
        self.generated_label = generated.into();
        self.external_label = external.into();
        self
    }

    /// Number of error-level diagnostics.
    pub fn error_count(&self) -> u64 {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
            .count() as u64
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Paths of the artifacts written for one report.
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    pub out_dir: PathBuf,
    pub report_path: PathBuf,
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
    pub report: ReconciliationReport,
}
