//! Reconciliation of generated cadoc records against external collections.
//!
//! Both sides are indexed by record key; missing keys, rendering mismatches,
//! duplicate keys and size differences become diagnostics written as
//! markdown, JSON and CSV.

pub mod engine;
pub mod errors;
pub mod model;
pub mod pipeline;
pub mod report;

pub use engine::{KeyedCollection, ReconciliationEngine, index};
pub use errors::EvalError;
pub use model::{
    Diagnostic, DiagnosticKind, Direction, ReconcileOptions, ReconciliationReport,
    ReconciliationResult, ReconciliationSummary, Severity,
};
pub use pipeline::{ExternalSource, load_external, reconcile_kind};
pub use report::{render_report, write_artifacts, write_diagnostics_csv};
