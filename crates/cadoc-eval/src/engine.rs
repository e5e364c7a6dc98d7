use std::collections::BTreeMap;
use std::path::Path;

use cadoc_core::{Record, differing_fields};
use tracing::{info, warn};

use crate::errors::EvalError;
use crate::model::{
    Diagnostic, DiagnosticKind, Direction, ReconcileOptions, ReconciliationReport, ReconciliationResult,
    ReconciliationSummary,
};
use crate::report::write_artifacts;

/// Records indexed by key.
#[derive(Debug, Clone)]
pub struct KeyedCollection<R> {
    records: BTreeMap<String, R>,
    duplicates: Vec<String>,
    rows: usize,
}

impl<R: Record> KeyedCollection<R> {
    pub fn get(&self, key: &str) -> Option<&R> {
        self.records.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.records.keys()
    }

    /// Keys seen more than once, in input order.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Number of input records, duplicates included.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Index records by key. A repeated key keeps the last record.
pub fn index<R: Record>(records: &[R]) -> KeyedCollection<R> {
    let mut map = BTreeMap::new();
    let mut duplicates = Vec::new();
    for record in records {
        let key = record.key();
        if map.insert(key.clone(), record.clone()).is_some() {
            duplicates.push(key);
        }
    }
    KeyedCollection {
        records: map,
        duplicates,
        rows: records.len(),
    }
}

/// Compares a generated collection against an external one.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    options: ReconcileOptions,
}

impl ReconciliationEngine {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Walk generated keys in order and diagnose what the external side is
    /// missing or renders differently. Never fails.
    pub fn reconcile<R: Record>(&self, generated: &[R], external: &[R]) -> ReconciliationReport {
        let generated_index = index(generated);
        let external_index = index(external);
        let mut summary = ReconciliationSummary {
            generated_rows: generated.len() as u64,
            external_rows: external.len() as u64,
            ..ReconciliationSummary::default()
        };
        let mut diagnostics = Vec::new();

        for key in generated_index
            .duplicates()
            .iter()
            .chain(external_index.duplicates())
        {
            summary.duplicate_keys += 1;
            diagnostics.push(diagnostic(DiagnosticKind::DuplicateKey, key, None, None));
        }

        if generated.len() != external.len() {
            summary.count_mismatch = true;
            diagnostics.push(Diagnostic {
                generated: Some(generated.len().to_string()),
                external: Some(external.len().to_string()),
                ..diagnostic(DiagnosticKind::CountMismatch, "*", None, None)
            });
        }

        for (key, record) in &generated_index.records {
            let Some(other) = external_index.get(key) else {
                summary.missing_in_external += 1;
                diagnostics.push(diagnostic(
                    DiagnosticKind::MissingInExternal,
                    key,
                    Some(record.to_string()),
                    None,
                ));
                continue;
            };
            let (left, right) = (record.to_string(), other.to_string());
            if left == right {
                summary.matched += 1;
                continue;
            }
            summary.mismatches += 1;
            let fields = differing_fields(R::layout(), &record.to_fields(), &other.to_fields())
                .into_iter()
                .map(str::to_string)
                .collect();
            diagnostics.push(Diagnostic {
                fields,
                ..diagnostic(DiagnosticKind::Mismatch, key, Some(left), Some(right))
            });
        }

        if self.options.direction == Direction::Both {
            for (key, record) in &external_index.records {
                if generated_index.get(key).is_none() {
                    summary.missing_in_generated += 1;
                    diagnostics.push(diagnostic(
                        DiagnosticKind::MissingInGenerated,
                        key,
                        None,
                        Some(record.to_string()),
                    ));
                }
            }
        }

        ReconciliationReport {
            kind: R::KIND,
            direction: self.options.direction,
            generated_label: "generated".to_string(),
            external_label: "external".to_string(),
            summary,
            diagnostics,
        }
    }

    /// Write `report.md`, `reconciliation.json` and `diagnostics.csv` into
    /// `out_dir`. In strict mode, error-level diagnostics fail the run after
    /// the artifacts are on disk.
    pub fn finish(
        &self,
        report: ReconciliationReport,
        out_dir: &Path,
    ) -> Result<ReconciliationResult, EvalError> {
        let result = write_artifacts(report, out_dir, self.options.max_examples)?;
        let summary = &result.report.summary;
        if result.report.is_clean() {
            info!(
                entity = %result.report.kind,
                matched = summary.matched,
                "reconciliation clean"
            );
        } else {
            warn!(
                entity = %result.report.kind,
                matched = summary.matched,
                missing_in_external = summary.missing_in_external,
                missing_in_generated = summary.missing_in_generated,
                mismatches = summary.mismatches,
                duplicate_keys = summary.duplicate_keys,
                count_mismatch = summary.count_mismatch,
                "reconciliation found discrepancies"
            );
        }

        let errors = result.report.error_count();
        if self.options.strict && errors > 0 {
            return Err(EvalError::Discrepancies(errors));
        }
        Ok(result)
    }
}

fn diagnostic(
    kind: DiagnosticKind,
    key: &str,
    generated: Option<String>,
    external: Option<String>,
) -> Diagnostic {
    Diagnostic {
        kind,
        severity: kind.severity(),
        key: key.to_string(),
        generated,
        external,
        fields: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use cadoc_core::{Amount, ConcCred};

    use super::*;
    use crate::model::Severity;

    fn record(brand: i32, function: &str, active: i64) -> ConcCred {
        ConcCred {
            year: 2025,
            quarter: 3,
            brand,
            function: function.to_string(),
            credentialed_establishments: 100,
            active_establishments: active,
            transaction_value: Amount::from_cents(500_000),
            transaction_quantity: 40,
        }
    }

    fn sample() -> Vec<ConcCred> {
        vec![record(1, "C", 80), record(1, "D", 70), record(2, "C", 60)]
    }

    #[test]
    fn identical_collections_have_no_diagnostics() {
        let report = ReconciliationEngine::default().reconcile(&sample(), &sample());
        assert!(report.is_clean());
        assert_eq!(report.summary.matched, 3);
    }

    #[test]
    fn one_altered_field_is_one_mismatch() {
        let mut external = sample();
        external[1].active_establishments = 71;
        let report = ReconciliationEngine::default().reconcile(&sample(), &external);

        assert_eq!(report.diagnostics.len(), 1);
        let mismatch = &report.diagnostics[0];
        assert_eq!(mismatch.kind, DiagnosticKind::Mismatch);
        assert_eq!(mismatch.key, "2025-3-1-D");
        assert_eq!(mismatch.fields, vec!["active_establishments".to_string()]);
        assert_ne!(mismatch.generated, mismatch.external);
    }

    #[test]
    fn missing_keys_depend_on_direction() {
        let mut external = sample();
        external.remove(0);
        external.push(record(8, "D", 5));

        let report = ReconciliationEngine::default().reconcile(&sample(), &external);
        assert_eq!(report.summary.missing_in_external, 1);
        assert_eq!(report.summary.missing_in_generated, 0);
        assert!(!report.summary.count_mismatch);

        let both = ReconciliationEngine::new(ReconcileOptions {
            direction: Direction::Both,
            ..ReconcileOptions::default()
        })
        .reconcile(&sample(), &external);
        assert_eq!(both.summary.missing_in_generated, 1);
        let last = both.diagnostics.last().unwrap();
        assert_eq!(last.kind, DiagnosticKind::MissingInGenerated);
        assert_eq!(last.key, "2025-3-8-D");
    }

    #[test]
    fn duplicates_keep_the_last_record_and_warn() {
        let mut external = sample();
        external.push(record(2, "C", 60));
        let indexed = index(&external);
        assert_eq!(indexed.len(), 3);
        assert_eq!(indexed.rows(), 4);
        assert_eq!(indexed.duplicates(), ["2025-3-2-C".to_string()]);

        let report = ReconciliationEngine::default().reconcile(&sample(), &external);
        let kinds: Vec<DiagnosticKind> = report.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::DuplicateKey, DiagnosticKind::CountMismatch]
        );
        assert!(report
            .diagnostics
            .iter()
            .all(|d| d.severity == Severity::Warning));
        assert_eq!(report.error_count(), 0);
    }
}
