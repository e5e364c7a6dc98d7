use std::path::Path;

use serde::Serialize;

use crate::errors::EvalError;
use crate::model::{
    Diagnostic, DiagnosticKind, ReconciliationReport, ReconciliationResult, Severity,
};

/// Render a deterministic markdown report.
pub fn render_report(report: &ReconciliationReport, max_examples: usize) -> String {
    let summary = &report.summary;
    let mut lines = Vec::new();

    lines.push(format!("# Cadoc Reconciliation Report: {}", report.kind));
    lines.push(String::new());
    lines.push("## Inputs".to_string());
    lines.push(format!("- file: {}", report.kind.file_name()));
    lines.push(format!(
        "- generated: {} ({} rows)",
        report.generated_label, summary.generated_rows
    ));
    lines.push(format!(
        "- external: {} ({} rows)",
        report.external_label, summary.external_rows
    ));
    lines.push(format!("- direction: {:?}", report.direction));
    lines.push(String::new());

    lines.push("## Summary".to_string());
    lines.push("| diagnostic | count |".to_string());
    lines.push("| --- | --- |".to_string());
    lines.push(format!("| matched | {} |", summary.matched));
    for (kind, count) in [
        (DiagnosticKind::MissingInExternal, summary.missing_in_external),
        (DiagnosticKind::MissingInGenerated, summary.missing_in_generated),
        (DiagnosticKind::Mismatch, summary.mismatches),
        (DiagnosticKind::DuplicateKey, summary.duplicate_keys),
        (DiagnosticKind::CountMismatch, u64::from(summary.count_mismatch)),
    ] {
        lines.push(format!("| {} | {} |", kind.as_str(), count));
    }
    lines.push(String::new());

    if !report.diagnostics.is_empty() {
        lines.push("## Top discrepancies".to_string());
        for diagnostic in report.diagnostics.iter().take(max_examples) {
            lines.push(example_line(diagnostic));
            if let Some(generated) = &diagnostic.generated {
                lines.push(format!("  - generated: `{generated}`"));
            }
            if let Some(external) = &diagnostic.external {
                lines.push(format!("  - external: `{external}`"));
            }
        }
        let hidden = report.diagnostics.len().saturating_sub(max_examples);
        if hidden > 0 {
            lines.push(format!("- ... {hidden} more in diagnostics.csv"));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(report));
    lines.join("\n")
}

fn example_line(diagnostic: &Diagnostic) -> String {
    let fields = if diagnostic.fields.is_empty() {
        String::new()
    } else {
        format!(" fields={}", diagnostic.fields.join(","))
    };
    format!(
        "- [{}] {}{}",
        diagnostic.kind.as_str(),
        diagnostic.key,
        fields
    )
}

fn recommendations(report: &ReconciliationReport) -> Vec<String> {
    let summary = &report.summary;
    let mut lines = Vec::new();
    if summary.missing_in_external > 0 {
        lines.push("- check that the external file covers every configured period.".to_string());
    }
    if summary.missing_in_generated > 0 {
        lines.push("- external rows exist for keys the configuration never produces.".to_string());
    }
    if summary.mismatches > 0 {
        lines.push("- compare distribution tables and totals with the producing system.".to_string());
    }
    if summary.duplicate_keys > 0 {
        lines.push("- deduplicate keys; only the last row per key was compared.".to_string());
    }
    if report.is_clean() {
        lines.push("- collections agree.".to_string());
    }
    lines
}

#[derive(Debug, Serialize)]
struct DiagnosticRow<'a> {
    kind: &'static str,
    severity: &'static str,
    key: &'a str,
    fields: String,
    generated: &'a str,
    external: &'a str,
}

/// Write the full diagnostics table as CSV.
pub fn write_diagnostics_csv(diagnostics: &[Diagnostic], path: &Path) -> Result<(), EvalError> {
    let mut writer = csv::Writer::from_path(path)?;
    for diagnostic in diagnostics {
        writer.serialize(DiagnosticRow {
            kind: diagnostic.kind.as_str(),
            severity: match diagnostic.severity {
                Severity::Warning => "warning",
                Severity::Error => "error",
            },
            key: &diagnostic.key,
            fields: diagnostic.fields.join(";"),
            generated: diagnostic.generated.as_deref().unwrap_or_default(),
            external: diagnostic.external.as_deref().unwrap_or_default(),
        })?;
    }
    if diagnostics.is_empty() {
        writer.write_record(["kind", "severity", "key", "fields", "generated", "external"])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `report.md`, `reconciliation.json` and `diagnostics.csv`.
pub fn write_artifacts(
    report: ReconciliationReport,
    out_dir: &Path,
    max_examples: usize,
) -> Result<ReconciliationResult, EvalError> {
    std::fs::create_dir_all(out_dir)?;

    let report_path = out_dir.join("report.md");
    std::fs::write(&report_path, render_report(&report, max_examples).as_bytes())?;

    let json_path = out_dir.join("reconciliation.json");
    std::fs::write(&json_path, serde_json::to_vec_pretty(&report)?)?;

    let csv_path = out_dir.join("diagnostics.csv");
    write_diagnostics_csv(&report.diagnostics, &csv_path)?;

    Ok(ReconciliationResult {
        out_dir: out_dir.to_path_buf(),
        report_path,
        json_path,
        csv_path,
        report,
    })
}

#[cfg(test)]
mod tests {
    use cadoc_core::EntityKind;

    use super::*;
    use crate::model::{Direction, ReconciliationSummary};

    fn report(diagnostics: usize) -> ReconciliationReport {
        let diagnostics = (0..diagnostics)
            .map(|i| Diagnostic {
                kind: DiagnosticKind::MissingInExternal,
                severity: Severity::Error,
                key: format!("SP-{i}"),
                generated: Some(format!("Year: 2025, row {i}")),
                external: None,
                fields: Vec::new(),
            })
            .collect::<Vec<_>>();
        ReconciliationReport {
            kind: EntityKind::InfraEstablishment,
            direction: Direction::GeneratedOnly,
            generated_label: "generated".to_string(),
            external_label: "INFRESTA.TXT".to_string(),
            summary: ReconciliationSummary {
                generated_rows: 27,
                external_rows: 27,
                matched: 27 - diagnostics.len() as u64,
                missing_in_external: diagnostics.len() as u64,
                ..ReconciliationSummary::default()
            },
            diagnostics,
        }
    }

    #[test]
    fn markdown_examples_are_capped() {
        let text = render_report(&report(5), 2);
        assert!(text.starts_with("# Cadoc Reconciliation Report: infra_establishment"));
        assert!(text.contains("| missing_in_external | 5 |"));
        assert!(text.contains("- [missing_in_external] SP-1"));
        assert!(!text.contains("SP-2"));
        assert!(text.contains("... 3 more in diagnostics.csv"));
    }

    #[test]
    fn clean_report_says_so() {
        let text = render_report(&report(0), 20);
        assert!(!text.contains("## Top discrepancies"));
        assert!(text.ends_with("- collections agree."));
    }
}
