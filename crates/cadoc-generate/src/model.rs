use std::collections::BTreeMap;
use std::path::PathBuf;

use cadoc_core::EntityKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where report files and the generation report are written.
    pub out_dir: PathBuf,
    /// Treat distribution tables that do not partition 1.0 as errors.
    pub strict: bool,
    /// Kinds to generate; empty means every kind.
    pub kinds: Vec<EntityKind>,
    /// Date stamped on file headers; defaults to today (UTC).
    pub date: Option<NaiveDate>,
    /// Also write one insert script per kind.
    pub sql: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            strict: false,
            kinds: Vec::new(),
            date: None,
            sql: false,
        }
    }
}

impl GenerateOptions {
    pub fn selected_kinds(&self) -> Vec<EntityKind> {
        if self.kinds.is_empty() {
            EntityKind::ALL.to_vec()
        } else {
            self.kinds.clone()
        }
    }
}

/// Summary of one written report file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReport {
    pub kind: EntityKind,
    pub file: String,
    pub rows: u64,
    pub bytes: u64,
    pub sha256: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_file: Option<String>,
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
}

/// Report for a generation run, written as `generation_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub entities: Vec<EntityReport>,
    pub rows_total: u64,
    pub bytes_written: u64,
    pub duration_ms: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
    pub failures: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            entities: Vec::new(),
            rows_total: 0,
            bytes_written: 0,
            duration_ms: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record_entity(&mut self, entity: EntityReport) {
        self.rows_total += entity.rows;
        self.bytes_written += entity.bytes;
        self.entities.push(entity);
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        *self.warnings_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }

    pub fn record_failure(&mut self, issue: GenerationIssue) {
        self.failures.push(issue);
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
