use std::path::PathBuf;
use std::time::Instant;

use cadoc_core::{
    CadocConfig, ConcCred, Discount, EntityKind, InfraEstablishment, InfraTerminal, Intercambio,
    ProfitCredit, Ranking, Segment,
};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::entities::Generate;
use crate::errors::GenerationError;
use crate::model::{EntityReport, GenerateOptions, GenerationIssue, GenerationReport};
use crate::output::flat::write_flat_file;
use crate::output::sql::write_insert_script;

/// Tolerance used when checking that a table partitions 1.0.
const PARTITION_TOLERANCE: f64 = 1e-6;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub report_path: PathBuf,
    pub report: GenerationReport,
}

/// Entry point for writing report files from configured totals.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate every selected kind. A failing kind is recorded in the report
    /// and the run moves on to the next one; in strict mode the run then
    /// returns [`GenerationError::Failed`].
    pub fn run(&self, config: &CadocConfig) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let out_dir = self.options.out_dir.clone();
        std::fs::create_dir_all(&out_dir)?;

        config.validate()?;
        let mut report = GenerationReport::new(run_id.clone());
        self.check_partitions(config, &mut report)?;

        let date = self
            .options
            .date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let kinds = self.options.selected_kinds();
        info!(
            run_id = %run_id,
            kinds = kinds.len(),
            periods = config.periods().len(),
            strict = self.options.strict,
            "generation started"
        );

        for kind in kinds {
            let entity_start = Instant::now();
            match self.generate_kind(kind, config, date) {
                Ok(entity) => {
                    info!(
                        entity = %kind,
                        rows = entity.rows,
                        bytes = entity.bytes,
                        duration_ms = entity_start.elapsed().as_millis() as u64,
                        "entity generated"
                    );
                    report.record_entity(entity);
                }
                Err(err) => {
                    warn!(entity = %kind, error = %err, "entity generation failed");
                    report.record_failure(GenerationIssue {
                        level: "error".to_string(),
                        code: "entity_failed".to_string(),
                        message: err.to_string(),
                        kind: Some(kind),
                    });
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        let report_path = out_dir.join("generation_report.json");
        std::fs::write(&report_path, serde_json::to_vec_pretty(&report)?)?;

        info!(
            run_id = %run_id,
            entities = report.entities.len(),
            failures = report.failures.len(),
            rows = report.rows_total,
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        if self.options.strict && !report.is_success() {
            return Err(GenerationError::Failed(Box::new(report)));
        }
        Ok(GenerationResult {
            out_dir,
            report_path,
            report,
        })
    }

    fn check_partitions(
        &self,
        config: &CadocConfig,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        for (name, table) in config.named_tables() {
            if table.partitions_unity(PARTITION_TOLERANCE) {
                continue;
            }
            if self.options.strict {
                return Err(GenerationError::NonPartitioning(name.to_string()));
            }
            let sum = table.proportion_sum();
            warn!(table = name, sum, "distribution table does not partition 1.0");
            report.record_warning(GenerationIssue {
                level: "warning".to_string(),
                code: "non_partitioning_table".to_string(),
                message: format!("'{name}' proportions sum to {sum:.4}; residual correction absorbs the gap"),
                kind: None,
            });
        }
        Ok(())
    }

    fn generate_kind(
        &self,
        kind: EntityKind,
        config: &CadocConfig,
        date: NaiveDate,
    ) -> Result<EntityReport, GenerationError> {
        match kind {
            EntityKind::Ranking => self.emit::<Ranking>(config, date),
            EntityKind::ConcCred => self.emit::<ConcCred>(config, date),
            EntityKind::Discount => self.emit::<Discount>(config, date),
            EntityKind::InfraEstablishment => self.emit::<InfraEstablishment>(config, date),
            EntityKind::InfraTerminal => self.emit::<InfraTerminal>(config, date),
            EntityKind::Intercambio => self.emit::<Intercambio>(config, date),
            EntityKind::Segment => self.emit::<Segment>(config, date),
            EntityKind::ProfitCredit => self.emit::<ProfitCredit>(config, date),
        }
    }

    fn emit<R: Generate>(
        &self,
        config: &CadocConfig,
        date: NaiveDate,
    ) -> Result<EntityReport, GenerationError> {
        let records = R::generate_checked(config)?;
        self.write(&records, date)
    }

    fn write<R: Generate>(
        &self,
        records: &[R],
        date: NaiveDate,
    ) -> Result<EntityReport, GenerationError> {
        let written = write_flat_file(&self.options.out_dir, records, date)?;
        let sql_file = if self.options.sql {
            let script = write_insert_script(&self.options.out_dir, records)?;
            Some(file_name(&script.path))
        } else {
            None
        };
        Ok(EntityReport {
            kind: R::KIND,
            file: file_name(&written.path),
            rows: written.rows,
            bytes: written.bytes,
            sha256: written.sha256,
            sql_file,
        })
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
