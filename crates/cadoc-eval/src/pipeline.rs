//! Per-kind reconciliation of generated records against an external source.

use std::path::PathBuf;

use cadoc_core::{
    CadocConfig, ConcCred, Discount, EntityKind, Fields, InfraEstablishment, InfraTerminal,
    Intercambio, ProfitCredit, Ranking, Record, Segment, read_flat_file,
};
use cadoc_generate::Generate;
use tracing::info;

use crate::engine::ReconciliationEngine;
use crate::errors::EvalError;
use crate::model::ReconciliationReport;

/// Where the records to compare against come from.
#[derive(Debug, Clone)]
pub enum ExternalSource {
    /// Directory holding `<TOKEN>.TXT` files.
    Directory(PathBuf),
    /// Rows already fetched, e.g. from the repository.
    Rows { label: String, rows: Vec<Fields> },
}

/// Generate `kind` from `config` and reconcile it against `source`.
pub fn reconcile_kind(
    engine: &ReconciliationEngine,
    kind: EntityKind,
    config: &CadocConfig,
    source: &ExternalSource,
) -> Result<ReconciliationReport, EvalError> {
    match kind {
        EntityKind::Ranking => reconcile_as::<Ranking>(engine, config, source),
        EntityKind::ConcCred => reconcile_as::<ConcCred>(engine, config, source),
        EntityKind::Discount => reconcile_as::<Discount>(engine, config, source),
        EntityKind::InfraEstablishment => {
            reconcile_as::<InfraEstablishment>(engine, config, source)
        }
        EntityKind::InfraTerminal => reconcile_as::<InfraTerminal>(engine, config, source),
        EntityKind::Intercambio => reconcile_as::<Intercambio>(engine, config, source),
        EntityKind::Segment => reconcile_as::<Segment>(engine, config, source),
        EntityKind::ProfitCredit => reconcile_as::<ProfitCredit>(engine, config, source),
    }
}

fn reconcile_as<R: Generate>(
    engine: &ReconciliationEngine,
    config: &CadocConfig,
    source: &ExternalSource,
) -> Result<ReconciliationReport, EvalError> {
    let generated = R::generate(config)?;
    let (label, external) = load_external::<R>(source)?;
    info!(
        entity = %R::KIND,
        generated = generated.len(),
        external = external.len(),
        source = %label,
        "reconciling"
    );
    Ok(engine
        .reconcile(&generated, &external)
        .with_labels("generated", label))
}

/// Load the external side of `R` from `source`.
pub fn load_external<R: Record>(source: &ExternalSource) -> Result<(String, Vec<R>), EvalError> {
    match source {
        ExternalSource::Directory(dir) => {
            let path = dir.join(R::KIND.file_name());
            let parsed = read_flat_file::<R>(&path)?;
            Ok((path.display().to_string(), parsed.records))
        }
        ExternalSource::Rows { label, rows } => {
            let records = rows
                .iter()
                .map(R::from_fields)
                .collect::<Result<Vec<_>, _>>()?;
            Ok((label.clone(), records))
        }
    }
}
