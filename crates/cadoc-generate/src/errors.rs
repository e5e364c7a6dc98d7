use cadoc_core::{CodecError, CoreError, EntityKind};
use thiserror::Error;

use crate::allocation::AllocationError;
use crate::model::GenerationReport;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("encoding failed for {kind} record {key}: {source}")]
    Encode {
        kind: EntityKind,
        key: String,
        #[source]
        source: CodecError,
    },
    #[error("distribution table '{0}' does not partition 1.0")]
    NonPartitioning(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("generation failed for {} kind(s)", .0.failures.len())]
    Failed(Box<GenerationReport>),
}
