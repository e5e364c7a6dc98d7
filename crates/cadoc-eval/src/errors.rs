use cadoc_core::{CodecError, CoreError};
use cadoc_generate::AllocationError;
use thiserror::Error;

/// Errors emitted by the reconciliation engine.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),
    #[error("reconciliation found {0} discrepancy(ies)")]
    Discrepancies(u64),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
