use cadoc_core::{CodecError, FieldKind};
use thiserror::Error;

/// Errors raised by repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("unknown column '{column}' for table {table}")]
    UnknownColumn { table: &'static str, column: String },
    #[error("filter on '{column}' expects a {expected} value")]
    FilterType {
        column: &'static str,
        expected: FieldKind,
    },
    #[error("row mapping failed: {0}")]
    Codec(#[from] CodecError),
}
