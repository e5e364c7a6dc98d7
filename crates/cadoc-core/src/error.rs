use thiserror::Error;

use crate::codec::FieldKind;

/// Failures raised while mapping between fixed-width text and typed fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The line ends before the last column of the layout.
    #[error("line too short: expected at least {expected} columns, found {found}")]
    LineTooShort { expected: usize, found: usize },
    /// A numeric column holds something other than an optional sign and digits.
    #[error("invalid number in field '{field}': '{raw}'")]
    InvalidNumber { field: String, raw: String },
    /// A number does not fit in the width reserved for its column.
    #[error("value {value} does not fit field '{field}' ({width} columns)")]
    FieldOverflow {
        field: String,
        value: i64,
        width: usize,
    },
    /// The layout names a field the record did not supply.
    #[error("missing field '{0}'")]
    MissingField(String),
    /// A field carries a value of the wrong kind for its column.
    #[error("field '{field}' expects a {expected} value")]
    KindMismatch { field: String, expected: FieldKind },
    /// An integer column decoded fine but does not fit the record's type.
    #[error("value {value} out of range for field '{field}'")]
    OutOfRange { field: String, value: i64 },
}

/// Header preamble failures. Validation stops at the first failing check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("malformed header: {0}")]
    Codec(#[from] CodecError),
    #[error("invalid header date '{0}': expected YYYYMMDD")]
    InvalidDate(String),
    #[error("invalid file name: expected {expected}, got {found}")]
    NameMismatch { expected: String, found: String },
    #[error("invalid line count: expected {expected}, got {found}")]
    LineCountMismatch { expected: u64, found: u64 },
    #[error("invalid originator: expected {expected}, got {found}")]
    OriginatorMismatch { expected: String, found: String },
}

/// Core error type shared across cadoc crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("header error: {0}")]
    Header(#[from] HeaderError),
    /// A data line failed to decode; `line` is 1-based and counts the header.
    #[error("error parsing line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: CodecError,
    },
    #[error("file is empty")]
    EmptyFile,
    #[error("text cannot be represented in Latin-1: {0}")]
    Unencodable(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown entity kind: {0}")]
    UnknownEntity(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience alias for results returned by cadoc crates.
pub type Result<T> = std::result::Result<T, CoreError>;
