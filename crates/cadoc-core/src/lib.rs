//! Core contracts for cadoc report files.
//!
//! This crate defines the entity kinds, the fixed-width codec and header
//! record, the distribution tables and run configuration, and the Latin-1
//! flat-file reader shared by the generator, the reconciler and the CLI.

pub mod amount;
pub mod codec;
pub mod config;
pub mod distribution;
pub mod entities;
pub mod error;
pub mod flatfile;
pub mod header;

pub use amount::{Amount, to_cents, truncate_units};
pub use codec::{FieldKind, FieldSpec, FieldValue, Fields, Layout};
pub use config::{CadocConfig, Period, SegmentEntry, load_config};
pub use distribution::{CategoryValue, DistributionEntry, DistributionTable};
pub use entities::{
    ConcCred, Discount, EntityKind, InfraEstablishment, InfraTerminal, Intercambio, ProfitCredit,
    Ranking, Record, Segment, differing_fields, insert_statement,
};
pub use error::{CodecError, CoreError, HeaderError, Result};
pub use flatfile::{ParsedFile, decode_latin1, encode_latin1, parse_flat_text, read_flat_file};
pub use header::{Header, ORIGINATOR_ID};
