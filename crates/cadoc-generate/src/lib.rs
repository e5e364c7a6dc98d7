//! Synthetic report generation for cadoc.
//!
//! Splits configured totals over the cross-product of categorical
//! distributions, then writes Latin-1 flat files (and optional insert scripts)
//! with a `generation_report.json` summary.

pub mod allocation;
pub mod bins;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod model;
pub mod output;

pub use allocation::{
    AllocationError, AllocationPlan, Designated, Distribution, Leaf, Rounding, distribute,
    quantity_for,
};
pub use bins::{rewrite_bin_line, rewrite_bin_script};
pub use engine::{GenerationEngine, GenerationResult};
pub use entities::Generate;
pub use errors::GenerationError;
pub use model::{EntityReport, GenerateOptions, GenerationIssue, GenerationReport};
pub use output::WrittenFile;
