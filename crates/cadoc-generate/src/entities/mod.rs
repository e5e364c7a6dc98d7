//! Allocators producing the canonical record set of each entity kind.

use cadoc_core::{CadocConfig, CategoryValue, CoreError, Period, Record};

use crate::allocation::{AllocationError, AllocationPlan};
use crate::errors::GenerationError;

mod conccred;
mod discount;
mod infresta;
mod infrterm;
mod intercam;
mod lucrcred;
mod ranking;
mod segment;

/// Record kinds that can be built from configured totals.
pub trait Generate: Record {
    /// Records for one reporting period, in allocation order.
    fn generate_period(config: &CadocConfig, period: Period) -> Result<Vec<Self>, AllocationError>;

    /// Records for every configured period, years outermost.
    fn generate(config: &CadocConfig) -> Result<Vec<Self>, AllocationError> {
        let mut records = Vec::new();
        for period in config.periods() {
            records.extend(Self::generate_period(config, period)?);
        }
        Ok(records)
    }

    /// Reject a record that must never reach a file or a table.
    fn check(&self) -> Result<(), CoreError> {
        Ok(())
    }

    /// [`Generate::generate`], then [`Generate::check`] on every record.
    fn generate_checked(config: &CadocConfig) -> Result<Vec<Self>, GenerationError> {
        let records = Self::generate(config)?;
        for record in &records {
            record.check()?;
        }
        Ok(records)
    }
}

/// Installment dimension keyed by function: debit table for `D`, credit
/// table for `C`.
pub(crate) fn with_installments(plan: AllocationPlan, config: &CadocConfig) -> AllocationPlan {
    let dims = &config.dimensions;
    plan.conditional(
        "installments",
        "function",
        vec![
            (CategoryValue::from("D"), &dims.debit_installments),
            (CategoryValue::from("C"), &dims.credit_installments),
        ],
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use cadoc_core::{CadocConfig, Period};

    pub fn period() -> Period {
        Period {
            year: 2025,
            quarter: 3,
        }
    }

    pub fn config() -> CadocConfig {
        CadocConfig::default()
    }
}
