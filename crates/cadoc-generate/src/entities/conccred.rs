use cadoc_core::{Amount, CadocConfig, ConcCred, Period, to_cents};

use crate::allocation::{
    AllocationError, AllocationPlan, Designated, Leaf, Rounding, distribute, quantity_for,
};
use crate::entities::Generate;

impl Generate for ConcCred {
    fn generate_period(config: &CadocConfig, period: Period) -> Result<Vec<Self>, AllocationError> {
        let dims = &config.dimensions;
        let totals = &config.conccred;
        let leaves = AllocationPlan::new()
            .dimension("brand", &dims.brand)
            .dimension("function", &dims.function)
            .leaves()?;
        let shares: Vec<f64> = leaves.iter().map(Leaf::share).collect();

        let value = distribute(
            to_cents(totals.total_value),
            &shares,
            Rounding::Nearest,
            Designated::First,
        )?;
        let credentialed = distribute(
            totals.total_establishments,
            &shares,
            Rounding::Floor,
            Designated::First,
        )?;
        let active = distribute(
            totals.active_establishments,
            &shares,
            Rounding::Floor,
            Designated::First,
        )?;

        leaves
            .iter()
            .enumerate()
            .map(|(idx, leaf)| {
                Ok(ConcCred {
                    year: period.year,
                    quarter: period.quarter,
                    brand: leaf.int32("brand")?,
                    function: leaf.text("function")?.to_string(),
                    credentialed_establishments: credentialed.part(idx),
                    active_establishments: active.part(idx),
                    transaction_value: Amount::from_cents(value.part(idx)),
                    transaction_quantity: quantity_for(value.pure(idx), config.average_ticket),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::testing::{config, period};

    #[test]
    fn totals_are_reproduced() {
        let config = config();
        let records = ConcCred::generate_period(&config, period()).unwrap();
        assert_eq!(records.len(), 6);

        let value: i64 = records.iter().map(|r| r.transaction_value.cents()).sum();
        let credentialed: i64 = records.iter().map(|r| r.credentialed_establishments).sum();
        let active: i64 = records.iter().map(|r| r.active_establishments).sum();
        assert_eq!(value, 75_023_456_721);
        assert_eq!(credentialed, 7_211_563);
        assert_eq!(active, 5_001_564);
    }

    #[test]
    fn brand_is_the_outer_dimension() {
        let records = ConcCred::generate_period(&config(), period()).unwrap();
        let order: Vec<(i32, &str)> = records
            .iter()
            .map(|r| (r.brand, r.function.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(1, "D"), (1, "C"), (2, "D"), (2, "C"), (8, "D"), (8, "C")]
        );
        assert_eq!(records[5].credentialed_establishments, 432_693);
    }
}
