use cadoc_core::{Amount, CadocConfig, Discount, Period, to_cents};

use crate::allocation::{
    AllocationError, AllocationPlan, Designated, Leaf, Rounding, distribute, quantity_for,
};
use crate::entities::{Generate, with_installments};

impl Generate for Discount {
    fn generate_period(config: &CadocConfig, period: Period) -> Result<Vec<Self>, AllocationError> {
        let dims = &config.dimensions;
        let fees = &config.discount;
        let leaves = with_installments(
            AllocationPlan::new()
                .dimension("segment", &dims.segment)
                .dimension("function", &dims.function)
                .dimension("brand", &dims.brand)
                .dimension("capture", &dims.capture),
            config,
        )
        .leaves()?;
        let shares: Vec<f64> = leaves.iter().map(Leaf::share).collect();
        let value = distribute(
            to_cents(fees.total_value),
            &shares,
            Rounding::Nearest,
            Designated::First,
        )?;

        leaves
            .iter()
            .enumerate()
            .map(|(idx, leaf)| {
                let fee = fees.average_fee + leaf.adjustment();
                Ok(Discount {
                    year: period.year,
                    quarter: period.quarter,
                    function: leaf.text("function")?.to_string(),
                    brand: leaf.int32("brand")?,
                    capture: leaf.int32("capture")?,
                    installments: leaf.int32("installments")?,
                    segment: leaf.int32("segment")?,
                    avg_fee: Amount::from_value(fee),
                    min_fee: Amount::from_value(fee + fees.min_fee_offset),
                    max_fee: Amount::from_value(fee + fees.max_fee_offset),
                    stddev_fee: Amount::from_value(fee * fees.stddev_proportion),
                    value: Amount::from_cents(value.part(idx)),
                    quantity: quantity_for(value.pure(idx), config.average_ticket),
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
    fn value_total_and_leaf_count() {
        let records = Discount::generate_period(&config(), period()).unwrap();
        assert_eq!(records.len(), 24 * (6 + 72));
        let total: i64 = records.iter().map(|r| r.value.cents()).sum();
        assert_eq!(total, 75_023_456_721);
    }

    #[test]
    fn fee_bounds_are_fixed_offsets() {
        let records = Discount::generate_period(&config(), period()).unwrap();
        let debit = &records[0];
        assert_eq!(debit.segment, 401);
        assert_eq!(debit.function, "D");
        assert_eq!(debit.avg_fee, Amount::from_cents(180));
        assert_eq!(debit.min_fee, Amount::from_cents(5));
        assert_eq!(debit.max_fee, Amount::from_cents(405));
        assert_eq!(debit.stddev_fee, Amount::from_cents(18));

        let credit = records
            .iter()
            .find(|r| r.function == "C" && r.installments == 2)
            .unwrap();
        assert_eq!(credit.avg_fee, Amount::from_cents(340));
        assert_eq!(credit.min_fee, Amount::from_cents(165));
        assert_eq!(credit.max_fee, Amount::from_cents(565));
        assert_eq!(credit.stddev_fee, Amount::from_cents(34));
    }
}
