use cadoc_core::{Amount, CadocConfig, Intercambio, Period, to_cents};

use crate::allocation::{
    AllocationError, AllocationPlan, Designated, Leaf, Rounding, distribute, quantity_for,
};
use crate::entities::{Generate, with_installments};

impl Generate for Intercambio {
    fn generate_period(config: &CadocConfig, period: Period) -> Result<Vec<Self>, AllocationError> {
        let dims = &config.dimensions;
        let totals = &config.intercam;
        let leaves = with_installments(
            AllocationPlan::new()
                .dimension("segment", &dims.segment)
                .dimension("product", &dims.product)
                .dimension("card_type", &dims.card_type)
                .dimension("function", &dims.function)
                .dimension("brand", &dims.brand)
                .dimension("capture", &dims.capture),
            config,
        )
        .leaves()?;
        let shares: Vec<f64> = leaves.iter().map(Leaf::share).collect();
        let value = distribute(
            to_cents(totals.total_value),
            &shares,
            Rounding::Nearest,
            Designated::First,
        )?;

        leaves
            .iter()
            .enumerate()
            .map(|(idx, leaf)| {
                Ok(Intercambio {
                    year: period.year,
                    quarter: period.quarter,
                    product: leaf.int32("product")?,
                    card_type: leaf.text("card_type")?.to_string(),
                    function: leaf.text("function")?.to_string(),
                    brand: leaf.int32("brand")?,
                    capture: leaf.int32("capture")?,
                    installments: leaf.int32("installments")?,
                    segment: leaf.int32("segment")?,
                    fee: Amount::from_value(totals.average_fee + leaf.adjustment()),
                    value: Amount::from_cents(value.part(idx)),
                    // a zero count is not reportable
                    quantity: quantity_for(value.pure(idx), config.average_ticket).max(1),
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
    fn product_gap_is_absorbed_by_first_leaf() {
        let records = Intercambio::generate_period(&config(), period()).unwrap();
        assert_eq!(records.len(), 24 * 6 * 3 * (6 + 72));
        let total: i64 = records.iter().map(|r| r.value.cents()).sum();
        assert_eq!(total, 75_023_456_721);
        assert!(records[0].value.cents() > records[1].value.cents());
    }

    #[test]
    fn quantity_never_drops_to_zero() {
        let records = Intercambio::generate_period(&config(), period()).unwrap();
        assert!(records.iter().all(|r| r.quantity >= 1));
        let tiny = records
            .iter()
            .find(|r| r.product == 37 && r.card_type == "H" && r.installments == 12)
            .unwrap();
        assert_eq!(tiny.quantity, 1);
        assert_eq!(tiny.fee, Amount::from_cents(395));
    }
}
