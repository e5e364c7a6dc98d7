use cadoc_core::{
    Amount, CadocConfig, CoreError, DistributionTable, Period, ProfitCredit, to_cents,
};

use crate::allocation::{AllocationError, AllocationPlan, Designated, Leaf, Rounding, distribute};
use crate::entities::Generate;

impl Generate for ProfitCredit {
    fn generate_period(config: &CadocConfig, period: Period) -> Result<Vec<Self>, AllocationError> {
        let profit = &config.profit;
        let revenue = split_lines(profit.revenue_total, "revenue", &profit.revenue_split)?;
        let cost = split_lines(profit.cost_total, "cost", &profit.cost_split)?;
        let line = |parts: &[i64], idx: usize| {
            parts
                .get(idx)
                .copied()
                .map(Amount::from_cents)
                .ok_or_else(|| AllocationError::MissingCoordinate(format!("profit line {idx}")))
        };

        Ok(vec![ProfitCredit {
            year: period.year,
            quarter: period.quarter,
            discount_revenue: line(&revenue, 0)?,
            rent_revenue: line(&revenue, 1)?,
            other_revenue: line(&revenue, 2)?,
            interchange_cost: line(&cost, 0)?,
            marketing_cost: line(&cost, 1)?,
            brand_access_cost: line(&cost, 2)?,
            risk_cost: line(&cost, 3)?,
            processing_cost: line(&cost, 4)?,
            other_cost: line(&cost, 5)?,
        }])
    }

    fn check(&self) -> Result<(), CoreError> {
        self.validate()
    }
}

fn split_lines(
    total: f64,
    dimension: &'static str,
    table: &DistributionTable,
) -> Result<Vec<i64>, AllocationError> {
    let leaves = AllocationPlan::new().dimension(dimension, table).leaves()?;
    let shares: Vec<f64> = leaves.iter().map(Leaf::share).collect();
    let split = distribute(to_cents(total), &shares, Rounding::Nearest, Designated::First)?;
    Ok(split.parts().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenerationError;
    use crate::entities::testing::{config, period};

    #[test]
    fn statement_reproduces_totals_and_validates() {
        let records = ProfitCredit::generate_period(&config(), period()).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.total_revenue(), Amount::from_cents(1_725_539_505));
        assert_eq!(record.total_cost(), Amount::from_cents(1_200_375_308));
        assert_eq!(record.rent_revenue, Amount::from_cents(207_064_741));
        record.validate().expect("generated statement is valid");
    }

    #[test]
    fn zero_revenue_statement_is_rejected_before_output() {
        let mut config = config();
        config.profit.revenue_total = 0.0;
        assert!(ProfitCredit::generate(&config).is_ok());
        let err = ProfitCredit::generate_checked(&config).unwrap_err();
        assert!(matches!(err, GenerationError::Core(CoreError::InvalidRecord(_))));
    }
}
