use cadoc_core::{CadocConfig, InfraEstablishment, Period};

use crate::allocation::{AllocationError, AllocationPlan, Designated, Leaf, Rounding, distribute};
use crate::entities::Generate;

impl Generate for InfraEstablishment {
    fn generate_period(config: &CadocConfig, period: Period) -> Result<Vec<Self>, AllocationError> {
        let infra = &config.infresta;
        let leaves = AllocationPlan::new()
            .dimension("uf", &config.dimensions.uf)
            .leaves()?;
        let shares: Vec<f64> = leaves.iter().map(Leaf::share).collect();
        // The state residual lands on the second state.
        let totals = distribute(
            infra.total_establishments,
            &shares,
            Rounding::Floor,
            Designated::Second,
        )?;
        let capture_shares = infra.capture_split.proportions();

        leaves
            .iter()
            .enumerate()
            .map(|(idx, leaf)| {
                let total = totals.part(idx);
                // manual and remote come from the state's share before the
                // residual; electronic takes whatever is left
                let split = distribute(
                    totals.pure(idx),
                    &capture_shares,
                    Rounding::Floor,
                    Designated::Second,
                )?;
                let manual = split.part(0);
                let remote = split.part(2);
                Ok(InfraEstablishment {
                    year: period.year,
                    quarter: period.quarter,
                    uf: leaf.text("uf")?.to_string(),
                    total,
                    manual,
                    electronic: total - manual - remote,
                    remote,
                })
            })
            .collect()
    }
}
