use cadoc_core::{CadocConfig, InfraTerminal, Period};

use crate::allocation::{AllocationError, AllocationPlan, Designated, Leaf, Rounding, distribute};
use crate::entities::Generate;

impl Generate for InfraTerminal {
    fn generate_period(config: &CadocConfig, period: Period) -> Result<Vec<Self>, AllocationError> {
        let infra = &config.infrterm;
        let leaves = AllocationPlan::new()
            .dimension("uf", &config.dimensions.uf)
            .leaves()?;
        let shares: Vec<f64> = leaves.iter().map(Leaf::share).collect();
        let totals = distribute(
            infra.total_terminals,
            &shares,
            Rounding::Floor,
            Designated::First,
        )?;
        let type_shares = infra.terminal_split.proportions();

        leaves
            .iter()
            .enumerate()
            .map(|(idx, leaf)| {
                // shared, chip reader, pdv over the pure state share; chip
                // reader takes the split remainder
                let split = distribute(
                    totals.pure(idx),
                    &type_shares,
                    Rounding::Floor,
                    Designated::Second,
                )?;
                // the state residual is booked as shared terminals
                let residual = if idx == totals.designated() {
                    totals.residual()
                } else {
                    0
                };
                Ok(InfraTerminal {
                    year: period.year,
                    quarter: period.quarter,
                    uf: leaf.text("uf")?.to_string(),
                    total_pos: totals.part(idx),
                    shared_pos: split.part(0) + residual,
                    chip_reader_pos: split.part(1),
                    pdv: split.part(2),
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
    fn first_state_absorbs_the_residual() {
        let records = InfraTerminal::generate_period(&config(), period()).unwrap();
        assert_eq!(records.iter().map(|r| r.total_pos).sum::<i64>(), 7_316_222);
        assert_eq!(records[0].total_pos, 1_579_572 + 5_133);
        assert_eq!(records[1].total_pos, 733_085);
    }

    #[test]
    fn state_residual_is_booked_as_shared_terminals() {
        let records = InfraTerminal::generate_period(&config(), period()).unwrap();
        let sp = &records[0];
        assert_eq!(sp.uf, "SP");
        assert_eq!(sp.shared_pos, 473_871 + 5_133);
        assert_eq!(sp.pdv, 315_914);
        assert_eq!(sp.chip_reader_pos, 1_579_572 - 473_871 - 315_914);
        assert_eq!(sp.total_pos, sp.shared_pos + sp.chip_reader_pos + sp.pdv);

        let mg = &records[1];
        assert_eq!(mg.shared_pos, 219_925);
        assert_eq!(mg.pdv, 146_617);
    }

    #[test]
    fn type_split_is_consistent_per_state() {
        let records = InfraTerminal::generate_period(&config(), period()).unwrap();
        let roraima = records.iter().find(|r| r.uf == "RR").unwrap();
        assert_eq!(roraima.total_pos, 21_948);
        assert_eq!(roraima.shared_pos, 6_584);
        assert_eq!(roraima.pdv, 4_389);
        assert_eq!(roraima.chip_reader_pos, 21_948 - 6_584 - 4_389);
        for record in &records {
            assert_eq!(
                record.shared_pos + record.chip_reader_pos + record.pdv,
                record.total_pos
            );
        }
    }
}
