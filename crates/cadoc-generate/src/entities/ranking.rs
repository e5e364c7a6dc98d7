use cadoc_core::config::RankingBand;
use cadoc_core::{Amount, CadocConfig, Period, Ranking, to_cents};

use crate::allocation::{
    AllocationError, AllocationPlan, Designated, Leaf, Rounding, distribute, quantity_for,
};
use crate::entities::{Generate, with_installments};

impl Generate for Ranking {
    fn generate_period(config: &CadocConfig, period: Period) -> Result<Vec<Self>, AllocationError> {
        let dims = &config.dimensions;
        let plan = with_installments(
            AllocationPlan::new()
                .dimension("function", &dims.function)
                .dimension("brand", &dims.brand)
                .dimension("capture", &dims.capture),
            config,
        );
        let leaves = plan.leaves()?;
        let shares: Vec<f64> = leaves.iter().map(Leaf::share).collect();
        let segments: Vec<i64> = dims.segment.values().filter_map(|v| v.as_int()).collect();
        if segments.is_empty() {
            return Err(AllocationError::EmptyTable("segment".to_string()));
        }

        let mut records = Vec::new();
        for band in [&config.ranking.largest, &config.ranking.smallest] {
            for client in 1..=band.clients {
                let profile = ClientProfile::new(band, client, &segments)?;
                let split = distribute(
                    to_cents(profile.value),
                    &shares,
                    Rounding::Nearest,
                    Designated::First,
                )?;
                for (idx, leaf) in leaves.iter().enumerate() {
                    records.push(Ranking {
                        year: period.year,
                        quarter: period.quarter,
                        client_code: profile.code.clone(),
                        function: leaf.text("function")?.to_string(),
                        brand: leaf.int32("brand")?,
                        capture: leaf.int32("capture")?,
                        installments: leaf.int32("installments")?,
                        segment: profile.segment,
                        value: Amount::from_cents(split.part(idx)),
                        quantity: quantity_for(split.pure(idx), config.average_ticket),
                        discount: Amount::rounded(profile.fee + leaf.adjustment()),
                    });
                }
            }
        }
        Ok(records)
    }
}

/// Synthetic client `index` (1-based) of a band.
struct ClientProfile {
    code: String,
    segment: i32,
    value: f64,
    fee: f64,
}

impl ClientProfile {
    fn new(band: &RankingBand, index: i64, segments: &[i64]) -> Result<Self, AllocationError> {
        let position = index as usize;
        let segment = segments[position % segments.len()];
        let fee = band
            .fees
            .get(position % band.fees.len().max(1))
            .copied()
            .ok_or_else(|| AllocationError::EmptyTable("ranking fees".to_string()))?;
        Ok(Self {
            code: format!("{:08}", band.base_code + index * band.code_step),
            segment: i32::try_from(segment).map_err(|_| AllocationError::CoordinateKind {
                dimension: "segment".to_string(),
                expected: "32-bit integer",
            })?,
            value: band.base_value + index as f64 * band.value_step,
            fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cadoc_core::Record;

    use super::*;
    use crate::entities::testing::{config, period};

    #[test]
    fn every_client_total_is_exact() {
        let config = config();
        let records = Ranking::generate_period(&config, period()).unwrap();
        assert_eq!(records.len(), (15 + 200) * 78);

        let mut per_client: BTreeMap<String, i64> = BTreeMap::new();
        for record in &records {
            *per_client.entry(record.client_code.clone()).or_default() += record.value.cents();
        }
        assert_eq!(per_client.len(), 215);
        assert_eq!(per_client["12345878"], to_cents(10_500_000.0 + 865_000.0));
        assert_eq!(per_client["23457189"], to_cents(80_000.0 + 2.0 * 1_680.0));
    }

    #[test]
    fn first_client_profile() {
        let records = Ranking::generate_period(&config(), period()).unwrap();
        let first = &records[0];
        assert_eq!(first.client_code, "12345878");
        assert_eq!(first.segment, 402);
        assert_eq!(first.function, "D");
        assert_eq!(first.installments, 1);
        // fee 0.8 with the debit surcharge of -0.5
        assert_eq!(first.discount, Amount::from_cents(30));
        assert_eq!(first.key(), "2025|3|12345878|D|1|2|1|402");

        let credit_12x = records
            .iter()
            .find(|r| r.client_code == "12345878" && r.function == "C" && r.installments == 12)
            .unwrap();
        assert_eq!(credit_12x.discount, Amount::from_cents(295));
    }

    #[test]
    fn keys_are_unique() {
        let records = Ranking::generate_period(&config(), period()).unwrap();
        let mut keys: Vec<String> = records.iter().map(Record::key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), records.len());
    }
}
