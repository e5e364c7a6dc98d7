use std::fmt;

use crate::amount::Amount;
use crate::codec::{FieldSpec, Fields, Layout};
use crate::entities::{EntityKind, Record};
use crate::error::{CodecError, CoreError};

static LAYOUT: Layout = Layout::new(&[
    FieldSpec::int("year", "ano", 1, 4),
    FieldSpec::int("quarter", "trimestre", 5, 5),
    FieldSpec::cents("discount_revenue", "receitataxadescontobruta", 6, 17),
    FieldSpec::cents("rent_revenue", "receitaaluguelequipamentosconectividade", 18, 29),
    FieldSpec::cents("other_revenue", "receitaoutras", 30, 41),
    FieldSpec::cents("interchange_cost", "custotarifaintercambio", 42, 53),
    FieldSpec::cents("marketing_cost", "customarketingpropaganda", 54, 65),
    FieldSpec::cents("brand_access_cost", "custotaxasacessobandeiras", 66, 77),
    FieldSpec::cents("risk_cost", "custorisco", 78, 89),
    FieldSpec::cents("processing_cost", "custoprocessamento", 90, 101),
    FieldSpec::cents("other_cost", "custooutros", 102, 113),
]);

/// Quarterly revenue and cost statement of the credit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfitCredit {
    pub year: i32,
    pub quarter: i32,
    pub discount_revenue: Amount,
    pub rent_revenue: Amount,
    pub other_revenue: Amount,
    pub interchange_cost: Amount,
    pub marketing_cost: Amount,
    pub brand_access_cost: Amount,
    pub risk_cost: Amount,
    pub processing_cost: Amount,
    pub other_cost: Amount,
}

impl ProfitCredit {
    /// Every amount must be positive; risk cost may also be zero.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.year <= 0 {
            return Err(invalid("year"));
        }
        if self.quarter <= 0 {
            return Err(invalid("quarter"));
        }
        let positive = [
            ("discount revenue", self.discount_revenue),
            ("rent revenue", self.rent_revenue),
            ("other revenue", self.other_revenue),
            ("interchange cost", self.interchange_cost),
            ("marketing cost", self.marketing_cost),
            ("brand access cost", self.brand_access_cost),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, amount)| amount.cents() <= 0) {
            return Err(invalid(name));
        }
        if self.risk_cost.cents() < 0 {
            return Err(invalid("risk cost"));
        }
        for (name, amount) in [
            ("processing cost", self.processing_cost),
            ("other cost", self.other_cost),
        ] {
            if amount.cents() <= 0 {
                return Err(invalid(name));
            }
        }
        Ok(())
    }

    pub fn total_revenue(&self) -> Amount {
        Amount::from_cents(
            self.discount_revenue.cents() + self.rent_revenue.cents() + self.other_revenue.cents(),
        )
    }

    pub fn total_cost(&self) -> Amount {
        Amount::from_cents(
            [
                self.interchange_cost,
                self.marketing_cost,
                self.brand_access_cost,
                self.risk_cost,
                self.processing_cost,
                self.other_cost,
            ]
            .iter()
            .map(Amount::cents)
            .sum(),
        )
    }
}

fn invalid(what: &str) -> CoreError {
    CoreError::InvalidRecord(format!("invalid {what} in LucrCred"))
}

impl Record for ProfitCredit {
    const KIND: EntityKind = EntityKind::ProfitCredit;

    fn layout() -> &'static Layout {
        &LAYOUT
    }

    fn key(&self) -> String {
        format!("{:04}{:01}", self.year, self.quarter)
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("year", self.year)
            .with("quarter", self.quarter)
            .with("discount_revenue", self.discount_revenue)
            .with("rent_revenue", self.rent_revenue)
            .with("other_revenue", self.other_revenue)
            .with("interchange_cost", self.interchange_cost)
            .with("marketing_cost", self.marketing_cost)
            .with("brand_access_cost", self.brand_access_cost)
            .with("risk_cost", self.risk_cost)
            .with("processing_cost", self.processing_cost)
            .with("other_cost", self.other_cost)
    }

    fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
        Ok(Self {
            year: fields.int_as("year")?,
            quarter: fields.int_as("quarter")?,
            discount_revenue: fields.amount("discount_revenue")?,
            rent_revenue: fields.amount("rent_revenue")?,
            other_revenue: fields.amount("other_revenue")?,
            interchange_cost: fields.amount("interchange_cost")?,
            marketing_cost: fields.amount("marketing_cost")?,
            brand_access_cost: fields.amount("brand_access_cost")?,
            risk_cost: fields.amount("risk_cost")?,
            processing_cost: fields.amount("processing_cost")?,
            other_cost: fields.amount("other_cost")?,
        })
    }
}

impl fmt::Display for ProfitCredit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Year: {}, Quarter: {}, DiscountRevenue: {}, RentRevenue: {}, OtherRevenue: {}, \
             InterchangeCost: {}, MarketingCost: {}, BrandAccessCost: {}, RiskCost: {}, \
             ProcessingCost: {}, OtherCost: {}",
            self.year,
            self.quarter,
            self.discount_revenue,
            self.rent_revenue,
            self.other_revenue,
            self.interchange_cost,
            self.marketing_cost,
            self.brand_access_cost,
            self.risk_cost,
            self.processing_cost,
            self.other_cost
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProfitCredit {
        ProfitCredit {
            year: 2025,
            quarter: 3,
            discount_revenue: Amount::from_cents(1_414_942_394),
            rent_revenue: Amount::from_cents(207_064_741),
            other_revenue: Amount::from_cents(103_532_370),
            interchange_cost: Amount::from_cents(660_206_420),
            marketing_cost: Amount::from_cents(60_018_765),
            brand_access_cost: Amount::from_cents(96_030_024),
            risk_cost: Amount::from_cents(0),
            processing_cost: Amount::from_cents(240_075_061),
            other_cost: Amount::from_cents(120_037_530),
        }
    }

    #[test]
    fn key_packs_year_and_quarter() {
        assert_eq!(sample().key(), "20253");
    }

    #[test]
    fn zero_risk_is_accepted_but_zero_revenue_is_not() {
        let mut record = sample();
        assert!(record.validate().is_ok());

        record.rent_revenue = Amount::from_cents(0);
        let err = record.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid record: invalid rent revenue in LucrCred");

        let mut record = sample();
        record.risk_cost = Amount::from_cents(-1);
        assert!(record.validate().is_err());
    }

    #[test]
    fn twelve_column_amounts_round_trip() {
        let record = sample();
        let line = record.encode().unwrap();
        assert_eq!(line.len(), 113);
        assert_eq!(&line[5..17], "001414942394");
        assert_eq!(ProfitCredit::decode(&line).unwrap(), record);
        assert_eq!(record.total_revenue(), Amount::from_cents(1_725_539_505));
    }
}
