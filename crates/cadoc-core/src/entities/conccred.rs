use std::fmt;

use crate::amount::Amount;
use crate::codec::{FieldSpec, Fields, Layout};
use crate::entities::{EntityKind, Record};
use crate::error::CodecError;

static LAYOUT: Layout = Layout::new(&[
    FieldSpec::int("year", "ano", 1, 4),
    FieldSpec::int("quarter", "trimestre", 5, 5),
    FieldSpec::int("brand", "bandeira", 6, 7),
    FieldSpec::text("function", "funcao", 8, 8),
    FieldSpec::int(
        "credentialed_establishments",
        "quantidade_estabelecimentos_credenciados",
        9,
        17,
    ),
    FieldSpec::int(
        "active_establishments",
        "quantidade_estabelecimentos_ativos",
        18,
        26,
    ),
    FieldSpec::cents("transaction_value", "valor_transacoes", 27, 41),
    FieldSpec::int("transaction_quantity", "quantidade_transacoes", 42, 53),
]);

/// Credentialing concentration per brand and function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcCred {
    pub year: i32,
    pub quarter: i32,
    pub brand: i32,
    pub function: String,
    pub credentialed_establishments: i64,
    pub active_establishments: i64,
    pub transaction_value: Amount,
    pub transaction_quantity: i64,
}

impl Record for ConcCred {
    const KIND: EntityKind = EntityKind::ConcCred;

    fn layout() -> &'static Layout {
        &LAYOUT
    }

    fn key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.year, self.quarter, self.brand, self.function
        )
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("year", self.year)
            .with("quarter", self.quarter)
            .with("brand", self.brand)
            .with("function", self.function.as_str())
            .with("credentialed_establishments", self.credentialed_establishments)
            .with("active_establishments", self.active_establishments)
            .with("transaction_value", self.transaction_value)
            .with("transaction_quantity", self.transaction_quantity)
    }

    fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
        Ok(Self {
            year: fields.int_as("year")?,
            quarter: fields.int_as("quarter")?,
            brand: fields.int_as("brand")?,
            function: fields.text("function")?.to_string(),
            credentialed_establishments: fields.int("credentialed_establishments")?,
            active_establishments: fields.int("active_establishments")?,
            transaction_value: fields.amount("transaction_value")?,
            transaction_quantity: fields.int("transaction_quantity")?,
        })
    }
}

impl fmt::Display for ConcCred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Year: {}, Quarter: {}, Brand: {}, Function: {}, CredentialedEstablishments: {}, \
             ActiveEstablishments: {}, TransactionValue: {}, TransactionQuantity: {}",
            self.year,
            self.quarter,
            self.brand,
            self.function,
            self.credentialed_establishments,
            self.active_establishments,
            self.transaction_value,
            self.transaction_quantity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_dashes() {
        let record = ConcCred {
            year: 2025,
            quarter: 3,
            brand: 8,
            function: "D".to_string(),
            credentialed_establishments: 1_009_618,
            active_establishments: 700_219,
            transaction_value: Amount::from_cents(10_503_283_941),
            transaction_quantity: 700_218,
        };
        assert_eq!(record.key(), "2025-3-8-D");

        let line = record.encode().unwrap();
        assert_eq!(&line[5..7], "08");
        assert_eq!(&line[8..17], "001009618");
        assert_eq!(ConcCred::decode(&line).unwrap(), record);
    }
}
