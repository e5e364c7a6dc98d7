use std::fmt;

use crate::amount::Amount;
use crate::codec::{FieldSpec, Fields, Layout};
use crate::entities::{EntityKind, Record};
use crate::error::CodecError;

static LAYOUT: Layout = Layout::new(&[
    FieldSpec::int("year", "ano", 1, 4),
    FieldSpec::int("quarter", "trimestre", 5, 5),
    FieldSpec::int("product", "produto", 6, 7),
    FieldSpec::text("card_type", "modalidade_cartao", 8, 8),
    FieldSpec::text("function", "funcao", 9, 9),
    FieldSpec::int("brand", "bandeira", 10, 11),
    FieldSpec::int("capture", "forma_captura", 12, 12),
    FieldSpec::int("installments", "numero_parcelas", 13, 14),
    FieldSpec::int("segment", "codigo_segmento", 15, 17),
    FieldSpec::cents("fee", "tarifa_intercambio", 18, 21),
    FieldSpec::cents("value", "valor_transacoes", 22, 36),
    FieldSpec::int("quantity", "quantidade_transacoes", 37, 48),
]);

/// Interchange fees per product, card type and transaction profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intercambio {
    pub year: i32,
    pub quarter: i32,
    pub product: i32,
    pub card_type: String,
    pub function: String,
    pub brand: i32,
    pub capture: i32,
    pub installments: i32,
    pub segment: i32,
    pub fee: Amount,
    pub value: Amount,
    pub quantity: i64,
}

impl Record for Intercambio {
    const KIND: EntityKind = EntityKind::Intercambio;

    fn layout() -> &'static Layout {
        &LAYOUT
    }

    fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.year,
            self.quarter,
            self.product,
            self.card_type,
            self.function,
            self.brand,
            self.capture,
            self.installments,
            self.segment
        )
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("year", self.year)
            .with("quarter", self.quarter)
            .with("product", self.product)
            .with("card_type", self.card_type.as_str())
            .with("function", self.function.as_str())
            .with("brand", self.brand)
            .with("capture", self.capture)
            .with("installments", self.installments)
            .with("segment", self.segment)
            .with("fee", self.fee)
            .with("value", self.value)
            .with("quantity", self.quantity)
    }

    fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
        Ok(Self {
            year: fields.int_as("year")?,
            quarter: fields.int_as("quarter")?,
            product: fields.int_as("product")?,
            card_type: fields.text("card_type")?.to_string(),
            function: fields.text("function")?.to_string(),
            brand: fields.int_as("brand")?,
            capture: fields.int_as("capture")?,
            installments: fields.int_as("installments")?,
            segment: fields.int_as("segment")?,
            fee: fields.amount("fee")?,
            value: fields.amount("value")?,
            quantity: fields.int("quantity")?,
        })
    }
}

impl fmt::Display for Intercambio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Year: {}, Quarter: {}, Product: {}, CardType: {}, Function: {}, Brand: {}, \
             Capture: {}, Installments: {}, Segment: {}, Fee: {}, Value: {}, Qtty: {}",
            self.year,
            self.quarter,
            self.product,
            self.card_type,
            self.function,
            self.brand,
            self.capture,
            self.installments,
            self.segment,
            self.fee,
            self.value,
            self.quantity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_orders_product_before_card_type() {
        let record = Intercambio {
            year: 2025,
            quarter: 3,
            product: 37,
            card_type: "H".to_string(),
            function: "C".to_string(),
            brand: 8,
            capture: 5,
            installments: 7,
            segment: 428,
            fee: Amount::from_value(1.8 + 2.15),
            value: Amount::from_cents(1),
            quantity: 1,
        };
        assert_eq!(record.key(), "2025|3|37|H|C|8|5|7|428");
        let line = record.encode().unwrap();
        assert_eq!(line.len(), 48);
        assert_eq!(&line[17..21], "0395");
        assert_eq!(Intercambio::decode(&line).unwrap(), record);
    }
}
