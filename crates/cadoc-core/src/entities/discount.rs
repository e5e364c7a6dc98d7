use std::fmt;

use crate::amount::Amount;
use crate::codec::{FieldSpec, Fields, Layout};
use crate::entities::{EntityKind, Record};
use crate::error::CodecError;

static LAYOUT: Layout = Layout::new(&[
    FieldSpec::int("year", "ano", 1, 4),
    FieldSpec::int("quarter", "trimestre", 5, 5),
    FieldSpec::text("function", "funcao", 6, 6),
    FieldSpec::int("brand", "bandeira", 7, 8),
    FieldSpec::int("capture", "forma_captura", 9, 9),
    FieldSpec::int("installments", "numero_parcelas", 10, 11),
    FieldSpec::int("segment", "codigo_segmento", 12, 14),
    FieldSpec::cents("avg_fee", "taxa_desconto_media", 15, 18),
    FieldSpec::cents("min_fee", "taxa_desconto_minima", 19, 22),
    FieldSpec::cents("max_fee", "taxa_desconto_maxima", 23, 26),
    FieldSpec::cents("stddev_fee", "desvio_padrao_taxa_desconto", 27, 30),
    FieldSpec::cents("value", "valor_transacoes", 31, 45),
    FieldSpec::int("quantity", "quantidade_transacoes", 46, 57),
]);

/// Merchant discount rates per segment, function, brand, capture and
/// installment count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discount {
    pub year: i32,
    pub quarter: i32,
    pub function: String,
    pub brand: i32,
    pub capture: i32,
    pub installments: i32,
    pub segment: i32,
    pub avg_fee: Amount,
    pub min_fee: Amount,
    pub max_fee: Amount,
    pub stddev_fee: Amount,
    pub value: Amount,
    pub quantity: i64,
}

impl Record for Discount {
    const KIND: EntityKind = EntityKind::Discount;

    fn layout() -> &'static Layout {
        &LAYOUT
    }

    fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.year,
            self.quarter,
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
            .with("function", self.function.as_str())
            .with("brand", self.brand)
            .with("capture", self.capture)
            .with("installments", self.installments)
            .with("segment", self.segment)
            .with("avg_fee", self.avg_fee)
            .with("min_fee", self.min_fee)
            .with("max_fee", self.max_fee)
            .with("stddev_fee", self.stddev_fee)
            .with("value", self.value)
            .with("quantity", self.quantity)
    }

    fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
        Ok(Self {
            year: fields.int_as("year")?,
            quarter: fields.int_as("quarter")?,
            function: fields.text("function")?.to_string(),
            brand: fields.int_as("brand")?,
            capture: fields.int_as("capture")?,
            installments: fields.int_as("installments")?,
            segment: fields.int_as("segment")?,
            avg_fee: fields.amount("avg_fee")?,
            min_fee: fields.amount("min_fee")?,
            max_fee: fields.amount("max_fee")?,
            stddev_fee: fields.amount("stddev_fee")?,
            value: fields.amount("value")?,
            quantity: fields.int("quantity")?,
        })
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Year: {}, Quarter: {}, Function: {}, Brand: {}, Capture: {}, Installments: {}, \
             Segment: {}, AvgFee: {}, MinFee: {}, MaxFee: {}, StdDevFee: {}, Value: {}, Qtty: {}",
            self.year,
            self.quarter,
            self.function,
            self.brand,
            self.capture,
            self.installments,
            self.segment,
            self.avg_fee,
            self.min_fee,
            self.max_fee,
            self.stddev_fee,
            self.value,
            self.quantity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_fees_land_in_their_columns() {
        let record = Discount {
            year: 2025,
            quarter: 3,
            function: "D".to_string(),
            brand: 1,
            capture: 2,
            installments: 1,
            segment: 401,
            avg_fee: Amount::from_value(1.8),
            min_fee: Amount::from_value(1.8 - 1.75),
            max_fee: Amount::from_value(1.8 + 2.25),
            stddev_fee: Amount::from_value(1.8 * 0.1),
            value: Amount::from_cents(459_518_560),
            quantity: 30_634,
        };
        let line = record.encode().unwrap();
        assert_eq!(&line[14..18], "0180");
        assert_eq!(&line[18..22], "0005");
        assert_eq!(&line[22..26], "0405");
        assert_eq!(&line[26..30], "0018");

        let decoded = Discount::decode(&line).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.key(), "2025|3|D|1|2|1|401");
    }
}
