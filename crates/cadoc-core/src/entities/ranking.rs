use std::fmt;

use crate::amount::Amount;
use crate::codec::{FieldSpec, Fields, Layout};
use crate::entities::{EntityKind, Record};
use crate::error::CodecError;

static LAYOUT: Layout = Layout::new(&[
    FieldSpec::int("year", "ano", 1, 4),
    FieldSpec::int("quarter", "trimestre", 5, 5),
    FieldSpec::text("client_code", "codigo_cliente", 6, 13),
    FieldSpec::text("function", "funcao", 14, 14),
    FieldSpec::int("brand", "bandeira", 15, 16),
    FieldSpec::int("capture", "forma_captura", 17, 17),
    FieldSpec::int("installments", "numero_parcelas", 18, 19),
    FieldSpec::int("segment", "codigo_segmento", 20, 22),
    FieldSpec::cents("value", "valor_transacoes", 23, 37),
    FieldSpec::int("quantity", "quantidade_transacoes", 38, 49),
    FieldSpec::cents("discount", "taxa_desconto_media", 50, 53),
]);

/// Per-client transaction breakdown of the largest and smallest clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub year: i32,
    pub quarter: i32,
    pub client_code: String,
    pub function: String,
    pub brand: i32,
    pub capture: i32,
    pub installments: i32,
    pub segment: i32,
    pub value: Amount,
    pub quantity: i64,
    pub discount: Amount,
}

impl Record for Ranking {
    const KIND: EntityKind = EntityKind::Ranking;

    fn layout() -> &'static Layout {
        &LAYOUT
    }

    fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.year,
            self.quarter,
            self.client_code,
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
            .with("client_code", self.client_code.as_str())
            .with("function", self.function.as_str())
            .with("brand", self.brand)
            .with("capture", self.capture)
            .with("installments", self.installments)
            .with("segment", self.segment)
            .with("value", self.value)
            .with("quantity", self.quantity)
            .with("discount", self.discount)
    }

    fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
        Ok(Self {
            year: fields.int_as("year")?,
            quarter: fields.int_as("quarter")?,
            client_code: fields.text("client_code")?.to_string(),
            function: fields.text("function")?.to_string(),
            brand: fields.int_as("brand")?,
            capture: fields.int_as("capture")?,
            installments: fields.int_as("installments")?,
            segment: fields.int_as("segment")?,
            value: fields.amount("value")?,
            quantity: fields.int("quantity")?,
            discount: fields.amount("discount")?,
        })
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Year: {}, Quarter: {}, ClientCode: {}, Function: {}, Brand: {}, Capture: {}, \
             Installments: {}, Segment: {}, Value: {}, Qtty: {}, Discount: {}",
            self.year,
            self.quarter,
            self.client_code,
            self.function,
            self.brand,
            self.capture,
            self.installments,
            self.segment,
            self.value,
            self.quantity,
            self.discount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ranking {
        Ranking {
            year: 2025,
            quarter: 3,
            client_code: "12345878".to_string(),
            function: "C".to_string(),
            brand: 2,
            capture: 5,
            installments: 12,
            segment: 402,
            value: Amount::rounded(15_012.347),
            quantity: 100,
            discount: Amount::rounded(0.8 + 2.15),
        }
    }

    #[test]
    fn encodes_at_fixed_columns() {
        let line = sample().encode().unwrap();
        assert_eq!(line.len(), 53);
        assert_eq!(&line[0..4], "2025");
        assert_eq!(&line[5..13], "12345878");
        assert_eq!(&line[13..14], "C");
        assert_eq!(&line[17..19], "12");
        assert_eq!(&line[22..37], "000000001501235");
        assert_eq!(&line[49..53], "0295");
    }

    #[test]
    fn decode_restores_the_record() {
        let record = sample();
        let decoded = Ranking::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.key(), "2025|3|12345878|C|2|5|12|402");
        assert_eq!(decoded.to_string(), record.to_string());
    }
}
