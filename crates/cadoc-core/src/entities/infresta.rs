use std::fmt;

use crate::codec::{FieldSpec, Fields, Layout};
use crate::entities::{EntityKind, Record};
use crate::error::CodecError;

static LAYOUT: Layout = Layout::new(&[
    FieldSpec::int("year", "ano", 1, 4),
    FieldSpec::int("quarter", "trimestre", 5, 5),
    FieldSpec::text("uf", "uf", 6, 7),
    FieldSpec::int("total", "quantidade_estabelecimentos_totais", 8, 15),
    FieldSpec::int("manual", "quantidade_estabelecimentos_captura_manual", 16, 23),
    FieldSpec::int("electronic", "quantidade_estabelecimentos_captura_eletronica", 24, 31),
    FieldSpec::int("remote", "quantidade_estabelecimentos_captura_remota", 32, 39),
]);

/// Establishments per state, split by capture technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraEstablishment {
    pub year: i32,
    pub quarter: i32,
    pub uf: String,
    pub total: i64,
    pub manual: i64,
    pub electronic: i64,
    pub remote: i64,
}

impl Record for InfraEstablishment {
    const KIND: EntityKind = EntityKind::InfraEstablishment;

    fn layout() -> &'static Layout {
        &LAYOUT
    }

    fn key(&self) -> String {
        format!("{}-{}-{}", self.year, self.quarter, self.uf)
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("year", self.year)
            .with("quarter", self.quarter)
            .with("uf", self.uf.as_str())
            .with("total", self.total)
            .with("manual", self.manual)
            .with("electronic", self.electronic)
            .with("remote", self.remote)
    }

    fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
        Ok(Self {
            year: fields.int_as("year")?,
            quarter: fields.int_as("quarter")?,
            uf: fields.text("uf")?.to_string(),
            total: fields.int("total")?,
            manual: fields.int("manual")?,
            electronic: fields.int("electronic")?,
            remote: fields.int("remote")?,
        })
    }
}

impl fmt::Display for InfraEstablishment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Year: {}, Quarter: {}, UF: {}, TotalCli: {}, TotalCliManual: {}, \
             TotalCliEletronic: {}, TotalCliRemote: {}",
            self.year,
            self.quarter,
            self.uf,
            self.total,
            self.manual,
            self.electronic,
            self.remote
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_counts() {
        let record = InfraEstablishment {
            year: 2025,
            quarter: 3,
            uf: "MG".to_string(),
            total: 722_601,
            manual: 361_300,
            electronic: 216_781,
            remote: 144_520,
        };
        let line = record.encode().unwrap();
        assert_eq!(line, "20253MG00722601003613000021678100144520");
        assert_eq!(InfraEstablishment::decode(&line).unwrap(), record);
        assert_eq!(record.key(), "2025-3-MG");
    }
}
