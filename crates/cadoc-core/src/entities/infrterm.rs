use std::fmt;

use crate::codec::{FieldSpec, Fields, Layout};
use crate::entities::{EntityKind, Record};
use crate::error::CodecError;

static LAYOUT: Layout = Layout::new(&[
    FieldSpec::int("year", "ano", 1, 4),
    FieldSpec::int("quarter", "trimestre", 5, 5),
    FieldSpec::text("uf", "uf", 6, 7),
    FieldSpec::int("total_pos", "quantidade_pos_totais", 8, 15),
    FieldSpec::int("shared_pos", "quantidade_pos_compartilhados", 16, 23),
    FieldSpec::int("chip_reader_pos", "quantidade_pos_leitora_chip", 24, 31),
    FieldSpec::int("pdv", "quantidade_pdv", 32, 39),
]);

/// Terminals per state, split by terminal type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraTerminal {
    pub year: i32,
    pub quarter: i32,
    pub uf: String,
    pub total_pos: i64,
    pub shared_pos: i64,
    pub chip_reader_pos: i64,
    pub pdv: i64,
}

impl Record for InfraTerminal {
    const KIND: EntityKind = EntityKind::InfraTerminal;

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
            .with("total_pos", self.total_pos)
            .with("shared_pos", self.shared_pos)
            .with("chip_reader_pos", self.chip_reader_pos)
            .with("pdv", self.pdv)
    }

    fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
        Ok(Self {
            year: fields.int_as("year")?,
            quarter: fields.int_as("quarter")?,
            uf: fields.text("uf")?.to_string(),
            total_pos: fields.int("total_pos")?,
            shared_pos: fields.int("shared_pos")?,
            chip_reader_pos: fields.int("chip_reader_pos")?,
            pdv: fields.int("pdv")?,
        })
    }
}

impl fmt::Display for InfraTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Year: {}, Quarter: {}, UF: {}, TotalPOSCount: {}, SharedPOSCount: {}, \
             ChipReaderPOSCount: {}, PDVCount: {}",
            self.year,
            self.quarter,
            self.uf,
            self.total_pos,
            self.shared_pos,
            self.chip_reader_pos,
            self.pdv
        )
    }
}
