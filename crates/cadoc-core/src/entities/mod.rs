//! Record kinds of the quarterly card-acquiring report.
//!
//! Every kind owns a fixed-width [`Layout`], a key used to join collections,
//! a canonical `Display` rendering used for comparison, and a relational
//! table name for insert statements and repository reads.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::codec::{FieldValue, Fields, Layout};
use crate::error::{CodecError, CoreError};

pub mod conccred;
pub mod discount;
pub mod infresta;
pub mod infrterm;
pub mod intercam;
pub mod lucrcred;
pub mod ranking;
pub mod segment;

pub use conccred::ConcCred;
pub use discount::Discount;
pub use infresta::InfraEstablishment;
pub use infrterm::InfraTerminal;
pub use intercam::Intercambio;
pub use lucrcred::ProfitCredit;
pub use ranking::Ranking;
pub use segment::Segment;

/// Entity kind, one per report file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Ranking,
    ConcCred,
    Discount,
    InfraEstablishment,
    InfraTerminal,
    Intercambio,
    Segment,
    ProfitCredit,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Ranking,
        EntityKind::ConcCred,
        EntityKind::Discount,
        EntityKind::InfraEstablishment,
        EntityKind::InfraTerminal,
        EntityKind::Intercambio,
        EntityKind::Segment,
        EntityKind::ProfitCredit,
    ];

    /// Token carried by the header and used as the file stem.
    pub fn file_token(self) -> &'static str {
        match self {
            EntityKind::Ranking => "RANKING",
            EntityKind::ConcCred => "CONCCRED",
            EntityKind::Discount => "DESCONTO",
            EntityKind::InfraEstablishment => "INFRESTA",
            EntityKind::InfraTerminal => "INFRTERM",
            EntityKind::Intercambio => "INTERCAM",
            EntityKind::Segment => "SEGMENTO",
            EntityKind::ProfitCredit => "LUCRCRED",
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::Ranking => "cadoc_6334_ranking",
            EntityKind::ConcCred => "cadoc_6334_conccred",
            EntityKind::Discount => "cadoc_6334_desconto",
            EntityKind::InfraEstablishment => "cadoc_6334_infresta",
            EntityKind::InfraTerminal => "cadoc_6334_infrterm",
            EntityKind::Intercambio => "cadoc_6334_intercam",
            EntityKind::Segment => "cadoc_6334_segmento",
            EntityKind::ProfitCredit => "cadoc_6334_luccred",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.TXT", self.file_token())
    }

    pub fn layout(self) -> &'static Layout {
        match self {
            EntityKind::Ranking => Ranking::layout(),
            EntityKind::ConcCred => ConcCred::layout(),
            EntityKind::Discount => Discount::layout(),
            EntityKind::InfraEstablishment => InfraEstablishment::layout(),
            EntityKind::InfraTerminal => InfraTerminal::layout(),
            EntityKind::Intercambio => Intercambio::layout(),
            EntityKind::Segment => Segment::layout(),
            EntityKind::ProfitCredit => ProfitCredit::layout(),
        }
    }

    fn slug(self) -> &'static str {
        match self {
            EntityKind::Ranking => "ranking",
            EntityKind::ConcCred => "conc_cred",
            EntityKind::Discount => "discount",
            EntityKind::InfraEstablishment => "infra_establishment",
            EntityKind::InfraTerminal => "infra_terminal",
            EntityKind::Intercambio => "intercambio",
            EntityKind::Segment => "segment",
            EntityKind::ProfitCredit => "profit_credit",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    /// Accepts the snake_case name or the file token, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        EntityKind::ALL
            .into_iter()
            .find(|kind| {
                kind.slug().eq_ignore_ascii_case(needle)
                    || kind.file_token().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| CoreError::UnknownEntity(needle.to_string()))
    }
}

/// Typed record of one entity kind.
pub trait Record: Sized + Clone + fmt::Display {
    const KIND: EntityKind;

    fn layout() -> &'static Layout;

    /// Join key; unique within one collection.
    fn key(&self) -> String;

    fn to_fields(&self) -> Fields;

    fn from_fields(fields: &Fields) -> Result<Self, CodecError>;

    fn encode(&self) -> Result<String, CodecError> {
        Self::layout().encode(&self.to_fields())
    }

    fn decode(line: &str) -> Result<Self, CodecError> {
        Self::from_fields(&Self::layout().decode(line)?)
    }

    fn insert_statement(&self) -> String {
        insert_statement(Self::KIND.table_name(), Self::layout(), &self.to_fields())
    }
}

/// Render `INSERT INTO <table> (<cols>) VALUES (<vals>);` in layout order.
pub fn insert_statement(table: &str, layout: &Layout, fields: &Fields) -> String {
    let mut columns = Vec::with_capacity(layout.fields().len());
    let mut values = Vec::with_capacity(layout.fields().len());
    for spec in layout.fields() {
        columns.push(spec.column);
        values.push(match fields.get(spec.name) {
            Some(FieldValue::Text(text)) => quote_literal(text),
            Some(value) => value.to_string(),
            None => "NULL".to_string(),
        });
    }
    format!(
        "INSERT INTO {table} ({}) VALUES ({});",
        columns.join(", "),
        values.join(", ")
    )
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Names of the fields whose values differ between two renderings of the
/// same layout.
pub fn differing_fields(layout: &Layout, left: &Fields, right: &Fields) -> Vec<&'static str> {
    layout
        .fields()
        .iter()
        .filter(|spec| left.get(spec.name) != right.get(spec.name))
        .map(|spec| spec.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slugs_and_tokens() {
        assert_eq!("ranking".parse::<EntityKind>().unwrap(), EntityKind::Ranking);
        assert_eq!("DESCONTO".parse::<EntityKind>().unwrap(), EntityKind::Discount);
        assert_eq!(
            "infra_terminal".parse::<EntityKind>().unwrap(),
            EntityKind::InfraTerminal
        );
        assert!(matches!(
            "nope".parse::<EntityKind>(),
            Err(CoreError::UnknownEntity(_))
        ));
    }

    #[test]
    fn every_kind_names_a_file_and_table() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.file_name(), format!("{}.TXT", kind.file_token()));
            assert!(kind.table_name().starts_with("cadoc_6334_"));
            assert!(kind.layout().line_width() > 0);
            assert_eq!(kind.to_string().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn insert_escapes_quotes() {
        let segment = Segment {
            name: "Cuidados pessoais".to_string(),
            description: "Loja d'agua".to_string(),
            code: 401,
        };
        assert_eq!(
            segment.insert_statement(),
            "INSERT INTO cadoc_6334_segmento (nome, descricao, codigo_segmento) \
             VALUES ('Cuidados pessoais', 'Loja d''agua', 401);"
        );
    }
}
