use std::fmt;

use crate::codec::{FieldSpec, Fields, Layout};
use crate::config::SegmentEntry;
use crate::entities::{EntityKind, Record};
use crate::error::CodecError;

static LAYOUT: Layout = Layout::new(&[
    FieldSpec::text("name", "nome", 1, 50),
    FieldSpec::text("description", "descricao", 51, 300),
    FieldSpec::int("code", "codigo_segmento", 301, 303),
]);

/// Market segment catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub description: String,
    pub code: i32,
}

impl From<&SegmentEntry> for Segment {
    fn from(entry: &SegmentEntry) -> Self {
        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
            code: entry.code,
        }
    }
}

impl Record for Segment {
    const KIND: EntityKind = EntityKind::Segment;

    fn layout() -> &'static Layout {
        &LAYOUT
    }

    fn key(&self) -> String {
        format!("{:03}", self.code)
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("code", self.code)
    }

    fn from_fields(fields: &Fields) -> Result<Self, CodecError> {
        Ok(Self {
            name: fields.text("name")?.to_string(),
            description: fields.text("description")?.to_string(),
            code: fields.int_as("code")?,
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, Description: {}, Code: {}",
            self.name, self.description, self.code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accented_text_keeps_code_column() {
        let segment = Segment {
            name: "Educação".to_string(),
            description: "Universidades e faculdades;Colégios".to_string(),
            code: 405,
        };
        let line = segment.encode().unwrap();
        assert_eq!(line.chars().count(), 303);
        assert!(line.ends_with("405"));
        let decoded = Segment::decode(&line).unwrap();
        assert_eq!(decoded, segment);
        assert_eq!(decoded.key(), "405");
    }

    #[test]
    fn key_is_zero_padded() {
        let segment = Segment {
            name: "X".to_string(),
            description: String::new(),
            code: 7,
        };
        assert_eq!(segment.key(), "007");
    }
}
