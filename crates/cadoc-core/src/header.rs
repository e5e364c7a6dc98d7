use chrono::NaiveDate;

use crate::codec::{FieldSpec, Fields, Layout};
use crate::error::{CodecError, HeaderError};

/// Identifier every report file must carry in its header.
pub const ORIGINATOR_ID: &str = "47377613";

static HEADER_LAYOUT: Layout = Layout::new(&[
    FieldSpec::text("file_name", "nome_arquivo", 1, 8),
    FieldSpec::text("date", "data_geracao", 9, 16),
    FieldSpec::text("originator", "originador", 17, 24),
    FieldSpec::int("lines", "quantidade_linhas", 25, 38),
]);

/// Preamble line of every report file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub file_name: String,
    pub date: NaiveDate,
    pub originator: String,
    pub lines: u64,
}

impl Header {
    /// Header for a file about to be written.
    pub fn new(file_name: impl Into<String>, lines: u64, date: NaiveDate) -> Self {
        Self {
            file_name: file_name.into(),
            date,
            originator: ORIGINATOR_ID.to_string(),
            lines,
        }
    }

    pub fn layout() -> &'static Layout {
        &HEADER_LAYOUT
    }

    pub fn parse(line: &str) -> Result<Self, HeaderError> {
        let fields = HEADER_LAYOUT.decode(line)?;
        let raw_date = fields.text("date")?;
        if raw_date.len() != 8 || !raw_date.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(HeaderError::InvalidDate(raw_date.to_string()));
        }
        let date = NaiveDate::parse_from_str(raw_date, "%Y%m%d")
            .map_err(|_| HeaderError::InvalidDate(raw_date.to_string()))?;
        let lines = fields.int_as::<u64>("lines")?;

        Ok(Self {
            file_name: fields.text("file_name")?.to_string(),
            date,
            originator: fields.text("originator")?.to_string(),
            lines,
        })
    }

    pub fn encode(&self) -> Result<String, CodecError> {
        let lines = i64::try_from(self.lines).map_err(|_| CodecError::OutOfRange {
            field: "lines".to_string(),
            value: i64::MAX,
        })?;
        let fields = Fields::new()
            .with("file_name", self.file_name.as_str())
            .with("date", self.date.format("%Y%m%d").to_string())
            .with("originator", self.originator.as_str())
            .with("lines", lines);
        HEADER_LAYOUT.encode(&fields)
    }

    /// Check name, then line count, then originator; first failure wins.
    pub fn validate(&self, expected_name: &str, actual_lines: u64) -> Result<(), HeaderError> {
        if self.file_name != expected_name {
            return Err(HeaderError::NameMismatch {
                expected: expected_name.to_string(),
                found: self.file_name.clone(),
            });
        }
        if self.lines != actual_lines {
            return Err(HeaderError::LineCountMismatch {
                expected: actual_lines,
                found: self.lines,
            });
        }
        if self.originator != ORIGINATOR_ID {
            return Err(HeaderError::OriginatorMismatch {
                expected: ORIGINATOR_ID.to_string(),
                found: self.originator.clone(),
            });
        }
        Ok(())
    }
}
