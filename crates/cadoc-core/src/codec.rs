//! Column-range codec for fixed-width report lines.
//!
//! Columns are 1-indexed and inclusive, counted in characters of the decoded
//! Latin-1 text. Numbers are right-justified and zero-padded; text is
//! left-justified and space-padded. `Cents` columns hold an integer number of
//! cents that maps to an [`Amount`].

use std::fmt;

use crate::amount::Amount;
use crate::error::CodecError;

/// Storage kind of a fixed-width column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Text,
    Cents,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Int => "integer",
            FieldKind::Text => "text",
            FieldKind::Cents => "cents",
        };
        f.write_str(name)
    }
}

/// One column range of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name used by records.
    pub name: &'static str,
    /// Column name in the relational store.
    pub column: &'static str,
    pub start: usize,
    pub end: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn int(name: &'static str, column: &'static str, start: usize, end: usize) -> Self {
        Self::new(name, column, start, end, FieldKind::Int)
    }

    pub const fn text(name: &'static str, column: &'static str, start: usize, end: usize) -> Self {
        Self::new(name, column, start, end, FieldKind::Text)
    }

    pub const fn cents(
        name: &'static str,
        column: &'static str,
        start: usize,
        end: usize,
    ) -> Self {
        Self::new(name, column, start, end, FieldKind::Cents)
    }

    const fn new(
        name: &'static str,
        column: &'static str,
        start: usize,
        end: usize,
        kind: FieldKind,
    ) -> Self {
        Self {
            name,
            column,
            start,
            end,
            kind,
        }
    }

    pub fn width(&self) -> usize {
        self.end + 1 - self.start
    }

    fn format(&self, value: &FieldValue) -> Result<String, CodecError> {
        match (self.kind, value) {
            (FieldKind::Int, FieldValue::Int(number)) => pad_number(self, *number),
            (FieldKind::Cents, FieldValue::Amount(amount)) => pad_number(self, amount.cents()),
            (FieldKind::Text, FieldValue::Text(text)) => {
                let clipped: String = text.chars().take(self.width()).collect();
                Ok(format!("{clipped:<width$}", width = self.width()))
            }
            _ => Err(CodecError::KindMismatch {
                field: self.name.to_string(),
                expected: self.kind,
            }),
        }
    }

    fn parse(&self, raw: &str) -> Result<FieldValue, CodecError> {
        match self.kind {
            FieldKind::Int => parse_number(self.name, raw).map(FieldValue::Int),
            FieldKind::Cents => {
                parse_number(self.name, raw).map(|cents| FieldValue::Amount(Amount::from_cents(cents)))
            }
            FieldKind::Text => Ok(FieldValue::Text(raw.trim_end().to_string())),
        }
    }
}

/// Ordered set of column ranges describing one record kind.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    fields: &'static [FieldSpec],
}

impl Layout {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&'static FieldSpec> {
        self.fields
            .iter()
            .find(|spec| spec.column.eq_ignore_ascii_case(column))
    }

    /// Last column covered by the layout.
    pub fn line_width(&self) -> usize {
        self.fields.iter().map(|spec| spec.end).max().unwrap_or(0)
    }

    /// Decode one line into fields in layout order.
    pub fn decode(&self, line: &str) -> Result<Fields, CodecError> {
        let chars: Vec<char> = line.chars().collect();
        let expected = self.line_width();
        if chars.len() < expected {
            return Err(CodecError::LineTooShort {
                expected,
                found: chars.len(),
            });
        }

        let mut fields = Fields::new();
        for spec in self.fields {
            let raw: String = chars[spec.start - 1..spec.end].iter().collect();
            fields.push(spec.name, spec.parse(&raw)?);
        }
        Ok(fields)
    }

    /// Render fields into one line. Gaps between ranges are space-filled.
    pub fn encode(&self, fields: &Fields) -> Result<String, CodecError> {
        let mut line = String::with_capacity(self.line_width());
        let mut column = 0;
        for spec in self.fields {
            let value = fields
                .get(spec.name)
                .ok_or_else(|| CodecError::MissingField(spec.name.to_string()))?;
            while column + 1 < spec.start {
                line.push(' ');
                column += 1;
            }
            line.push_str(&spec.format(value)?);
            column = spec.end;
        }
        Ok(line)
    }
}

/// Typed value of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Amount(Amount),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(value) => write!(f, "{value}"),
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Amount(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Amount> for FieldValue {
    fn from(value: Amount) -> Self {
        FieldValue::Amount(value)
    }
}

/// Named field values in layout order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(&'static str, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &'static str, value: impl Into<FieldValue>) {
        self.entries.push((name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn int(&self, name: &str) -> Result<i64, CodecError> {
        match self.require(name)? {
            FieldValue::Int(value) => Ok(*value),
            _ => Err(kind_mismatch(name, FieldKind::Int)),
        }
    }

    /// Integer field narrowed to the record's own type.
    pub fn int_as<T: TryFrom<i64>>(&self, name: &str) -> Result<T, CodecError> {
        let value = self.int(name)?;
        T::try_from(value).map_err(|_| CodecError::OutOfRange {
            field: name.to_string(),
            value,
        })
    }

    pub fn text(&self, name: &str) -> Result<&str, CodecError> {
        match self.require(name)? {
            FieldValue::Text(value) => Ok(value),
            _ => Err(kind_mismatch(name, FieldKind::Text)),
        }
    }

    pub fn amount(&self, name: &str) -> Result<Amount, CodecError> {
        match self.require(name)? {
            FieldValue::Amount(value) => Ok(*value),
            _ => Err(kind_mismatch(name, FieldKind::Cents)),
        }
    }

    fn require(&self, name: &str) -> Result<&FieldValue, CodecError> {
        self.get(name)
            .ok_or_else(|| CodecError::MissingField(name.to_string()))
    }
}

fn kind_mismatch(name: &str, expected: FieldKind) -> CodecError {
    CodecError::KindMismatch {
        field: name.to_string(),
        expected,
    }
}

fn pad_number(spec: &FieldSpec, value: i64) -> Result<String, CodecError> {
    let width = spec.width();
    let rendered = if value < 0 {
        let digits = value.unsigned_abs().to_string();
        format!("-{digits:0>pad$}", pad = width.saturating_sub(1))
    } else {
        format!("{value:0>width$}")
    };

    if rendered.len() > width {
        return Err(CodecError::FieldOverflow {
            field: spec.name.to_string(),
            value,
            width,
        });
    }
    Ok(rendered)
}

fn parse_number(field: &str, raw: &str) -> Result<i64, CodecError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let invalid = || CodecError::InvalidNumber {
        field: field.to_string(),
        raw: raw.to_string(),
    };
    let digits = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid());
    }
    trimmed.parse::<i64>().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    static LAYOUT: Layout = Layout::new(&[
        FieldSpec::int("year", "ano", 1, 4),
        FieldSpec::text("uf", "uf", 5, 6),
        FieldSpec::cents("value", "valor", 7, 15),
    ]);

    #[test]
    fn decodes_implied_two_decimal_scale() {
        let fields = LAYOUT.decode("2025SP000012345").expect("decode");
        assert_eq!(fields.int("year").unwrap(), 2025);
        assert_eq!(fields.text("uf").unwrap(), "SP");
        let value = fields.amount("value").unwrap();
        assert_eq!(value.cents(), 12345);
        assert!((value.value() - 123.45).abs() < 1e-9);
    }

    #[test]
    fn encodes_with_producer_padding() {
        let fields = Fields::new()
            .with("year", 2025_i64)
            .with("uf", "M")
            .with("value", Amount::from_value(7.5));
        assert_eq!(LAYOUT.encode(&fields).unwrap(), "2025M 000000750");
    }

    #[test]
    fn negative_numbers_keep_sign_in_front() {
        let fields = Fields::new()
            .with("year", 2025_i64)
            .with("uf", "RJ")
            .with("value", Amount::from_value(-0.45));
        let line = LAYOUT.encode(&fields).unwrap();
        assert_eq!(line, "2025RJ-00000045");
        let decoded = LAYOUT.decode(&line).unwrap();
        assert_eq!(decoded.amount("value").unwrap().cents(), -45);
    }

    #[test]
    fn rejects_short_lines() {
        let err = LAYOUT.decode("2025SP0001").unwrap_err();
        assert_eq!(
            err,
            CodecError::LineTooShort {
                expected: 15,
                found: 10
            }
        );
    }

    #[test]
    fn rejects_non_numeric_columns() {
        let err = LAYOUT.decode("20X5SP000012345").unwrap_err();
        assert!(matches!(err, CodecError::InvalidNumber { ref field, .. } if field == "year"));
    }

    #[test]
    fn blank_numeric_column_reads_as_zero() {
        let fields = LAYOUT.decode("    SP000000001").unwrap();
        assert_eq!(fields.int("year").unwrap(), 0);
    }

    #[test]
    fn overflow_is_reported() {
        let fields = Fields::new()
            .with("year", 20251_i64)
            .with("uf", "SP")
            .with("value", Amount::from_cents(1));
        let err = LAYOUT.encode(&fields).unwrap_err();
        assert!(matches!(err, CodecError::FieldOverflow { width: 4, .. }));
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        static TEXT: Layout = Layout::new(&[
            FieldSpec::text("name", "nome", 1, 5),
            FieldSpec::int("code", "codigo", 6, 8),
        ]);
        let line = TEXT
            .encode(&Fields::new().with("name", "Saúde").with("code", 7_i64))
            .unwrap();
        assert_eq!(line, "Saúde007");
        let fields = TEXT.decode(&line).unwrap();
        assert_eq!(fields.text("name").unwrap(), "Saúde");
        assert_eq!(fields.int("code").unwrap(), 7);
    }
}
