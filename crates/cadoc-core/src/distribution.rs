use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Categorical value of one dimension: a numeric code or a text code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CategoryValue {
    Int(i64),
    Text(String),
}

impl CategoryValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CategoryValue::Int(value) => Some(*value),
            CategoryValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CategoryValue::Text(value) => Some(value),
            CategoryValue::Int(_) => None,
        }
    }
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Int(value) => write!(f, "{value}"),
            CategoryValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for CategoryValue {
    fn from(value: i64) -> Self {
        CategoryValue::Int(value)
    }
}

impl From<&str> for CategoryValue {
    fn from(value: &str) -> Self {
        CategoryValue::Text(value.to_string())
    }
}

/// One (value, proportion) pair. `adjustment` carries an additive offset tied
/// to the value, such as the fee surcharge of an installment count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DistributionEntry {
    pub value: CategoryValue,
    pub proportion: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub adjustment: f64,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// Ordered distribution of one dimension. Proportions are expected to sum to
/// 1.0; nothing enforces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DistributionTable {
    entries: Vec<DistributionEntry>,
}

impl DistributionTable {
    pub fn new(entries: Vec<DistributionEntry>) -> Self {
        Self { entries }
    }

    pub fn ints(pairs: &[(i64, f64)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(value, proportion)| DistributionEntry {
                    value: CategoryValue::Int(*value),
                    proportion: *proportion,
                    adjustment: 0.0,
                })
                .collect(),
        )
    }

    pub fn texts(pairs: &[(&str, f64)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(value, proportion)| DistributionEntry {
                    value: CategoryValue::from(*value),
                    proportion: *proportion,
                    adjustment: 0.0,
                })
                .collect(),
        )
    }

    /// Integer-valued table whose entries each carry an adjustment.
    pub fn ints_adjusted(triples: &[(i64, f64, f64)]) -> Self {
        Self::new(
            triples
                .iter()
                .map(|(value, proportion, adjustment)| DistributionEntry {
                    value: CategoryValue::Int(*value),
                    proportion: *proportion,
                    adjustment: *adjustment,
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[DistributionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &CategoryValue> {
        self.entries.iter().map(|entry| &entry.value)
    }

    pub fn proportions(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.proportion).collect()
    }

    pub fn proportion_sum(&self) -> f64 {
        self.entries.iter().map(|entry| entry.proportion).sum()
    }

    /// True when the proportions add up to 1.0 within `tolerance`.
    pub fn partitions_unity(&self, tolerance: f64) -> bool {
        (self.proportion_sum() - 1.0).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_tables_that_do_not_partition() {
        let brands = DistributionTable::ints(&[(1, 0.5), (2, 0.3), (8, 0.2)]);
        assert!(brands.partitions_unity(1e-9));

        let products = DistributionTable::ints(&[(32, 0.5), (33, 0.3), (34, 0.1), (35, 0.05)]);
        assert!(!products.partitions_unity(1e-6));
    }

    #[test]
    fn serializes_as_plain_list() {
        let table = DistributionTable::texts(&[("D", 0.7), ("C", 0.3)]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"[{"value":"D","proportion":0.7},{"value":"C","proportion":0.3}]"#
        );
        let back: DistributionTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
