//! Proportional allocation over the cross-product of categorical dimensions.
//!
//! An [`AllocationPlan`] enumerates leaves; [`distribute`] turns a total in
//! integer units (cents or counts) into one part per leaf whose sum is exactly
//! the total. The rounding residual lands on one designated leaf.

use cadoc_core::{CategoryValue, DistributionTable, truncate_units};
use thiserror::Error;

/// Allocation failures. None of them occur with the shipped configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error("allocation plan has no dimensions")]
    EmptyPlan,
    #[error("dimension '{0}' has an empty distribution table")]
    EmptyTable(String),
    #[error("dimension '{dimension}' depends on '{parent}', which is not declared before it")]
    UnknownParent { dimension: String, parent: String },
    #[error("dimension '{dimension}' has no table for {parent} = {value}")]
    MissingCase {
        dimension: String,
        parent: String,
        value: String,
    },
    #[error("designated leaf {index} is out of range for {len} leaves")]
    DesignatedOutOfRange { index: usize, len: usize },
    #[error("leaf has no coordinate for dimension '{0}'")]
    MissingCoordinate(String),
    #[error("dimension '{dimension}' does not hold {expected} values")]
    CoordinateKind {
        dimension: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone)]
enum Dimension {
    Fixed {
        name: &'static str,
        table: DistributionTable,
    },
    /// Table chosen per leaf by the value of an earlier dimension.
    Conditional {
        name: &'static str,
        parent: &'static str,
        cases: Vec<(CategoryValue, DistributionTable)>,
    },
}

impl Dimension {
    fn name(&self) -> &'static str {
        match self {
            Dimension::Fixed { name, .. } | Dimension::Conditional { name, .. } => name,
        }
    }
}

/// Ordered dimensions; the first one is the outermost loop.
#[derive(Debug, Clone, Default)]
pub struct AllocationPlan {
    dimensions: Vec<Dimension>,
}

impl AllocationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension(mut self, name: &'static str, table: &DistributionTable) -> Self {
        self.dimensions.push(Dimension::Fixed {
            name,
            table: table.clone(),
        });
        self
    }

    pub fn conditional(
        mut self,
        name: &'static str,
        parent: &'static str,
        cases: Vec<(CategoryValue, &DistributionTable)>,
    ) -> Self {
        self.dimensions.push(Dimension::Conditional {
            name,
            parent,
            cases: cases
                .into_iter()
                .map(|(value, table)| (value, table.clone()))
                .collect(),
        });
        self
    }

    /// Enumerate the full cross-product in declared order.
    pub fn leaves(&self) -> Result<Vec<Leaf>, AllocationError> {
        if self.dimensions.is_empty() {
            return Err(AllocationError::EmptyPlan);
        }

        let mut leaves = vec![Leaf::root()];
        for (position, dimension) in self.dimensions.iter().enumerate() {
            if let Dimension::Conditional { name, parent, .. } = dimension {
                let declared = self.dimensions[..position]
                    .iter()
                    .any(|earlier| earlier.name() == *parent);
                if !declared {
                    return Err(AllocationError::UnknownParent {
                        dimension: name.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }

            let mut next = Vec::with_capacity(leaves.len());
            for leaf in &leaves {
                let table = resolve_table(dimension, leaf)?;
                if table.is_empty() {
                    return Err(AllocationError::EmptyTable(dimension.name().to_string()));
                }
                for entry in table.entries() {
                    next.push(leaf.extend(
                        dimension.name(),
                        entry.value.clone(),
                        entry.proportion,
                        entry.adjustment,
                    ));
                }
            }
            leaves = next;
        }
        Ok(leaves)
    }
}

fn resolve_table<'a>(
    dimension: &'a Dimension,
    leaf: &Leaf,
) -> Result<&'a DistributionTable, AllocationError> {
    match dimension {
        Dimension::Fixed { table, .. } => Ok(table),
        Dimension::Conditional {
            name,
            parent,
            cases,
        } => {
            let value = leaf.value(parent)?;
            cases
                .iter()
                .find(|(case, _)| case == value)
                .map(|(_, table)| table)
                .ok_or_else(|| AllocationError::MissingCase {
                    dimension: name.to_string(),
                    parent: parent.to_string(),
                    value: value.to_string(),
                })
        }
    }
}

/// One cross-product combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    coordinates: Vec<(&'static str, CategoryValue)>,
    share: f64,
    adjustment: f64,
}

impl Leaf {
    fn root() -> Self {
        Self {
            coordinates: Vec::new(),
            share: 1.0,
            adjustment: 0.0,
        }
    }

    fn extend(
        &self,
        dimension: &'static str,
        value: CategoryValue,
        proportion: f64,
        adjustment: f64,
    ) -> Self {
        let mut coordinates = self.coordinates.clone();
        coordinates.push((dimension, value));
        Self {
            coordinates,
            share: self.share * proportion,
            adjustment: self.adjustment + adjustment,
        }
    }

    /// Product of the proportions along the path.
    pub fn share(&self) -> f64 {
        self.share
    }

    /// Sum of the adjustments along the path.
    pub fn adjustment(&self) -> f64 {
        self.adjustment
    }

    pub fn coordinates(&self) -> &[(&'static str, CategoryValue)] {
        &self.coordinates
    }

    pub fn value(&self, dimension: &str) -> Result<&CategoryValue, AllocationError> {
        self.coordinates
            .iter()
            .find(|(name, _)| *name == dimension)
            .map(|(_, value)| value)
            .ok_or_else(|| AllocationError::MissingCoordinate(dimension.to_string()))
    }

    pub fn int(&self, dimension: &str) -> Result<i64, AllocationError> {
        self.value(dimension)?
            .as_int()
            .ok_or_else(|| AllocationError::CoordinateKind {
                dimension: dimension.to_string(),
                expected: "integer",
            })
    }

    /// Integer coordinate narrowed to an `i32` record field.
    pub fn int32(&self, dimension: &str) -> Result<i32, AllocationError> {
        i32::try_from(self.int(dimension)?).map_err(|_| AllocationError::CoordinateKind {
            dimension: dimension.to_string(),
            expected: "32-bit integer",
        })
    }

    pub fn text(&self, dimension: &str) -> Result<&str, AllocationError> {
        self.value(dimension)?
            .as_text()
            .ok_or_else(|| AllocationError::CoordinateKind {
                dimension: dimension.to_string(),
                expected: "text",
            })
    }
}

/// How a fractional share of units is quantised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Half away from zero; used for money.
    Nearest,
    /// Toward zero after discarding float noise; used for counts.
    Floor,
}

impl Rounding {
    fn apply(self, value: f64) -> i64 {
        match self {
            Rounding::Nearest => value.round() as i64,
            Rounding::Floor => truncate_units(value),
        }
    }
}

/// Leaf that absorbs the rounding residual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Designated {
    First,
    Second,
}

impl Designated {
    pub fn index(self) -> usize {
        match self {
            Designated::First => 0,
            Designated::Second => 1,
        }
    }
}

/// Integer parts of one total, one per share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    parts: Vec<i64>,
    pure: Vec<i64>,
    residual: i64,
    designated: usize,
}

impl Distribution {
    /// Corrected parts; they sum to the total.
    pub fn parts(&self) -> &[i64] {
        &self.parts
    }

    pub fn part(&self, index: usize) -> i64 {
        self.parts[index]
    }

    /// Part before the residual was applied.
    pub fn pure(&self, index: usize) -> i64 {
        self.pure[index]
    }

    pub fn residual(&self) -> i64 {
        self.residual
    }

    pub fn designated(&self) -> usize {
        self.designated
    }

    pub fn total(&self) -> i64 {
        self.parts.iter().sum()
    }
}

/// Split `total` units by `shares` and move the residual onto the designated
/// part.
pub fn distribute(
    total: i64,
    shares: &[f64],
    rounding: Rounding,
    designated: Designated,
) -> Result<Distribution, AllocationError> {
    let index = designated.index();
    if index >= shares.len() {
        return Err(AllocationError::DesignatedOutOfRange {
            index,
            len: shares.len(),
        });
    }

    let pure: Vec<i64> = shares
        .iter()
        .map(|share| rounding.apply(total as f64 * share))
        .collect();
    let residual = total - pure.iter().sum::<i64>();
    let mut parts = pure.clone();
    parts[index] += residual;

    Ok(Distribution {
        parts,
        pure,
        residual,
        designated: index,
    })
}

/// Transactions implied by a value in cents at the given average ticket.
pub fn quantity_for(cents: i64, average_ticket: f64) -> i64 {
    truncate_units(cents as f64 / 100.0 / average_ticket)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brands() -> DistributionTable {
        DistributionTable::texts(&[("A", 0.6), ("B", 0.4)])
    }

    fn functions() -> DistributionTable {
        DistributionTable::texts(&[("D", 0.7), ("C", 0.3)])
    }

    #[test]
    fn two_level_split_is_exact() {
        let leaves = AllocationPlan::new()
            .dimension("brand", &brands())
            .dimension("function", &functions())
            .leaves()
            .unwrap();
        let shares: Vec<f64> = leaves.iter().map(Leaf::share).collect();
        let split = distribute(100_000, &shares, Rounding::Nearest, Designated::First).unwrap();

        assert_eq!(split.parts(), &[42_000, 18_000, 28_000, 12_000]);
        assert_eq!(split.residual(), 0);
        assert_eq!(leaves[1].text("brand").unwrap(), "A");
        assert_eq!(leaves[1].text("function").unwrap(), "C");
        assert_eq!(leaves[2].text("brand").unwrap(), "B");
    }

    #[test]
    fn residual_goes_to_designated_leaf() {
        let shares = [1.0 / 3.0; 3];
        let split = distribute(100, &shares, Rounding::Floor, Designated::Second).unwrap();
        assert_eq!(split.parts(), &[33, 34, 33]);
        assert_eq!(split.pure(1), 33);
        assert_eq!(split.residual(), 1);
        assert_eq!(split.total(), 100);
    }

    #[test]
    fn incomplete_table_is_absorbed() {
        let products = DistributionTable::ints(&[(32, 0.5), (33, 0.3), (34, 0.1)]);
        let leaves = AllocationPlan::new()
            .dimension("product", &products)
            .leaves()
            .unwrap();
        let shares: Vec<f64> = leaves.iter().map(Leaf::share).collect();
        let split = distribute(1_000, &shares, Rounding::Nearest, Designated::First).unwrap();
        assert_eq!(split.parts(), &[600, 300, 100]);
        assert_eq!(split.total(), 1_000);
    }

    #[test]
    fn conditional_dimension_follows_parent() {
        let debit = DistributionTable::ints_adjusted(&[(1, 1.0, -0.5)]);
        let credit = DistributionTable::ints_adjusted(&[(1, 0.6, 0.0), (2, 0.4, 1.1)]);
        let leaves = AllocationPlan::new()
            .dimension("function", &functions())
            .conditional(
                "installments",
                "function",
                vec![(CategoryValue::from("D"), &debit), (CategoryValue::from("C"), &credit)],
            )
            .leaves()
            .unwrap();

        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[0].adjustment(), -0.5);
        assert_eq!(leaves[2].int("installments").unwrap(), 2);
        assert!((leaves[2].share() - 0.12).abs() < 1e-12);
        assert!((leaves.iter().map(Leaf::share).sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_plans_are_rejected() {
        assert_eq!(AllocationPlan::new().leaves(), Err(AllocationError::EmptyPlan));

        let err = AllocationPlan::new()
            .dimension("brand", &DistributionTable::default())
            .leaves()
            .unwrap_err();
        assert_eq!(err, AllocationError::EmptyTable("brand".to_string()));

        let err = AllocationPlan::new()
            .conditional("installments", "function", Vec::new())
            .leaves()
            .unwrap_err();
        assert!(matches!(err, AllocationError::UnknownParent { .. }));

        let err = AllocationPlan::new()
            .dimension("function", &functions())
            .conditional("installments", "function", Vec::new())
            .leaves()
            .unwrap_err();
        assert!(matches!(err, AllocationError::MissingCase { .. }));

        assert_eq!(
            distribute(10, &[1.0], Rounding::Floor, Designated::Second),
            Err(AllocationError::DesignatedOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn quantity_truncates() {
        assert_eq!(quantity_for(15_000, 150.0), 1);
        assert_eq!(quantity_for(14_999, 150.0), 0);
        assert_eq!(quantity_for(4_500_000, 150.0), 300);
    }
}
