use cadoc_core::{EntityKind, FieldKind, FieldSpec, FieldValue};

use crate::error::StoreError;
use crate::repository::FindOptions;

/// Value bound to a positional parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Int(i64),
    Text(String),
}

/// SQL text plus the values for its `$n` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// Expression that normalises a stored column to the codec's shape.
fn projection(spec: &FieldSpec) -> String {
    match spec.kind {
        FieldKind::Int => format!("{}::bigint", spec.column),
        FieldKind::Text => format!("{}::text", spec.column),
        FieldKind::Cents => format!("trunc({} * 100)::bigint", spec.column),
    }
}

/// Build the select for `kind`. Filter columns must belong to the layout;
/// filter values are bound, never inlined.
pub fn build_select(kind: EntityKind, options: &FindOptions) -> Result<SelectQuery, StoreError> {
    let layout = kind.layout();
    let table = kind.table_name();

    let columns: Vec<String> = layout
        .fields()
        .iter()
        .map(|spec| format!("{} AS \"{}\"", projection(spec), spec.name))
        .collect();
    let mut sql = format!("SELECT {} FROM {table}", columns.join(", "));

    let mut binds = Vec::with_capacity(options.filters.len());
    let mut predicates = Vec::with_capacity(options.filters.len());
    for filter in &options.filters {
        let spec = layout
            .field_by_column(&filter.column)
            .ok_or_else(|| StoreError::UnknownColumn {
                table,
                column: filter.column.clone(),
            })?;
        let bind = match (spec.kind, &filter.value) {
            (FieldKind::Int, FieldValue::Int(value)) => BindValue::Int(*value),
            (FieldKind::Text, FieldValue::Text(value)) => BindValue::Text(value.clone()),
            (FieldKind::Cents, FieldValue::Amount(value)) => BindValue::Int(value.cents()),
            (FieldKind::Cents, FieldValue::Int(cents)) => BindValue::Int(*cents),
            (expected, _) => {
                return Err(StoreError::FilterType {
                    column: spec.column,
                    expected,
                });
            }
        };
        binds.push(bind);
        predicates.push(format!("{} = ${}", projection(spec), binds.len()));
    }
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    if let Some(limit) = options.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = options.offset {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
    Ok(SelectQuery { sql, binds })
}
