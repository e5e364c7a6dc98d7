use async_trait::async_trait;

use cadoc_core::{EntityKind, FieldValue, Fields, Record};

use crate::error::StoreError;

/// Equality filter on one layout column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column name as stored, e.g. `bandeira`.
    pub column: String,
    pub value: FieldValue,
}

impl Filter {
    pub fn new(column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Paging and filtering for [`Repository::find_all`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub filters: Vec<Filter>,
}

impl FindOptions {
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.push(Filter::new(column, value));
        self
    }
}

/// Persisted report records, one table per entity kind.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Fetch rows of `kind` in layout shape; monetary columns arrive as cents.
    async fn find_all(&self, kind: EntityKind, options: &FindOptions)
        -> Result<Vec<Fields>, StoreError>;

    /// Execute `statements` in one transaction, returning affected rows.
    async fn store(&self, statements: &[String]) -> Result<u64, StoreError>;
}

/// Fetch and map rows into typed records.
pub async fn find_records<R, P>(repository: &P, options: &FindOptions) -> Result<Vec<R>, StoreError>
where
    R: Record,
    P: Repository + ?Sized,
{
    let rows = repository.find_all(R::KIND, options).await?;
    rows.iter()
        .map(|row| R::from_fields(row).map_err(StoreError::from))
        .collect()
}

/// Insert `records` into their table.
pub async fn store_records<R, P>(repository: &P, records: &[R]) -> Result<u64, StoreError>
where
    R: Record,
    P: Repository + ?Sized,
{
    let statements: Vec<String> = records.iter().map(Record::insert_statement).collect();
    repository.store(&statements).await
}
