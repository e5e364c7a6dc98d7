use std::time::Duration;

use async_trait::async_trait;
use cadoc_core::{Amount, EntityKind, FieldKind, Fields};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::repository::{FindOptions, Repository};

mod queries;

pub use queries::{BindValue, SelectQuery, build_select};

/// Repository backed by PostgreSQL tables named after each entity kind.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a repository using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a small pool.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;
        info!(url = %redact_url(url), "connected to postgres");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn find_all(
        &self,
        kind: EntityKind,
        options: &FindOptions,
    ) -> Result<Vec<Fields>, StoreError> {
        let select = build_select(kind, options)?;
        debug!(entity = %kind, sql = %select.sql, "querying records");

        let mut query = sqlx::query(&select.sql);
        for bind in &select.binds {
            query = match bind {
                BindValue::Int(value) => query.bind(*value),
                BindValue::Text(value) => query.bind(value.clone()),
            };
        }
        let rows = query.fetch_all(&self.pool).await?;
        let fields = rows
            .iter()
            .map(|row| map_row(kind, row))
            .collect::<Result<Vec<_>, _>>()?;
        info!(entity = %kind, rows = fields.len(), "records fetched");
        Ok(fields)
    }

    async fn store(&self, statements: &[String]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;
        for statement in statements {
            affected += sqlx::query(statement)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        info!(statements = statements.len(), rows = affected, "records stored");
        Ok(affected)
    }
}

fn map_row(kind: EntityKind, row: &PgRow) -> Result<Fields, StoreError> {
    let mut fields = Fields::new();
    for spec in kind.layout().fields() {
        match spec.kind {
            FieldKind::Int => fields.push(spec.name, row.try_get::<i64, _>(spec.name)?),
            FieldKind::Text => {
                let text: String = row.try_get(spec.name)?;
                fields.push(spec.name, text.trim_end().to_string());
            }
            FieldKind::Cents => fields.push(
                spec.name,
                Amount::from_cents(row.try_get::<i64, _>(spec.name)?),
            ),
        }
    }
    Ok(fields)
}

/// Hide the password of a connection URL.
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let Some(at) = rest.find('@') else {
        return url.to_string();
    };
    match rest[..at].find(':') {
        Some(colon) => format!(
            "{}{}:***{}",
            &url[..scheme_end + 3],
            &rest[..colon],
            &rest[at..]
        ),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_passwords_only() {
        assert_eq!(
            redact_url("postgres://cadoc:s3cret@db:5432/cadoc"),
            "postgres://cadoc:***@db:5432/cadoc"
        );
        assert_eq!(
            redact_url("postgres://cadoc@db/cadoc"),
            "postgres://cadoc@db/cadoc"
        );
        assert_eq!(redact_url("not a url"), "not a url");
    }
}
