//! Persistence of cadoc records.

pub mod error;
pub mod postgres;
pub mod repository;

pub use error::StoreError;
pub use postgres::{BindValue, PostgresRepository, SelectQuery, build_select, redact_url};
pub use repository::{Filter, FindOptions, Repository, find_records, store_records};
