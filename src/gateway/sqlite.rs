//! SQLite-backed row source.
//!
//! Columns are decoded by their SQLite storage class into untyped JSON values;
//! semantic typing happens in ingestion, like for uploaded payloads.

use std::str::FromStr;

use serde_json::Value;
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _, sqlite::SqliteRow};
use tracing::error;

use super::{NamedQuery, Row, RowSource};

pub struct Database {
    pool: sqlx::SqlitePool,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("sqlite error: {0}")]
    Sqlite(sqlx::Error),
}

pub struct Client {
    pool: sqlx::SqlitePool,
}

impl Database {
    /// Create a pool without connecting. Connection failures surface on the
    /// first query.
    pub fn connect_lazy(url: &str) -> Result<Self, sqlx::Error> {
        let options = sqlx::sqlite::SqliteConnectOptions::from_str(url)
            .inspect_err(|error| error!(%error, %url, "Invalid database url"))?;
        let pool = sqlx::pool::PoolOptions::<sqlx::Sqlite>::new()
            .max_connections(1)
            .connect_lazy_with(options);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }

    pub fn client(&self) -> Client {
        Client {
            pool: self.pool.clone(),
        }
    }
}

fn decode_row(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    row.columns()
        .iter()
        .map(|column| -> Result<(String, Value), sqlx::Error> {
            let index = column.ordinal();
            let raw = row.try_get_raw(index)?;
            let value = if raw.is_null() {
                Value::Null
            } else {
                match raw.type_info().name() {
                    "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
                    "REAL" => Value::from(row.try_get::<f64, _>(index)?),
                    "BLOB" => Value::String(
                        String::from_utf8_lossy(&row.try_get::<Vec<u8>, _>(index)?).into_owned(),
                    ),
                    _ => Value::String(row.try_get::<String, _>(index)?),
                }
            };
            Ok((column.name().to_owned(), value))
        })
        .collect()
}

impl RowSource for Client {
    type Error = Error;

    async fn execute_named_query(&self, query: NamedQuery) -> Result<Vec<Row>, Self::Error> {
        let rows = sqlx::query(query.statement())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Sqlite)?;
        rows.iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::Sqlite)
    }
}
