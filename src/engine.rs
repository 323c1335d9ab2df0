//! Database execution for compiled queries.
//!
//! Every call opens its own connection, runs one statement and closes the
//! connection again: no pool, no retry. Driver errors are passed up with
//! the driver message untouched.
//!
//! PostgreSQL and MySQL go through their native sqlx drivers so that every
//! common column type can be read. SQL Server is a recognised dialect but
//! has no driver here.

use crate::ast::{QueryDescription, Row, SqlValue};
use crate::config::{ConnectionConfig, redact};
use crate::dialect::Dialect;
use crate::error::{BuilderError, BuilderResult};
use crate::transpiler::compile;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::types::{Decimal, Uuid};
use sqlx::{Column, Connection, Row as DbRow, TypeInfo};

/// Rows fetched when previewing a mapping.
pub const PREVIEW_LIMIT: u32 = 5;

/// Run `sql` and return its rows.
pub async fn execute(conn: &ConnectionConfig, sql: &str) -> BuilderResult<Vec<Row>> {
    let mut db = connect(conn).await?;
    tracing::debug!(%sql, "executing query");

    let result = db.fetch(sql).await;
    db.close().await;

    let rows = result?;
    tracing::info!(rows = rows.len(), "query returned");
    Ok(rows)
}

/// Compile `query` with the preview limit and run it.
///
/// Returns the SQL that was sent along with the sample rows.
pub async fn preview(
    conn: &ConnectionConfig,
    query: &QueryDescription,
) -> BuilderResult<(String, Vec<Row>)> {
    let sql = compile(query, Some(PREVIEW_LIMIT))?;
    let rows = execute(conn, &sql).await?;
    Ok((sql, rows))
}

/// Ask the database to plan `sql` without running it.
pub async fn explain(conn: &ConnectionConfig, sql: &str) -> BuilderResult<()> {
    let plan = conn.dialect.explain(sql);
    execute(conn, &plan).await.map(|_| ())
}

/// Open one connection for `conn`.
pub async fn connect(conn: &ConnectionConfig) -> BuilderResult<DbConnection> {
    if conn.dialect == Dialect::Mssql {
        return Err(no_mssql_driver());
    }
    let url = conn.to_url()?;

    tracing::info!(dialect = %conn.dialect, url = %redact(&url), "connecting");
    let db = match conn.dialect {
        Dialect::Postgresql => PgConnection::connect(&url).await.map(DbConnection::Postgres),
        Dialect::Mysql => MySqlConnection::connect(&url).await.map(DbConnection::MySql),
        Dialect::Mssql => return Err(no_mssql_driver()),
    };
    db.map_err(|e| BuilderError::Connection(driver_message(&e)))
}

fn no_mssql_driver() -> BuilderError {
    BuilderError::UnsupportedDialect(
        "mssql: no SQL Server driver is available for execution".to_string(),
    )
}

/// A live connection to one of the servers with a driver.
pub enum DbConnection {
    Postgres(PgConnection),
    MySql(MySqlConnection),
}

impl DbConnection {
    /// Run one statement and convert every row.
    pub async fn fetch(&mut self, sql: &str) -> BuilderResult<Vec<Row>> {
        match self {
            DbConnection::Postgres(db) => {
                let rows = sqlx::query(sql)
                    .fetch_all(&mut *db)
                    .await
                    .map_err(execution_error)?;
                rows.iter()
                    .map(|row| row_to_map(row, ColumnKind::postgres, postgres_value))
                    .collect()
            }
            DbConnection::MySql(db) => {
                let rows = sqlx::query(sql)
                    .fetch_all(&mut *db)
                    .await
                    .map_err(execution_error)?;
                rows.iter()
                    .map(|row| row_to_map(row, ColumnKind::mysql, mysql_value))
                    .collect()
            }
        }
    }

    pub async fn close(self) {
        let result = match self {
            DbConnection::Postgres(db) => db.close().await,
            DbConnection::MySql(db) => db.close().await,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to close connection cleanly");
        }
    }
}

fn execution_error(e: sqlx::Error) -> BuilderError {
    BuilderError::Execution(driver_message(&e))
}

/// The database's own message when there is one, sqlx's otherwise.
fn driver_message(e: &sqlx::Error) -> String {
    match e {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}

/// How a column is read, chosen from the driver's type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Bool,
    SmallInt,
    Int,
    BigInt,
    Unsigned,
    Real,
    Double,
    Decimal,
    Text,
    Bytes,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    BoolArray,
    IntArray,
    BigIntArray,
    DoubleArray,
    TextArray,
}

impl ColumnKind {
    fn postgres(type_name: &str) -> Self {
        match type_name {
            "VOID" => Self::Null,
            "BOOL" => Self::Bool,
            "INT2" => Self::SmallInt,
            "INT4" => Self::Int,
            "INT8" => Self::BigInt,
            "FLOAT4" => Self::Real,
            "FLOAT8" => Self::Double,
            "NUMERIC" => Self::Decimal,
            "BYTEA" => Self::Bytes,
            "UUID" => Self::Uuid,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "TIMESTAMP" => Self::Timestamp,
            "TIMESTAMPTZ" => Self::TimestampTz,
            "JSON" | "JSONB" => Self::Json,
            "BOOL[]" => Self::BoolArray,
            "INT4[]" => Self::IntArray,
            "INT8[]" => Self::BigIntArray,
            "FLOAT8[]" => Self::DoubleArray,
            "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => Self::TextArray,
            _ => Self::Text,
        }
    }

    fn mysql(type_name: &str) -> Self {
        match type_name {
            "NULL" => Self::Null,
            "BOOLEAN" => Self::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => Self::BigInt,
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => Self::Unsigned,
            "FLOAT" => Self::Real,
            "DOUBLE" => Self::Double,
            "DECIMAL" => Self::Decimal,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
                Self::Bytes
            }
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" => Self::Timestamp,
            "TIMESTAMP" => Self::TimestampTz,
            "JSON" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Convert a driver row to a flat row, failing on the first column that
/// does not decode.
fn row_to_map<R, F>(row: &R, classify: fn(&str) -> ColumnKind, read: F) -> BuilderResult<Row>
where
    R: DbRow,
    F: Fn(&R, usize, ColumnKind) -> Result<SqlValue, sqlx::Error>,
{
    let mut map = Row::with_capacity(row.columns().len());

    for (i, column) in row.columns().iter().enumerate() {
        let type_name = column.type_info().name();
        let value = read(row, i, classify(type_name)).map_err(|e| {
            BuilderError::Execution(format!(
                "column '{}' ({}): {}",
                column.name(),
                type_name,
                driver_message(&e)
            ))
        })?;
        map.insert(column.name().to_string(), value);
    }

    Ok(map)
}

fn postgres_value(row: &PgRow, i: usize, kind: ColumnKind) -> Result<SqlValue, sqlx::Error> {
    let value: SqlValue = match kind {
        ColumnKind::Null => SqlValue::Null,
        ColumnKind::Bool => row.try_get::<Option<bool>, _>(i)?.into(),
        ColumnKind::SmallInt => row.try_get::<Option<i16>, _>(i)?.map(i64::from).into(),
        ColumnKind::Int => row.try_get::<Option<i32>, _>(i)?.into(),
        ColumnKind::BigInt => row.try_get::<Option<i64>, _>(i)?.into(),
        ColumnKind::Real => row.try_get::<Option<f32>, _>(i)?.map(f64::from).into(),
        ColumnKind::Double => row.try_get::<Option<f64>, _>(i)?.into(),
        ColumnKind::Decimal => row
            .try_get::<Option<Decimal>, _>(i)?
            .map(|d| d.to_string())
            .into(),
        ColumnKind::Bytes => row.try_get::<Option<Vec<u8>>, _>(i)?.map(bytes_text).into(),
        ColumnKind::Uuid => row.try_get::<Option<Uuid>, _>(i)?.map(|u| u.to_string()).into(),
        ColumnKind::Date => row
            .try_get::<Option<NaiveDate>, _>(i)?
            .and_then(midnight_utc)
            .into(),
        ColumnKind::Time => row
            .try_get::<Option<NaiveTime>, _>(i)?
            .map(|t| t.to_string())
            .into(),
        ColumnKind::Timestamp => row
            .try_get::<Option<NaiveDateTime>, _>(i)?
            .map(|dt| Utc.from_utc_datetime(&dt))
            .into(),
        ColumnKind::TimestampTz => row.try_get::<Option<DateTime<Utc>>, _>(i)?.into(),
        ColumnKind::Json => row.try_get::<Option<JsonValue>, _>(i)?.into(),
        ColumnKind::BoolArray => row.try_get::<Option<Vec<bool>>, _>(i)?.map(array).into(),
        ColumnKind::IntArray => row.try_get::<Option<Vec<i32>>, _>(i)?.map(array).into(),
        ColumnKind::BigIntArray => row.try_get::<Option<Vec<i64>>, _>(i)?.map(array).into(),
        ColumnKind::DoubleArray => row.try_get::<Option<Vec<f64>>, _>(i)?.map(array).into(),
        ColumnKind::TextArray => row.try_get::<Option<Vec<String>>, _>(i)?.map(array).into(),
        ColumnKind::Unsigned | ColumnKind::Text => row.try_get::<Option<String>, _>(i)?.into(),
    };
    Ok(value)
}

fn mysql_value(row: &MySqlRow, i: usize, kind: ColumnKind) -> Result<SqlValue, sqlx::Error> {
    let value: SqlValue = match kind {
        ColumnKind::Null => SqlValue::Null,
        ColumnKind::Bool => row.try_get::<Option<bool>, _>(i)?.into(),
        ColumnKind::SmallInt | ColumnKind::Int | ColumnKind::BigInt => {
            row.try_get::<Option<i64>, _>(i)?.into()
        }
        ColumnKind::Unsigned => row.try_get::<Option<u64>, _>(i)?.map(unsigned).into(),
        ColumnKind::Real => row.try_get::<Option<f32>, _>(i)?.map(f64::from).into(),
        ColumnKind::Double => row.try_get::<Option<f64>, _>(i)?.into(),
        ColumnKind::Decimal => row
            .try_get::<Option<Decimal>, _>(i)?
            .map(|d| d.to_string())
            .into(),
        ColumnKind::Bytes => row.try_get::<Option<Vec<u8>>, _>(i)?.map(bytes_text).into(),
        ColumnKind::Date => row
            .try_get::<Option<NaiveDate>, _>(i)?
            .and_then(midnight_utc)
            .into(),
        ColumnKind::Time => row
            .try_get::<Option<NaiveTime>, _>(i)?
            .map(|t| t.to_string())
            .into(),
        ColumnKind::Timestamp => row
            .try_get::<Option<NaiveDateTime>, _>(i)?
            .map(|dt| Utc.from_utc_datetime(&dt))
            .into(),
        ColumnKind::TimestampTz => row.try_get::<Option<DateTime<Utc>>, _>(i)?.into(),
        ColumnKind::Json => row.try_get::<Option<JsonValue>, _>(i)?.into(),
        // MySQL has no array or uuid column types.
        ColumnKind::Uuid
        | ColumnKind::BoolArray
        | ColumnKind::IntArray
        | ColumnKind::BigIntArray
        | ColumnKind::DoubleArray
        | ColumnKind::TextArray
        | ColumnKind::Text => row.try_get::<Option<String>, _>(i)?.into(),
    };
    Ok(value)
}

/// Dates carry no zone; they are read as midnight UTC.
fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt))
}

/// Unsigned values past `i64::MAX` fall back to a float.
fn unsigned(n: u64) -> SqlValue {
    i64::try_from(n).map_or(SqlValue::Float(n as f64), SqlValue::Int)
}

fn bytes_text(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

fn array<T: Into<JsonValue>>(items: Vec<T>) -> SqlValue {
    SqlValue::Json(JsonValue::from(items))
}
