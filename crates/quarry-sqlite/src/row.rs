//! Parameter binding and row extraction.

use quarry_core::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, TypeInfo, ValueRef};

use crate::error::Result;

pub(crate) type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Binds a [`Value`] to the next placeholder.
pub(crate) fn bind_value(query: SqliteQuery<'_>, value: Value) -> SqliteQuery<'_> {
    match value {
        Value::Null => query.bind(Option::<i64>::None),
        Value::Integer(i) => query.bind(i),
        Value::Real(f) => query.bind(f),
        Value::Text(s) => query.bind(s),
        Value::Blob(b) => query.bind(b),
    }
}

/// Binds every parameter in placeholder order.
pub(crate) fn bind_all(query: SqliteQuery<'_>, params: Vec<Value>) -> SqliteQuery<'_> {
    params.into_iter().fold(query, bind_value)
}

/// Reads the column at `index` by its stored type.
pub(crate) fn read_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_string();
    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get(index)?),
        "REAL" => Value::Real(row.try_get(index)?),
        "BLOB" => Value::Blob(row.try_get(index)?),
        _ => Value::Text(row.try_get(index)?),
    };
    Ok(value)
}

/// Reads every column of `row`, in result order.
pub(crate) fn read_row(row: &SqliteRow) -> Result<Vec<Value>> {
    (0..row.len()).map(|index| read_value(row, index)).collect()
}
