//! Bind parameters and run compiled queries with sqlx.

use std::collections::BTreeMap;

use sqlx::any::{AnyArguments, AnyRow};
use sqlx::{Any, Column, Row};

use query_engine_metadata::metadata::ScalarType;
use query_engine_sql::sql::string::{Param, SQL};

use crate::error::{Error, QueryError};

/// A result row, keyed by the qualified selection names.
pub type RowMap = serde_json::Map<String, serde_json::Value>;

type Query<'q> = sqlx::query::Query<'q, Any, AnyArguments<'q>>;

/// Create a sqlx query from the SQL and bind every parameter in order.
///
/// Literals are bound as they are. Named parameters are looked up in `variables`.
pub fn build_query_with_params<'q>(
    query: &'q SQL,
    variables: &BTreeMap<String, serde_json::Value>,
) -> Result<Query<'q>, Error> {
    let initial_query = sqlx::query(&query.sql);
    query
        .params
        .iter()
        .try_fold(initial_query, |sqlx_query, param| match param {
            Param::Value(value) => bind_json(sqlx_query, "<literal>", value),
            Param::Variable(name) => match variables.get(name) {
                None => Err(Error::Query(QueryError::VariableNotFound(name.clone()))),
                Some(value) => bind_json(sqlx_query, name, value),
            },
        })
}

fn bind_json<'q>(
    sqlx_query: Query<'q>,
    name: &str,
    value: &serde_json::Value,
) -> Result<Query<'q>, Error> {
    match value {
        serde_json::Value::Null => Ok(sqlx_query.bind(None::<String>)),
        serde_json::Value::Bool(b) => Ok(sqlx_query.bind(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(sqlx_query.bind(i)),
            None => match n.as_f64() {
                Some(f) => Ok(sqlx_query.bind(f)),
                None => Err(unsupported(name, value)),
            },
        },
        serde_json::Value::String(s) => Ok(sqlx_query.bind(s.clone())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err(unsupported(name, value))
        }
    }
}

fn unsupported(name: &str, value: &serde_json::Value) -> Error {
    Error::Query(QueryError::UnsupportedVariableValue {
        name: name.to_string(),
        value: value.clone(),
    })
}

/// Run the query and collect every row. Columns listed in `column_types` are
/// decoded by their declared type.
pub async fn fetch_rows(
    pool: &sqlx::AnyPool,
    query: &SQL,
    variables: &BTreeMap<String, serde_json::Value>,
    column_types: &BTreeMap<String, ScalarType>,
) -> Result<Vec<RowMap>, Error> {
    let rows = build_query_with_params(query, variables)?
        .fetch_all(pool)
        .await?;
    rows.iter()
        .map(|row| row_to_json(row, column_types))
        .collect()
}

/// Run a `COUNT(*)` query and read its single column.
pub async fn fetch_count(
    pool: &sqlx::AnyPool,
    query: &SQL,
    variables: &BTreeMap<String, serde_json::Value>,
) -> Result<u64, Error> {
    let row = build_query_with_params(query, variables)?
        .fetch_one(pool)
        .await?;
    let count: i64 = row.try_get(0)?;
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Decode a row into a JSON object keyed by column name.
fn row_to_json(row: &AnyRow, column_types: &BTreeMap<String, ScalarType>) -> Result<RowMap, Error> {
    row.columns()
        .iter()
        .map(|column| {
            let index = column.ordinal();
            let value = match column_types.get(column.name()) {
                Some(ScalarType::Boolean) => decode_bool(row, index)?,
                _ => decode_value(row, index)?,
            };
            Ok((column.name().to_string(), value))
        })
        .collect()
}

/// Booleans come back as integers from databases without a boolean type.
fn decode_bool(row: &AnyRow, index: usize) -> Result<serde_json::Value, Error> {
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return Ok(value.map_or(serde_json::Value::Null, serde_json::Value::from));
    }
    let value = row.try_get::<Option<i64>, _>(index)?;
    Ok(value.map_or(serde_json::Value::Null, |i| serde_json::Value::from(i != 0)))
}

/// The database tells us the type of each value, so try the candidates in turn.
fn decode_value(row: &AnyRow, index: usize) -> Result<serde_json::Value, Error> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return Ok(value.map_or(serde_json::Value::Null, serde_json::Value::from));
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return Ok(value.map_or(serde_json::Value::Null, serde_json::Value::from));
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return Ok(value.map_or(serde_json::Value::Null, serde_json::Value::from));
    }
    let value = row.try_get::<Option<String>, _>(index)?;
    Ok(value.map_or(serde_json::Value::Null, serde_json::Value::from))
}
