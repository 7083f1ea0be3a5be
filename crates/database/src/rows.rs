use crate::error::DbError;
use core_types::{ResultRow, Value};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

/// The Postgres column types a query may project. Queries format their dates
/// with `TO_CHAR`, so only text and numeric types are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
}

impl ColumnKind {
    fn from_type_name(column: &str, type_name: &str) -> Result<Self, DbError> {
        let kind = match type_name {
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => ColumnKind::Text,
            "INT2" => ColumnKind::Int2,
            "INT4" => ColumnKind::Int4,
            "INT8" => ColumnKind::Int8,
            "FLOAT4" => ColumnKind::Float4,
            "FLOAT8" => ColumnKind::Float8,
            "NUMERIC" => ColumnKind::Numeric,
            other => {
                return Err(DbError::UnsupportedColumnType {
                    column: column.to_string(),
                    type_name: other.to_string(),
                });
            }
        };
        Ok(kind)
    }
}

/// SQL `NULL` becomes `Value::Null`.
fn nullable<T>(value: Option<T>, wrap: impl FnOnce(T) -> Value) -> Value {
    value.map(wrap).unwrap_or(Value::Null)
}

fn decode_column(row: &PgRow, index: usize, kind: ColumnKind) -> Result<Value, DbError> {
    let value = match kind {
        ColumnKind::Text => nullable(row.try_get::<Option<String>, _>(index)?, Value::Text),
        ColumnKind::Int2 => nullable(row.try_get::<Option<i16>, _>(index)?, |v| {
            Value::Int(v.into())
        }),
        ColumnKind::Int4 => nullable(row.try_get::<Option<i32>, _>(index)?, |v| {
            Value::Int(v.into())
        }),
        ColumnKind::Int8 => nullable(row.try_get::<Option<i64>, _>(index)?, Value::Int),
        ColumnKind::Float4 => nullable(row.try_get::<Option<f32>, _>(index)?, |v| {
            Value::Float(v.into())
        }),
        ColumnKind::Float8 => nullable(row.try_get::<Option<f64>, _>(index)?, Value::Float),
        ColumnKind::Numeric => {
            nullable(row.try_get::<Option<Decimal>, _>(index)?, Value::Decimal)
        }
    };
    Ok(value)
}

/// Decodes every column of `row` into a typed `Value`, keeping column order.
pub fn decode_row(row: &PgRow) -> Result<ResultRow, DbError> {
    let mut values = Vec::with_capacity(row.len());
    for column in row.columns() {
        let kind = ColumnKind::from_type_name(column.name(), column.type_info().name())?;
        values.push(decode_column(row, column.ordinal(), kind)?);
    }
    Ok(ResultRow::new(values))
}
