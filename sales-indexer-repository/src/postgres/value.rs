//! Rendering PostgreSQL values as text fields.

use sqlx::postgres::{PgRow, Postgres};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::{Column, Decode, Row, Type, TypeInfo};

use crate::errors::SourceError;
use sales_indexer_shared::Field;

/// Render column `index` of `row` as text. SQL `NULL` becomes `None`.
///
/// Numeric types keep their exact textual value (`NUMERIC` keeps its
/// scale, so `12.50` stays `12.50`). Whole floats keep one fractional
/// digit (`10.0`, not `10`). Dates render as `YYYY-MM-DD` and
/// timestamps as `YYYY-MM-DD HH:MM:SS[.f]`, with a `+HH:MM` offset for
/// `TIMESTAMPTZ`.
pub(crate) fn render_column(row: &PgRow, index: usize) -> Result<Field, SourceError> {
    let column = &row.columns()[index];
    let name = column.name();

    match column.type_info().name() {
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => decode::<String>(row, index, name),
        "INT2" => decode::<i16>(row, index, name),
        "INT4" => decode::<i32>(row, index, name),
        "INT8" => decode::<i64>(row, index, name),
        "FLOAT4" => decode_with::<f32, _>(row, index, name, |v| render_float(v.to_string())),
        "FLOAT8" => decode_with::<f64, _>(row, index, name, |v| render_float(v.to_string())),
        "NUMERIC" => decode::<BigDecimal>(row, index, name),
        "BOOL" => decode::<bool>(row, index, name),
        "DATE" => decode::<NaiveDate>(row, index, name),
        "TIME" => decode::<NaiveTime>(row, index, name),
        "TIMESTAMP" => decode::<NaiveDateTime>(row, index, name),
        "TIMESTAMPTZ" => Ok(row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .map_err(|e| SourceError::decode(name, e.to_string()))?
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string())),
        other => Err(SourceError::UnsupportedType {
            column: name.to_string(),
            type_name: other.to_string(),
        }),
    }
}

fn decode<'r, T>(row: &'r PgRow, index: usize, column: &str) -> Result<Field, SourceError>
where
    T: Decode<'r, Postgres> + Type<Postgres> + ToString,
{
    decode_with::<T, _>(row, index, column, |v| v.to_string())
}

fn decode_with<'r, T, F>(
    row: &'r PgRow,
    index: usize,
    column: &str,
    render: F,
) -> Result<Field, SourceError>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
    F: Fn(T) -> String,
{
    row.try_get::<Option<T>, _>(index)
        .map(|value| value.map(render))
        .map_err(|e| SourceError::decode(column, e.to_string()))
}

/// `text` is a float's `Display` output; a whole value gains a `.0` fraction.
fn render_float(text: String) -> String {
    if text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        text + ".0"
    } else {
        text
    }
}
