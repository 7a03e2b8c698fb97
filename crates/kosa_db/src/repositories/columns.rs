//! Column decoding shared by the SQL repositories.
//!
//! The `Any` driver cannot decode chrono types, so dates, times and
//! timestamps are stored as text and parsed here.
//!
//! It cannot decode SQL NULL either. Nullable columns are therefore selected
//! as `COALESCE(col, '')` or `COALESCE(col, -1)` and mapped back to `None`
//! by [`opt_text`] / [`opt_int`].

use crate::error::DbError;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";

pub(crate) fn text(row: &AnyRow, column: &str) -> Result<String, DbError> {
    row.try_get::<String, _>(column)
        .map_err(|e| DbError::decode(column, e))
}

/// Stands in for NULL in integer columns; ids, prices and durations are never negative.
pub(crate) const ABSENT_INT: i64 = -1;

/// Reads a `COALESCE(col, '')` column; the empty string is `None`.
pub(crate) fn opt_text(row: &AnyRow, column: &str) -> Result<Option<String>, DbError> {
    let value = text(row, column)?;
    Ok((!value.is_empty()).then_some(value))
}

pub(crate) fn int(row: &AnyRow, column: &str) -> Result<i64, DbError> {
    row.try_get::<i64, _>(column)
        .map_err(|e| DbError::decode(column, e))
}

/// Reads a `COALESCE(col, -1)` column.
pub(crate) fn opt_int(row: &AnyRow, column: &str) -> Result<Option<i64>, DbError> {
    let value = int(row, column)?;
    Ok((value != ABSENT_INT).then_some(value))
}

pub(crate) fn hour(row: &AnyRow, column: &str) -> Result<u32, DbError> {
    let value = int(row, column)?;
    u32::try_from(value).map_err(|e| DbError::decode(column, e))
}

pub(crate) fn date(row: &AnyRow, column: &str) -> Result<NaiveDate, DbError> {
    let raw = text(row, column)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| DbError::decode(column, e))
}

pub(crate) fn time(row: &AnyRow, column: &str) -> Result<NaiveTime, DbError> {
    let raw = text(row, column)?;
    NaiveTime::parse_from_str(&raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
        .map_err(|e| DbError::decode(column, e))
}

pub(crate) fn timestamp(row: &AnyRow, column: &str) -> Result<Option<DateTime<Utc>>, DbError> {
    match opt_text(row, column)? {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| DbError::decode(column, e)),
        None => Ok(None),
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Fixed-width UTC timestamps so text comparison orders them correctly.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

