//! Column codecs shared by the SQLite repositories. Timestamps are RFC3339 text, dates are
//! `YYYY-MM-DD` text and money is decimal text.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::RepositoryError;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(|e| RepositoryError::Decode(e.to_string()))
}

pub(crate) fn timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid timestamp `{value}`: {e}")))
}

pub(crate) fn optional_timestamp(
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    value.as_deref().map(timestamp).transpose()
}

pub(crate) fn date(value: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| RepositoryError::Decode(format!("invalid date `{value}`: {e}")))
}

pub(crate) fn optional_date(value: Option<String>) -> Result<Option<NaiveDate>, RepositoryError> {
    value.as_deref().map(date).transpose()
}

pub(crate) fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn money(value: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value.trim())
        .map_err(|e| RepositoryError::Decode(format!("invalid amount `{value}`: {e}")))
}
