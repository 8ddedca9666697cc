//! Parsing helpers shared by the repository model conversions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::StorageError;

pub(crate) fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339()
}

pub(crate) fn parse_utc(value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::SerializationError(format!("invalid timestamp '{value}': {e}")))
}

pub(crate) fn parse_utc_opt(
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, StorageError> {
    value.map(parse_utc).transpose()
}

pub(crate) fn parse_decimal(value: &str) -> Result<Decimal, StorageError> {
    value
        .parse::<Decimal>()
        .map_err(|e| StorageError::SerializationError(format!("invalid decimal '{value}': {e}")))
}

pub(crate) fn parse_decimal_opt(
    value: Option<&str>,
) -> Result<Option<Decimal>, StorageError> {
    value.map(parse_decimal).transpose()
}
