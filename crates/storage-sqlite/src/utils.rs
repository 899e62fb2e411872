//! Conversion helpers shared by the repositories.
//!
//! Amounts live in TEXT columns so that no precision is lost in SQLite.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::errors::StorageError;
use dues_core::utils::time_utils::now_naive_utc;
use dues_core::Result;

/// Parses a stored amount, failing loudly on corrupt values.
pub fn parse_decimal(value: &str, field_name: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| {
        log::error!("Failed to parse {} '{}': {}", field_name, value, e);
        StorageError::SerializationError(format!("invalid {} '{}'", field_name, value)).into()
    })
}

/// Parses an enum stored as its canonical string.
pub fn parse_enum<T>(value: &str, field_name: &str) -> Result<T>
where
    T: FromStr,
{
    value.parse::<T>().map_err(|_| {
        StorageError::SerializationError(format!("invalid {} '{}'", field_name, value)).into()
    })
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn timestamp() -> NaiveDateTime {
    now_naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dues_core::obligations::ObligationStatus;

    #[test]
    fn test_parse_decimal_keeps_scale() {
        let amount = parse_decimal("20.50", "amount").unwrap();
        assert_eq!(amount.to_string(), "20.50");
        assert!(parse_decimal("twenty", "amount").is_err());
    }

    #[test]
    fn test_parse_enum() {
        let status: ObligationStatus = parse_enum("PARTIALLY_PAID", "status").unwrap();
        assert_eq!(status, ObligationStatus::PartiallyPaid);
        assert!(parse_enum::<ObligationStatus>("LATE", "status").is_err());
    }
}
