//! Core record domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::Error;

/// Database identifier for a record.
pub type RecordId = i64;

/// A customer name that is not empty or just whitespace.
///
/// The name is kept exactly as entered. It is not trimmed or case-folded, so
/// "Ali" and "ali " are different customers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CustomerName(String);

impl CustomerName {
    /// Create a customer name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCustomerName] if `name` is
    /// empty or only contains whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.trim().is_empty() {
            Err(Error::EmptyCustomerName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a customer name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CustomerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CustomerName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CustomerName::new(s)
    }
}

impl Display for CustomerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The part of the day a delivery was made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
pub enum Shift {
    /// The early delivery.
    #[default]
    Morning,
    /// The late delivery.
    Evening,
}

impl Shift {
    /// All shifts in the order they happen during a day.
    pub const ALL: [Shift; 2] = [Shift::Morning, Shift::Evening];

    /// The name shown to users and stored in the database.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dairy_ledger::Shift;
    ///
    /// assert_eq!(Shift::Evening.as_str(), "Evening");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "Morning",
            Shift::Evening => "Evening",
        }
    }
}

impl Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Morning" => Ok(Shift::Morning),
            "Evening" => Ok(Shift::Evening),
            other => Err(format!("unknown shift \"{other}\"")),
        }
    }
}

impl ToSql for Shift {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Shift {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A single milk delivery to a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The ID assigned by the store.
    pub id: RecordId,
    /// The customer name exactly as it was entered.
    pub customer_name: String,
    /// The day of the delivery.
    pub date: Date,
    /// The part of the day of the delivery.
    pub shift: Shift,
    /// The quantity in mounds.
    pub quantity_mound: f64,
    /// The quantity in kilograms.
    pub quantity_kg: f64,
    /// The price per mound. Zero means the rate has not been set.
    pub rate: f64,
}

impl Record {
    /// The rate, or `None` if it has not been set.
    pub fn rate(&self) -> Option<f64> {
        specified_rate(self.rate)
    }

    /// The mound quantity multiplied by the rate, or `None` if the rate has
    /// not been set.
    pub fn total(&self) -> Option<f64> {
        self.rate().map(|rate| self.quantity_mound * rate)
    }
}

/// The data needed to add a record to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// The customer the milk was delivered to.
    pub customer_name: CustomerName,
    /// The day of the delivery.
    pub date: Date,
    /// The part of the day of the delivery.
    pub shift: Shift,
    /// The quantity in mounds.
    pub quantity_mound: f64,
    /// The quantity in kilograms.
    pub quantity_kg: f64,
    /// The price per mound, zero if not known yet.
    pub rate: f64,
}

/// Treats a rate of exactly zero as "not specified".
pub fn specified_rate(rate: f64) -> Option<f64> {
    if rate == 0.0 { None } else { Some(rate) }
}

/// Format a quantity or price to two decimal places.
///
/// Negative zero is printed as "0.00".
pub fn format_amount(amount: f64) -> String {
    let amount = if amount == 0.0 { 0.0 } else { amount };

    format!("{amount:.2}")
}

/// Format an optional amount, using "N/A" for a missing value.
pub fn format_optional_amount(amount: Option<f64>) -> String {
    amount.map_or_else(|| "N/A".to_owned(), format_amount)
}


#[cfg(test)]
mod shift_tests {
    use rusqlite::Connection;

    use super::Shift;

    #[test]
    fn parses_display_string() {
        for shift in Shift::ALL {
            assert_eq!(shift.to_string().parse::<Shift>(), Ok(shift));
        }
    }

    #[test]
    fn rejects_unknown_shift() {
        assert!("Night".parse::<Shift>().is_err());
    }

    #[test]
    fn stored_as_text() {
        let connection = Connection::open_in_memory().unwrap();

        let stored: String = connection
            .query_row("SELECT ?1", [Shift::Evening], |row| row.get(0))
            .unwrap();
        let loaded: Shift = connection
            .query_row("SELECT 'Morning'", [], |row| row.get(0))
            .unwrap();

        assert_eq!(stored, "Evening");
        assert_eq!(loaded, Shift::Morning);
    }
}

#[cfg(test)]
mod rate_tests {
    use time::macros::date;

    use super::{Record, Shift, format_amount, format_optional_amount};

    fn record_with_rate(rate: f64) -> Record {
        Record {
            id: 1,
            customer_name: "Ali".to_owned(),
            date: date!(2024 - 05 - 01),
            shift: Shift::Evening,
            quantity_mound: 5.0,
            quantity_kg: 450.0,
            rate,
        }
    }

    #[test]
    fn zero_rate_has_no_total() {
        let record = record_with_rate(0.0);

        assert_eq!(record.rate(), None);
        assert_eq!(record.total(), None);
        assert_eq!(format_optional_amount(record.total()), "N/A");
    }

    #[test]
    fn total_is_mound_times_rate() {
        let record = record_with_rate(20.5);

        assert_eq!(record.total(), Some(102.5));
        assert_eq!(format_optional_amount(record.total()), "102.50");
    }

    #[test]
    fn negative_zero_is_formatted_as_zero() {
        assert_eq!(format_amount(-0.0), "0.00");
        assert_eq!(format_amount(0.0), "0.00");
    }
}
