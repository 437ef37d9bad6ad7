//! Month partition keys.
//!
//! Both stored collections are partitioned by a derived `monthString` field
//! in `"YYYY-MM"` form so that month-scoped queries stay cheap. `MonthKey`
//! is the single place that string is derived, parsed, and formatted;
//! everything in the domain that writes a month string goes through it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, formatted as `"YYYY-MM"` wherever it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month a given expense date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First calendar day of the month. Used as the default entry date when
    /// repairing a monthly record that has no date of its own.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid month string: {}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in month string: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in month string: {}", s))?;
        MonthKey::new(year, month).ok_or_else(|| format!("month out of range: {}", s))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_zero_padding() {
        let key = MonthKey::new(2025, 3).unwrap();
        assert_eq!(key.to_string(), "2025-03");
    }

    #[test]
    fn parses_its_own_output() {
        let key = MonthKey::new(2024, 12).unwrap();
        assert_eq!(key.to_string().parse::<MonthKey>().unwrap(), key);
    }

    #[test]
    fn rejects_out_of_range_months() {
        assert!(MonthKey::new(2025, 0).is_none());
        assert!(MonthKey::new(2025, 13).is_none());
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("march".parse::<MonthKey>().is_err());
    }

    #[test]
    fn derives_from_expense_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(MonthKey::from_date(date).to_string(), "2025-03");
    }

    #[test]
    fn first_day_and_neighbours() {
        let key = MonthKey::new(2025, 1).unwrap();
        assert_eq!(key.first_day(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(key.previous(), MonthKey::new(2024, 12).unwrap());
        assert_eq!(key.next(), MonthKey::new(2025, 2).unwrap());
    }
}
