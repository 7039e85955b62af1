//! Calendar dates with partial precision.
//!
//! Scrapers frequently only know the year or the month of a release, so a
//! [`Date`] remembers how much of it is meaningful. Its canonical string form
//! is `YYYY`, `YYYY-MM` or `YYYY-MM-DD`, and that form is what reconciliation
//! compares.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How much of a [`Date`] is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

/// A date with an explicit precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    date: NaiveDate,
    precision: DatePrecision,
}

impl Date {
    #[must_use]
    pub const fn new(date: NaiveDate, precision: DatePrecision) -> Self {
        Self { date, precision }
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub const fn precision(&self) -> DatePrecision {
        self.precision
    }
}

impl FromStr for Date {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || Error::InvalidData(format!("invalid date: {s:?}"));

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::new(date, DatePrecision::Day));
        }

        let parts: Vec<&str> = s.split('-').collect();
        match parts.as_slice() {
            [year, month] if year.len() == 4 => {
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, month, 1)
                    .map(|d| Self::new(d, DatePrecision::Month))
                    .ok_or_else(invalid)
            }
            [year] if year.len() == 4 => {
                let year: i32 = year.parse().map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, 1, 1)
                    .map(|d| Self::new(d, DatePrecision::Year))
                    .ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            DatePrecision::Year => write!(f, "{:04}", self.date.year()),
            DatePrecision::Month => {
                write!(f, "{:04}-{:02}", self.date.year(), self.date.month())
            }
            DatePrecision::Day => write!(f, "{}", self.date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
