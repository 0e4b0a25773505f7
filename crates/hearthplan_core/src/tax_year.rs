//! UK tax year arithmetic
//!
//! A UK tax year runs 6 April to the following 5 April and is labelled by
//! both calendar years, e.g. `2024/25` for 6 Apr 2024 – 5 Apr 2025. All
//! comparisons are calendar-day comparisons on `jiff::civil::Date`; no
//! time-of-day is ever involved.

use std::str::FromStr;

use jiff::civil::{Date, date};
use serde::{Deserialize, Serialize};

use crate::error::ParseTaxYearError;

/// A UK tax year, identified by the calendar year it starts in.
///
/// `TaxYear(2024)` is the year 6 Apr 2024 – 5 Apr 2025, displayed `2024/25`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct TaxYear(pub i16);

impl TaxYear {
    /// The tax year containing the given calendar date
    pub fn containing(d: Date) -> Self {
        let boundary = date(d.year(), 4, 6);
        if d < boundary {
            TaxYear(d.year() - 1)
        } else {
            TaxYear(d.year())
        }
    }

    /// First day of the tax year (6 April)
    pub fn start(self) -> Date {
        date(self.0, 4, 6)
    }

    /// Last day of the tax year (5 April of the following year)
    pub fn end(self) -> Date {
        date(self.0 + 1, 4, 5)
    }

    pub fn contains(self, d: Date) -> bool {
        d >= self.start() && d <= self.end()
    }

    pub fn next(self) -> Self {
        TaxYear(self.0 + 1)
    }
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:02}", self.0, (self.0 + 1) % 100)
    }
}

impl FromStr for TaxYear {
    type Err = ParseTaxYearError;

    /// Parse a `"2024/25"` style label. The second component must be the
    /// two-digit year following the first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (first, second) = s
            .split_once('/')
            .ok_or_else(|| ParseTaxYearError::new(s))?;
        let start: i16 = first.parse().map_err(|_| ParseTaxYearError::new(s))?;
        let end: i16 = second.parse().map_err(|_| ParseTaxYearError::new(s))?;
        if second.len() != 2 || end != (start + 1) % 100 {
            return Err(ParseTaxYearError::new(s));
        }
        Ok(TaxYear(start))
    }
}
