//! Date offsets for trailing-period lookups.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A span of time counted back from a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateOffset {
    /// A number of days.
    Days(u32),
    /// A number of weeks.
    Weeks(u32),
    /// A number of calendar months.
    Months(u32),
    /// A number of calendar years.
    Years(u32),
}

impl DateOffset {
    /// The date this offset lies before `reference`.
    ///
    /// Month and year offsets clamp to the end of shorter months
    /// (March 31 minus one month is February 29 in a leap year).
    #[must_use]
    pub fn before(self, reference: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Days(n) => reference.checked_sub_days(Days::new(u64::from(n))),
            Self::Weeks(n) => reference.checked_sub_days(Days::new(u64::from(n) * 7)),
            Self::Months(n) => reference.checked_sub_months(Months::new(n)),
            Self::Years(n) => n
                .checked_mul(12)
                .and_then(|months| reference.checked_sub_months(Months::new(months))),
        }
    }
}

impl fmt::Display for DateOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(n) => write!(f, "{n}d"),
            Self::Weeks(n) => write!(f, "{n}w"),
            Self::Months(n) => write!(f, "{n}m"),
            Self::Years(n) => write!(f, "{n}y"),
        }
    }
}

impl FromStr for DateOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(unit) = s.chars().last() else {
            return Err("empty date offset".to_string());
        };
        let count: u32 = s[..s.len() - unit.len_utf8()]
            .parse()
            .map_err(|_| format!("invalid date offset: {s}"))?;
        match unit.to_ascii_lowercase() {
            'd' => Ok(Self::Days(count)),
            'w' => Ok(Self::Weeks(count)),
            'm' => Ok(Self::Months(count)),
            'y' => Ok(Self::Years(count)),
            _ => Err(format!("invalid date offset unit in {s}: expected d, w, m or y")),
        }
    }
}

impl Serialize for DateOffset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateOffset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
