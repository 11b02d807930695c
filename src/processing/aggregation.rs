use crate::error::ValidationError;
use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Calendar bucketing used for temporal aggregation.
///
/// Parses from `"year"`, `"month"`, `"week"` or a day count such as `"8d"`.
///
/// ```
/// use rasterharvest::BucketRule;
/// use chrono::NaiveDate;
///
/// let rule: BucketRule = "16d".parse().unwrap();
/// let day = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
/// assert_eq!(rule.bucket_start(day), NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketRule {
    Year,
    Month,
    /// ISO weeks starting on Monday.
    Week,
    /// Periods of `n` days counted from 1 January of each year. The last
    /// period of a year is cut short at 31 December.
    Days(u32),
}

impl BucketRule {
    /// The first day of the bucket `date` falls in.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            BucketRule::Year => date.with_ordinal(1).unwrap_or(date),
            BucketRule::Month => date.with_day(1).unwrap_or(date),
            BucketRule::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            BucketRule::Days(n) => {
                let n = (*n).max(1);
                let offset = date.ordinal0() % n;
                date - Duration::days(offset as i64)
            }
        }
    }
}

impl FromStr for BucketRule {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "year" | "yearly" | "annual" => return Ok(BucketRule::Year),
            "month" | "monthly" => return Ok(BucketRule::Month),
            "week" | "weekly" => return Ok(BucketRule::Week),
            _ => {}
        }
        let days = key
            .strip_suffix("-day")
            .or_else(|| key.strip_suffix('d'))
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0);
        days.map(BucketRule::Days)
            .ok_or_else(|| ValidationError::InvalidAggregation(s.to_string()))
    }
}

impl fmt::Display for BucketRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketRule::Year => f.write_str("year"),
            BucketRule::Month => f.write_str("month"),
            BucketRule::Week => f.write_str("week"),
            BucketRule::Days(n) => write!(f, "{}d", n),
        }
    }
}
