use crate::error::ValidationError;
use crate::types::traits::any_date::AnyDate;
use chrono::NaiveDate;
use std::fmt;

/// An inclusive range of calendar days.
///
/// A range whose start equals its end is a single instant.
///
/// # Examples
///
/// ```
/// use rasterharvest::TimeRange;
///
/// let range = TimeRange::new("2025-01-01", "2025-03-31").unwrap();
/// assert_eq!(range.to_stac_interval(), "2025-01-01T00:00:00Z/2025-03-31T23:59:59Z");
///
/// // A month expands to its first and last day
/// let feb = TimeRange::from_period("2024-02").unwrap();
/// assert_eq!(feb.end().to_string(), "2024-02-29");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeRange {
    /// Builds the range running from the first day of `start` to the last day
    /// of `end`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::DateParsing`] when either input does not resolve to a
    /// date, [`ValidationError::InvalidTimeRange`] when start lies after end.
    pub fn new(start: impl AnyDate, end: impl AnyDate) -> Result<Self, ValidationError> {
        let start = start
            .get_date_range()
            .ok_or(ValidationError::DateParsing)?
            .start;
        let end = end.get_date_range().ok_or(ValidationError::DateParsing)?.end;
        if start > end {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The single-day range of `date`.
    pub fn at(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The days covered by one period, such as a [`crate::Year`], a
    /// [`crate::Month`] or a `"YYYY-MM"` string.
    pub fn from_period(period: impl AnyDate) -> Result<Self, ValidationError> {
        let range = period
            .get_date_range()
            .ok_or(ValidationError::DateParsing)?;
        Self::new(range.start, range.end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The STAC `datetime` search parameter covering the whole of both end
    /// days.
    pub fn to_stac_interval(&self) -> String {
        format!(
            "{}T00:00:00Z/{}T23:59:59Z",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_instant() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..={}", self.start, self.end)
        }
    }
}
