use crate::types::traits::types::{Month, StartEndDate, Year};
use chrono::{DateTime, NaiveDate, Utc};

/// Anything that resolves to an inclusive span of calendar days.
///
/// A single date resolves to a one-day span, a [`Year`] or [`Month`] to the
/// days they cover. Used by [`crate::TimeRange`] to accept loose date input.
pub trait AnyDate {
    fn get_date_range(self) -> Option<StartEndDate>;
}

impl AnyDate for NaiveDate {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self,
            end: self,
        })
    }
}

impl AnyDate for DateTime<Utc> {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.date_naive().get_date_range()
    }
}

impl AnyDate for &str {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.to_string().get_date_range()
    }
}

impl AnyDate for String {
    fn get_date_range(self) -> Option<StartEndDate> {
        if let Ok(naive_date) = NaiveDate::parse_from_str(&self, "%Y-%m-%d") {
            return naive_date.get_date_range();
        }
        // Year-month, e.g. "2025-03"
        if let Some((year, month)) = self.split_once('-') {
            if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
                return Month(year, month).get_date_range();
            }
        }
        if self.len() == 4 {
            if let Ok(year) = self.parse::<i32>() {
                return Year(year).get_date_range();
            }
        }
        None
    }
}

impl AnyDate for Year {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: NaiveDate::from_ymd_opt(self.0, 1, 1)?,
            end: NaiveDate::from_ymd_opt(self.0, 12, 31)?,
        })
    }
}

impl AnyDate for Month {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self.first_day()?,
            end: self.last_day()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_forms() {
        let day = "2025-02-14".get_date_range().unwrap();
        assert_eq!(day.start, day.end);

        let month = "2024-02".get_date_range().unwrap();
        assert_eq!(month.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(month.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let year = "2021".get_date_range().unwrap();
        assert_eq!(year.end, NaiveDate::from_ymd_opt(2021, 12, 31).unwrap());

        assert!("not a date".get_date_range().is_none());
        assert!("2024-13".get_date_range().is_none());
    }
}
