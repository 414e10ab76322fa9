//! Calendar helpers for grouping rides and payments by month.
//!
//! Months are half-open date ranges: a date `d` belongs to a month when
//! `start <= d < end_exclusive`.

use std::iter;

use serde::Serialize;
use time::{
    Date, Duration, Month, Weekday, macros::format_description,
};

use crate::Error;

/// The dates spanned by a calendar month, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRange {
    /// The first day of the month.
    pub start: Date,
    /// The first day of the following month.
    pub end_exclusive: Date,
}

impl MonthRange {
    /// Whether `date` falls within the month.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end_exclusive
    }

    /// The `yyyy-MM` key for the month.
    pub fn key(&self) -> String {
        month_key(self.start)
    }
}

/// The `yyyy-MM` identifier for the month containing `date`, e.g. `"2024-02"`.
pub fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// The half-open range of dates for the month containing `date`.
///
/// # Panics
/// Panics for the last representable month, whose following month cannot be
/// represented. [parse_month_key] and [parse_date] never return such a date.
pub fn month_range(date: Date) -> MonthRange {
    let start = date - Duration::days(i64::from(date.day()) - 1);
    let days = start.month().length(start.year());

    MonthRange {
        start,
        end_exclusive: start + Duration::days(days.into()),
    }
}

/// Parse a `yyyy-MM` key into the first day of that month.
///
/// # Errors
/// Returns [Error::InvalidMonth] if `key` is not a four digit year and a two
/// digit month separated by a hyphen, or is the last representable month.
pub fn parse_month_key(key: &str) -> Result<Date, Error> {
    let invalid = || Error::InvalidMonth(key.to_owned());

    let (year, month) = key.trim().split_once('-').ok_or_else(invalid)?;

    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;

    Date::from_calendar_date(year, month, 1)
        .ok()
        .filter(|date| !in_last_month(*date))
        .ok_or_else(invalid)
}

/// Parse a `yyyy-MM-dd` date, e.g. `"2024-02-29"`.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid calendar date in that
/// format, or falls in the last representable month.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .ok()
        .filter(|date| !in_last_month(*date))
        .ok_or_else(|| Error::InvalidDate(text.to_owned()))
}

/// Whether `date` is in the month that ends at [Date::MAX].
fn in_last_month(date: Date) -> bool {
    date.year() == Date::MAX.year() && date.month() == Date::MAX.month()
}

/// Every Monday to Friday in the month containing `date`, in ascending order.
pub fn weekdays_in_month(date: Date) -> Vec<Date> {
    let range = month_range(date);

    iter::successors(Some(range.start), |day| day.next_day())
        .take_while(|day| *day < range.end_exclusive)
        .filter(|day| !is_weekend(*day))
        .collect()
}

fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

#[cfg(test)]
mod month_range_tests {
    use time::macros::date;

    use super::{MonthRange, month_key, month_range, parse_date, parse_month_key};

    #[test]
    fn february_in_a_leap_year() {
        let range = month_range(date!(2024 - 02 - 15));

        assert_eq!(
            range,
            MonthRange {
                start: date!(2024 - 02 - 01),
                end_exclusive: date!(2024 - 03 - 01),
            }
        );
        assert_eq!(range.start.to_string(), "2024-02-01");
        assert_eq!(range.end_exclusive.to_string(), "2024-03-01");
    }

    #[test]
    fn december_rolls_over_to_next_year() {
        let range = month_range(date!(2023 - 12 - 31));

        assert_eq!(range.start, date!(2023 - 12 - 01));
        assert_eq!(range.end_exclusive, date!(2024 - 01 - 01));
    }

    #[test]
    fn range_is_half_open() {
        let range = month_range(date!(2024 - 02 - 10));

        assert!(!range.contains(date!(2024 - 01 - 31)));
        assert!(range.contains(date!(2024 - 02 - 01)));
        assert!(range.contains(date!(2024 - 02 - 29)));
        assert!(!range.contains(date!(2024 - 03 - 01)));
    }

    #[test]
    fn latest_parsed_month_has_a_range() {
        let month = parse_month_key("9999-11").unwrap();

        let range = month_range(month);

        assert_eq!(range.end_exclusive, date!(9999 - 12 - 01));
        assert_eq!(month_range(parse_date("9999-11-30").unwrap()), range);
    }

    #[test]
    fn month_key_is_zero_padded() {
        assert_eq!(month_key(date!(2024 - 02 - 15)), "2024-02");
        assert_eq!(month_key(date!(2024 - 11 - 01)), "2024-11");
        assert_eq!(month_range(date!(2024 - 10 - 05)).key(), "2024-10");
    }
}


#[cfg(test)]
mod parse_date_tests {
    use time::macros::date;

    use crate::Error;

    use super::parse_date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2024-02-29"), Ok(date!(2024 - 02 - 29)));
        assert_eq!(parse_date(" 2024-10-05 "), Ok(date!(2024 - 10 - 05)));
    }

    #[test]
    fn rejects_impossible_and_malformed_dates() {
        for text in ["2023-02-29", "2024-13-01", "2024-02", "05/10/2024", "", "9999-12-31"] {
            assert_eq!(
                parse_date(text),
                Err(Error::InvalidDate(text.to_owned())),
                "date {text:?}"
            );
        }
    }
}

#[cfg(test)]
mod weekdays_in_month_tests {
    use time::{Weekday, macros::date};

    use super::weekdays_in_month;

    #[test]
    fn february_2024_has_21_weekdays() {
        let days = weekdays_in_month(date!(2024 - 02 - 01));

        assert_eq!(days.len(), 21);
        assert_eq!(days.first(), Some(&date!(2024 - 02 - 01)));
        assert_eq!(days.last(), Some(&date!(2024 - 02 - 29)));
    }

    #[test]
    fn excludes_weekends_and_is_ascending() {
        let days = weekdays_in_month(date!(2024 - 06 - 20));

        assert!(
            days.iter()
                .all(|day| !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday))
        );
        assert!(days.windows(2).all(|pair| pair[0] < pair[1]));
        // June 2024 starts on a Saturday.
        assert_eq!(days.first(), Some(&date!(2024 - 06 - 03)));
        assert_eq!(days.len(), 20);
    }
}
