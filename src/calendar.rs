//! UTC calendar views of `Ms` instants.
//!
//! Every calendar question the engine asks (which minute, which weekday, which
//! quota bucket) goes through here. Instants chrono cannot represent yield
//! `None` and callers treat them as "never matches".

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::model::{Ms, QuotaPeriod, Span};

/// Calendar fields of an instant, as sampled by pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub minute: u32,
    pub hour: u32,
    /// 1..=31
    pub day: u32,
    /// 1..=12
    pub month: u32,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u32,
}

pub fn to_utc(at: Ms) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(at)
}

pub fn fields(at: Ms) -> Option<CalendarFields> {
    let dt = to_utc(at)?;
    Some(CalendarFields {
        minute: dt.minute(),
        hour: dt.hour(),
        day: dt.day(),
        month: dt.month(),
        weekday: dt.weekday().num_days_from_sunday(),
    })
}

fn midnight(date: NaiveDate) -> Ms {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .timestamp_millis()
}

/// Midnight UTC of the calendar day after `at`.
pub fn start_of_next_day(at: Ms) -> Option<Ms> {
    let date = to_utc(at)?.date_naive().checked_add_days(Days::new(1))?;
    Some(midnight(date))
}

/// The quota bucket `[start, end)` containing `at`.
///
/// Weeks start on Sunday. Months and years start on their first day.
pub fn period_bounds(at: Ms, period: QuotaPeriod) -> Option<Span> {
    let date = to_utc(at)?.date_naive();
    let (start, end) = match period {
        QuotaPeriod::Day => (date, date.checked_add_days(Days::new(1))?),
        QuotaPeriod::Week => {
            let back = u64::from(date.weekday().num_days_from_sunday());
            let start = date.checked_sub_days(Days::new(back))?;
            (start, start.checked_add_days(Days::new(7))?)
        }
        QuotaPeriod::Month => {
            let start = date.with_day(1)?;
            (start, start.checked_add_months(Months::new(1))?)
        }
        QuotaPeriod::Year => {
            let start = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
            (start, NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?)
        }
    };
    Some(Span::new(midnight(start), midnight(end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Ms {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn fields_sampled_in_utc() {
        // Thursday
        let f = fields(at(2023, 1, 5, 19, 7)).unwrap();
        assert_eq!(
            f,
            CalendarFields {
                minute: 7,
                hour: 19,
                day: 5,
                month: 1,
                weekday: 4,
            }
        );
    }

    #[test]
    fn next_day_is_midnight() {
        assert_eq!(
            start_of_next_day(at(2023, 1, 6, 7, 0)),
            Some(at(2023, 1, 7, 0, 0))
        );
        assert_eq!(
            start_of_next_day(at(2023, 12, 31, 23, 59)),
            Some(at(2024, 1, 1, 0, 0))
        );
    }

    #[test]
    fn day_bucket() {
        let span = period_bounds(at(2023, 5, 1, 10, 0), QuotaPeriod::Day).unwrap();
        assert_eq!(span, Span::new(at(2023, 5, 1, 0, 0), at(2023, 5, 2, 0, 0)));
    }

    #[test]
    fn week_bucket_starts_sunday() {
        // 2023-05-03 is a Wednesday; the week began Sunday 2023-04-30.
        let span = period_bounds(at(2023, 5, 3, 10, 0), QuotaPeriod::Week).unwrap();
        assert_eq!(span, Span::new(at(2023, 4, 30, 0, 0), at(2023, 5, 7, 0, 0)));

        // A Sunday is the first day of its own week.
        let span = period_bounds(at(2023, 4, 30, 0, 0), QuotaPeriod::Week).unwrap();
        assert_eq!(span.start, at(2023, 4, 30, 0, 0));
    }

    #[test]
    fn month_bucket_rolls_year() {
        let span = period_bounds(at(2023, 12, 15, 10, 0), QuotaPeriod::Month).unwrap();
        assert_eq!(span, Span::new(at(2023, 12, 1, 0, 0), at(2024, 1, 1, 0, 0)));
    }

    #[test]
    fn year_bucket() {
        let span = period_bounds(at(2024, 2, 29, 12, 0), QuotaPeriod::Year).unwrap();
        assert_eq!(span, Span::new(at(2024, 1, 1, 0, 0), at(2025, 1, 1, 0, 0)));
    }

    #[test]
    fn unrepresentable_instant() {
        assert!(fields(Ms::MAX).is_none());
        assert!(period_bounds(Ms::MAX, QuotaPeriod::Day).is_none());
        assert!(start_of_next_day(Ms::MAX).is_none());
    }
}
