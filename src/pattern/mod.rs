//! Cron-like availability patterns.
//!
//! ```text
//! ┌───────────── minute (0-59)
//! │ ┌───────────── hour (0-23)
//! │ │ ┌───────────── day of month (1-31)
//! │ │ │ ┌───────────── month (1-12)
//! │ │ │ │ ┌───────────── day of week (0-6)
//! │ │ │ │ │
//! * * * * *
//! ```

mod error;
mod field;
#[cfg(test)]
mod tests;

pub use error::PatternError;
pub use field::{parse_field, Dimension, Field};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::model::Ms;

/// Five parsed dimensions. Alternatives within a dimension are OR'd; the
/// dimensions are AND'd. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AvailabilityPattern {
    minutes: Vec<Field>,
    hours: Vec<Field>,
    days_of_month: Vec<Field>,
    months: Vec<Field>,
    days_of_week: Vec<Field>,
}

impl AvailabilityPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let parts: Vec<&str> = pattern.split_whitespace().collect();
        let [minutes, hours, days_of_month, months, days_of_week] = parts.as_slice() else {
            return Err(PatternError::FieldCount(parts.len()));
        };

        let parsed = Self {
            minutes: field::parse_list(minutes, Dimension::Minute)?,
            hours: field::parse_list(hours, Dimension::Hour)?,
            days_of_month: field::parse_list(days_of_month, Dimension::DayOfMonth)?,
            months: field::parse_list(months, Dimension::Month)?,
            days_of_week: field::parse_list(days_of_week, Dimension::DayOfWeek)?,
        };
        for dimension in Dimension::ALL {
            field::validate_list(parsed.fields(dimension), dimension)?;
        }
        Ok(parsed)
    }

    pub fn fields(&self, dimension: Dimension) -> &[Field] {
        match dimension {
            Dimension::Minute => &self.minutes,
            Dimension::Hour => &self.hours,
            Dimension::DayOfMonth => &self.days_of_month,
            Dimension::Month => &self.months,
            Dimension::DayOfWeek => &self.days_of_week,
        }
    }

    pub fn matches(&self, at: Ms) -> bool {
        let Some(f) = calendar::fields(at) else {
            return false;
        };
        any_matches(&self.minutes, f.minute)
            && any_matches(&self.hours, f.hour)
            && any_matches(&self.days_of_month, f.day)
            && any_matches(&self.months, f.month)
            // Weekday is sampled one-based (Sunday = 1) against a field declared over 0-6.
            && any_matches(&self.days_of_week, f.weekday + 1)
    }

    /// True if both endpoints match. Failing that, an interval whose end hour
    /// is earlier than its start hour is accepted when midnight of the day
    /// after `end` matches.
    ///
    /// This is an approximation for overnight windows, not interval coverage:
    /// instants strictly between `start` and `end` are never sampled.
    pub fn matches_range(&self, start: Ms, end: Ms) -> bool {
        if self.matches(start) && self.matches(end) {
            return true;
        }
        let crosses_day = match (calendar::fields(start), calendar::fields(end)) {
            (Some(s), Some(e)) => e.hour < s.hour,
            _ => false,
        };
        crosses_day && calendar::start_of_next_day(end).is_some_and(|next| self.matches(next))
    }
}

fn any_matches(fields: &[Field], value: u32) -> bool {
    fields.iter().any(|f| f.matches(value))
}

struct FieldList<'a>(&'a [Field]);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

/// `{}` renders the canonical single-line form; `{:#}` renders one labelled
/// dimension per line.
impl fmt::Display for AvailabilityPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labelled = f.alternate();
        for (i, dimension) in Dimension::ALL.into_iter().enumerate() {
            let list = FieldList(self.fields(dimension));
            match (labelled, i) {
                (true, 0) => write!(f, "{}: {list}", dimension.label())?,
                (true, _) => write!(f, "\n{}: {list}", dimension.label())?,
                (false, 0) => write!(f, "{list}")?,
                (false, _) => write!(f, " {list}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for AvailabilityPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AvailabilityPattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AvailabilityPattern> for String {
    fn from(pattern: AvailabilityPattern) -> Self {
        pattern.to_string()
    }
}
