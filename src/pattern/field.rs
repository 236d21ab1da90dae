use std::fmt;

use super::PatternError;

/// One of the five positions of an availability pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl Dimension {
    /// Pattern order.
    pub const ALL: [Dimension; 5] = [
        Dimension::Minute,
        Dimension::Hour,
        Dimension::DayOfMonth,
        Dimension::Month,
        Dimension::DayOfWeek,
    ];

    /// Inclusive `(min, max)` a concrete field may name.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            Dimension::Minute => (0, 59),
            Dimension::Hour => (0, 23),
            Dimension::DayOfMonth => (1, 31),
            Dimension::Month => (1, 12),
            Dimension::DayOfWeek => (0, 6),
        }
    }

    /// Label used by the multi-line debug rendering.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Minute => "minutes",
            Dimension::Hour => "hours",
            Dimension::DayOfMonth => "days of the month",
            Dimension::Month => "months",
            Dimension::DayOfWeek => "days of the week",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Minute => "minute",
            Dimension::Hour => "hour",
            Dimension::DayOfMonth => "day-of-month",
            Dimension::Month => "month",
            Dimension::DayOfWeek => "day-of-week",
        };
        f.write_str(name)
    }
}

/// A single alternative within a pattern dimension.
///
/// `to < from` is a wraparound range (e.g. hours `19-7` runs overnight).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Any,
    Range { from: u32, to: u32, step: u32 },
}

impl Field {
    pub fn matches(&self, value: u32) -> bool {
        match *self {
            Field::Any => true,
            Field::Range { from, to, step } => {
                if step == 0 {
                    return false;
                }
                let on_step = (i64::from(value) - i64::from(from)).rem_euclid(i64::from(step)) == 0;
                let in_range = if to >= from {
                    from <= value && value <= to
                } else {
                    value >= from || value <= to
                };
                in_range && on_step
            }
        }
    }

    fn validate(&self, dimension: Dimension) -> Result<(), PatternError> {
        let Field::Range { from, to, step } = *self else {
            return Ok(());
        };
        let (min, max) = dimension.bounds();
        let in_bounds = |v: u32| min <= v && v <= max;
        if !in_bounds(from) || !in_bounds(to) {
            return Err(PatternError::Range {
                dimension,
                token: self.to_string(),
                min,
                max,
            });
        }
        if step < 1 {
            return Err(PatternError::Step {
                dimension,
                token: self.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Field::Any => f.write_str("*"),
            Field::Range { from, to, .. } if from == to => write!(f, "{from}"),
            Field::Range { from, to, step: 1 } => write!(f, "{from}-{to}"),
            Field::Range { from, to, step } => write!(f, "{from}-{to}/{step}"),
        }
    }
}

/// Parse and validate one comma-separated field against its dimension.
pub fn parse_field(spec: &str, dimension: Dimension) -> Result<Vec<Field>, PatternError> {
    let fields = parse_list(spec, dimension)?;
    validate_list(&fields, dimension)?;
    Ok(fields)
}

/// Syntax only; bounds and steps are checked by [`validate_list`].
pub(super) fn parse_list(spec: &str, dimension: Dimension) -> Result<Vec<Field>, PatternError> {
    spec.split(',')
        .map(|token| parse_token(token, dimension))
        .collect()
}

pub(super) fn validate_list(fields: &[Field], dimension: Dimension) -> Result<(), PatternError> {
    fields.iter().try_for_each(|field| field.validate(dimension))
}

fn parse_token(token: &str, dimension: Dimension) -> Result<Field, PatternError> {
    let syntax = || PatternError::Syntax {
        dimension,
        token: token.to_string(),
    };
    let (range, step) = match token.split_once('/') {
        Some((range, step)) => (range, Some(parse_number(step).ok_or_else(syntax)?)),
        None => (token, None),
    };

    let (min, max) = dimension.bounds();
    let (from, to) = match range {
        "*" if step.is_none() => return Ok(Field::Any),
        "*" | "" if step.is_some() => (min, max),
        _ => match range.split_once('-') {
            Some((a, b)) => (
                parse_number(a).ok_or_else(syntax)?,
                parse_number(b).ok_or_else(syntax)?,
            ),
            None if step.is_none() => {
                let n = parse_number(range).ok_or_else(syntax)?;
                (n, n)
            }
            None => return Err(syntax()),
        },
    };

    let mut step = step.unwrap_or(1);
    // A single value matches only itself; any step >= 1 is equivalent.
    if from == to && step > 1 {
        step = 1;
    }
    Ok(Field::Range { from, to, step })
}

fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(from: u32, to: u32, step: u32) -> Field {
        Field::Range { from, to, step }
    }

    #[test]
    fn grammar_forms() {
        let d = Dimension::Minute;
        assert_eq!(parse_field("*", d).unwrap(), vec![Field::Any]);
        assert_eq!(parse_field("5", d).unwrap(), vec![range(5, 5, 1)]);
        assert_eq!(parse_field("10-20", d).unwrap(), vec![range(10, 20, 1)]);
        assert_eq!(parse_field("10-20/5", d).unwrap(), vec![range(10, 20, 5)]);
        assert_eq!(parse_field("/15", d).unwrap(), vec![range(0, 59, 15)]);
        assert_eq!(parse_field("*/15", d).unwrap(), vec![range(0, 59, 15)]);
        assert_eq!(
            parse_field("0,30,45-50", d).unwrap(),
            vec![range(0, 0, 1), range(30, 30, 1), range(45, 50, 1)]
        );
    }

    #[test]
    fn bare_step_uses_dimension_bounds() {
        assert_eq!(
            parse_field("/2", Dimension::DayOfMonth).unwrap(),
            vec![range(1, 31, 2)]
        );
        assert_eq!(
            parse_field("/3", Dimension::Month).unwrap(),
            vec![range(1, 12, 3)]
        );
    }

    #[test]
    fn wraparound_is_not_out_of_range() {
        assert_eq!(
            parse_field("19-7", Dimension::Hour).unwrap(),
            vec![range(19, 7, 1)]
        );
    }

    #[test]
    fn rejects_out_of_bounds_for_every_dimension() {
        for dimension in Dimension::ALL {
            let (min, max) = dimension.bounds();
            let over = format!("{min}-{}", max + 1);
            assert!(
                matches!(
                    parse_field(&over, dimension),
                    Err(PatternError::Range { min: m, max: x, .. }) if m == min && x == max
                ),
                "{dimension}: {over}"
            );
            let single = format!("{}", max + 1);
            assert!(matches!(
                parse_field(&single, dimension),
                Err(PatternError::Range { .. })
            ));
            if min > 0 {
                let under = format!("{}-{max}", min - 1);
                assert!(matches!(
                    parse_field(&under, dimension),
                    Err(PatternError::Range { .. })
                ));
            }
        }
    }

    #[test]
    fn rejects_zero_step() {
        for dimension in Dimension::ALL {
            assert!(matches!(
                parse_field("/0", dimension),
                Err(PatternError::Step { .. })
            ));
        }
        let err = parse_field("1-10/0", Dimension::Hour).unwrap_err();
        assert_eq!(
            err,
            PatternError::Step {
                dimension: Dimension::Hour,
                token: "1-10/0".into(),
            }
        );
    }

    #[test]
    fn range_error_carries_token_and_bounds() {
        let err = parse_field("0-60", Dimension::Minute).unwrap_err();
        assert_eq!(
            err,
            PatternError::Range {
                dimension: Dimension::Minute,
                token: "0-60".into(),
                min: 0,
                max: 59,
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid range 0-60 for minute (valid values: 0-59)"
        );
    }

    #[test]
    fn malformed_tokens() {
        for bad in ["", "a", "1-", "-1", "1,,2", "5/2", "1-2-3", "+5", "*-3", "1-2/x"] {
            assert!(
                matches!(
                    parse_field(bad, Dimension::Hour),
                    Err(PatternError::Syntax { .. })
                ),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn single_value_step_collapses() {
        assert_eq!(
            parse_field("5-5/3", Dimension::Minute).unwrap(),
            vec![range(5, 5, 1)]
        );
    }

    #[test]
    fn field_matching() {
        assert!(Field::Any.matches(42));

        let plain = range(10, 20, 5);
        assert!(plain.matches(10));
        assert!(plain.matches(15));
        assert!(plain.matches(20));
        assert!(!plain.matches(12));
        assert!(!plain.matches(25));

        let overnight = range(19, 7, 1);
        assert!(overnight.matches(19));
        assert!(overnight.matches(23));
        assert!(overnight.matches(0));
        assert!(overnight.matches(7));
        assert!(!overnight.matches(12));

        let stepped_wrap = range(20, 4, 2);
        assert!(stepped_wrap.matches(20));
        assert!(stepped_wrap.matches(22));
        assert!(stepped_wrap.matches(0));
        assert!(stepped_wrap.matches(4));
        assert!(!stepped_wrap.matches(21));
        assert!(!stepped_wrap.matches(3));
    }

    #[test]
    fn zero_step_never_matches() {
        assert!(!range(0, 10, 0).matches(5));
    }

    #[test]
    fn canonical_display() {
        assert_eq!(Field::Any.to_string(), "*");
        assert_eq!(range(7, 7, 1).to_string(), "7");
        assert_eq!(range(7, 9, 1).to_string(), "7-9");
        assert_eq!(range(0, 59, 15).to_string(), "0-59/15");
    }
}
