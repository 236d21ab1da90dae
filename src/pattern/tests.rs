use chrono::{TimeZone, Utc};

use super::*;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Ms {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .unwrap()
        .timestamp_millis()
}

fn pattern(s: &str) -> AvailabilityPattern {
    AvailabilityPattern::parse(s).unwrap()
}

// ── Construction ─────────────────────────────────────────

#[test]
fn field_count_must_be_five() {
    for (input, count) in [("", 0), ("* * * *", 4), ("* * * * * *", 6)] {
        assert_eq!(
            AvailabilityPattern::parse(input),
            Err(PatternError::FieldCount(count))
        );
    }
}

#[test]
fn extra_whitespace_is_a_separator() {
    assert_eq!(pattern("0  9-17\t* *   1-5"), pattern("0 9-17 * * 1-5"));
}

#[test]
fn minute_sixty_rejected() {
    let err = AvailabilityPattern::parse("0-60 * * * *").unwrap_err();
    assert!(matches!(
        err,
        PatternError::Range {
            dimension: Dimension::Minute,
            min: 0,
            max: 59,
            ..
        }
    ));
}

#[test]
fn day_of_week_seven_rejected() {
    assert!(matches!(
        AvailabilityPattern::parse("* * * * 7"),
        Err(PatternError::Range {
            dimension: Dimension::DayOfWeek,
            ..
        })
    ));
}

#[test]
fn syntax_checked_before_bounds() {
    // Minute is out of range, day-of-week is malformed: the malformed token wins.
    assert!(matches!(
        AvailabilityPattern::parse("99 * * * x"),
        Err(PatternError::Syntax {
            dimension: Dimension::DayOfWeek,
            ..
        })
    ));
}

#[test]
fn fields_by_dimension() {
    let p = pattern("0,30 9-17 * 1-12/3 1-5");
    assert_eq!(
        p.fields(Dimension::Minute),
        &[
            Field::Range { from: 0, to: 0, step: 1 },
            Field::Range { from: 30, to: 30, step: 1 },
        ]
    );
    assert_eq!(p.fields(Dimension::DayOfMonth), &[Field::Any]);
    assert_eq!(
        p.fields(Dimension::Month),
        &[Field::Range { from: 1, to: 12, step: 3 }]
    );
}

// ── Matching ─────────────────────────────────────────────

#[test]
fn hour_wraparound() {
    let p = pattern("0 19-7 * * *");
    assert!(p.matches(at(2023, 1, 5, 19, 0)));
    assert!(p.matches(at(2023, 1, 6, 3, 0)));
    assert!(!p.matches(at(2023, 1, 5, 12, 0)));
    assert!(!p.matches(at(2023, 1, 5, 19, 1)));
}

#[test]
fn weekdays_business_hours() {
    let p = pattern("* 7-20 * * 1-5");
    // Thursday
    assert!(p.matches(at(2023, 1, 5, 10, 0)));
    // Saturday
    assert!(!p.matches(at(2023, 1, 7, 10, 0)));
}

#[test]
fn weekday_is_sampled_one_based() {
    // Sunday samples as 1, Friday as 6, Saturday as 7.
    let sunday_only = pattern("* * * * 1");
    assert!(sunday_only.matches(at(2023, 1, 8, 10, 0)));
    assert!(!sunday_only.matches(at(2023, 1, 9, 10, 0)));

    let one_to_five = pattern("* * * * 1-5");
    assert!(!one_to_five.matches(at(2023, 1, 6, 10, 0)));

    let zero = pattern("* * * * 0");
    for day in 1..=7 {
        assert!(!zero.matches(at(2023, 1, day, 10, 0)));
    }
}

#[test]
fn each_dimension_can_veto() {
    // Thursday 2023-01-05 10:30; every pattern below fixes one dimension to a miss.
    let t = at(2023, 1, 5, 10, 30);
    assert!(pattern("30 10 5 1 5").matches(t));

    for p in [
        "31 * * * *",
        "* 11 * * *",
        "* * 6 * *",
        "* * * 2 *",
        "* * * * 4",
    ] {
        assert!(!pattern(p).matches(t), "{p}");
    }
}

#[test]
fn alternatives_are_ored() {
    let p = pattern("0,15,30,45 * * * *");
    assert!(p.matches(at(2023, 3, 1, 8, 45)));
    assert!(!p.matches(at(2023, 3, 1, 8, 46)));
}

#[test]
fn stepped_minutes() {
    let p = pattern("*/20 * * * *");
    assert!(p.matches(at(2023, 3, 1, 8, 0)));
    assert!(p.matches(at(2023, 3, 1, 8, 40)));
    assert!(!p.matches(at(2023, 3, 1, 8, 50)));
}

#[test]
fn unrepresentable_instant_never_matches() {
    assert!(!pattern("* * * * *").matches(Ms::MAX));
}

// ── Ranges ───────────────────────────────────────────────

#[test]
fn range_both_endpoints_match() {
    let p = pattern("0 19-7 * * *");
    assert!(p.matches_range(at(2023, 1, 5, 19, 0), at(2023, 1, 6, 7, 0)));
}

#[test]
fn range_same_day_miss() {
    let p = pattern("0 19-7 * * *");
    assert!(!p.matches_range(at(2023, 1, 5, 12, 0), at(2023, 1, 5, 14, 0)));
}

#[test]
fn range_overnight_falls_back_to_next_midnight() {
    // 18:00 does not match, but the interval ends at an earlier hour than it
    // starts and midnight after the end does match.
    let p = pattern("0 19-7 * * *");
    assert!(p.matches_range(at(2023, 1, 5, 18, 0), at(2023, 1, 6, 7, 0)));

    // Same shape, but the next midnight is excluded by the day-of-month field.
    let p = pattern("0 19-7 1-6 * *");
    assert!(!p.matches_range(at(2023, 1, 5, 18, 0), at(2023, 1, 6, 7, 0)));
}

#[test]
fn range_without_day_crossing_has_no_fallback() {
    let p = pattern("0 * * * *");
    assert!(!p.matches_range(at(2023, 1, 5, 10, 0), at(2023, 1, 5, 11, 30)));
}

// ── Rendering ────────────────────────────────────────────

#[test]
fn canonical_form() {
    assert_eq!(pattern("0 19-7 * * *").to_string(), "0 19-7 * * *");
    assert_eq!(
        pattern("0,30 9-17 /2 */3 1-5").to_string(),
        "0,30 9-17 1-31/2 1-12/3 1-5"
    );
}

#[test]
fn labelled_form() {
    assert_eq!(
        format!("{:#}", pattern("0 9-17 * * 1-5")),
        "minutes: 0\nhours: 9-17\ndays of the month: *\nmonths: *\ndays of the week: 1-5"
    );
}

#[test]
fn semantic_round_trip() {
    for s in [
        "* * * * *",
        "0 19-7 * * *",
        "*/15 9-17 * * 1-5",
        "/5 0,12 1-31/2 6-2 0-6",
        "5-5/3 23-1/2 15 12 3",
        "0-59 0-23 1-31 1-12 0-6",
    ] {
        let p = pattern(s);
        let again = pattern(&p.to_string());
        assert_eq!(p, again, "{s}");
        assert_eq!(again.to_string(), p.to_string());
    }
}

#[test]
fn serde_as_plain_string() {
    let p = pattern("0 19-7 * * *");
    let json = serde_json::to_string(&p).unwrap();
    assert_eq!(json, "\"0 19-7 * * *\"");
    let back: AvailabilityPattern = serde_json::from_str(&json).unwrap();
    assert_eq!(back, p);

    assert!(serde_json::from_str::<AvailabilityPattern>("\"0-60 * * * *\"").is_err());
}

#[test]
fn from_str_and_error_display() {
    let p: AvailabilityPattern = "0 9 * * *".parse().unwrap();
    assert!(p.matches(at(2024, 6, 1, 9, 0)));

    let err = "* * *".parse::<AvailabilityPattern>().unwrap_err();
    assert_eq!(err.to_string(), "invalid pattern: expected 5 fields, got 3");
}
