//! Date-shorthand resolution for hike date entry
//!
//! Operators type hike dates as terse, deliberately ambiguous tokens:
//! `10`, `10 12`, `10-12`, `31 3`, `03.02-04.02`, `15.12 16.12`. This
//! module turns such input plus a reference instant into a concrete
//! start/end window. A hike day always runs 08:00–22:00 local time.
//!
//! Resolution is relative to `now`: a bare day that has already passed
//! this month rolls to the next month, and a day.month pair that has
//! already passed this year rolls to the next year.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone};
use thiserror::Error;

/// Hour a hike day starts, local time.
pub const START_HOUR: u32 = 8;
/// Hour a hike day ends, local time.
pub const END_HOUR: u32 = 22;

/// A resolved start/end window. `start <= end` holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// Classified resolution failures. All are recoverable: the caller
/// reprompts the operator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("unrecognized token `{0}`, expected `dd` or `dd.mm`")]
    UnrecognizedToken(String),
    #[error("a range must be `dd dd` or `dd.mm dd.mm`, not a mix")]
    MixedRangeKinds,
    #[error("too many parts in the date input")]
    TooManyParts,
    #[error("no such calendar date: day {day} in month {month}")]
    InvalidDate { day: u32, month: u32 },
}

/// One shorthand token, tagged by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `dd` — day of a month inferred from context.
    BareDay(u32),
    /// `dd.mm` — explicit day and month, year inferred.
    DayMonth { day: u32, month: u32 },
}

/// Resolve raw operator input into a concrete hike window.
///
/// The injected timezone is the fixed offset carried by `now`; all
/// produced instants use the same offset.
pub fn resolve(text: &str, now: DateTime<FixedOffset>) -> Result<ParsedRange, DateParseError> {
    let tokens = tokenize(text)?;
    match tokens.as_slice() {
        [single] => resolve_single(*single, now),
        [first, second] => resolve_range(*first, *second, now),
        [] => Err(DateParseError::UnrecognizedToken(text.trim().to_string())),
        _ => Err(DateParseError::TooManyParts),
    }
}

/// Normalize separators and classify each fragment.
///
/// Commas and typographic dashes collapse to a plain hyphen, so
/// `10 - 12`, `10-12`, `10,12` and `10 12` all tokenize identically.
fn tokenize(input: &str) -> Result<Vec<Token>, DateParseError> {
    let normalized: String = input
        .trim()
        .chars()
        .map(|c| match c {
            ',' | '\u{2014}' | '\u{2013}' => '-',
            other => other,
        })
        .collect();

    normalized
        .split(|c: char| c == '-' || c.is_whitespace())
        .filter(|fragment| !fragment.is_empty())
        .map(classify)
        .collect()
}

fn classify(fragment: &str) -> Result<Token, DateParseError> {
    if is_two_digit(fragment) {
        let day = fragment
            .parse()
            .map_err(|_| DateParseError::UnrecognizedToken(fragment.to_string()))?;
        return Ok(Token::BareDay(day));
    }
    if let Some((day, month)) = fragment.split_once('.') {
        if is_two_digit(day) && is_two_digit(month) {
            let day = day
                .parse()
                .map_err(|_| DateParseError::UnrecognizedToken(fragment.to_string()))?;
            let month = month
                .parse()
                .map_err(|_| DateParseError::UnrecognizedToken(fragment.to_string()))?;
            return Ok(Token::DayMonth { day, month });
        }
    }
    Err(DateParseError::UnrecognizedToken(fragment.to_string()))
}

fn is_two_digit(s: &str) -> bool {
    !s.is_empty() && s.len() <= 2 && s.bytes().all(|b| b.is_ascii_digit())
}

fn resolve_single(token: Token, now: DateTime<FixedOffset>) -> Result<ParsedRange, DateParseError> {
    let tz = *now.offset();
    match token {
        Token::BareDay(day) => {
            // A day earlier than today means the operator is talking
            // about next month.
            let (year, month) = if now.day() > day {
                next_month(now.year(), now.month())
            } else {
                (now.year(), now.month())
            };
            let date = calendar_date(year, month, day)?;
            Ok(day_window(date, tz))
        }
        Token::DayMonth { day, month } => {
            let mut date = calendar_date(now.year(), month, day)?;
            if date < now.date_naive() {
                date = calendar_date(now.year() + 1, month, day)?;
            }
            Ok(day_window(date, tz))
        }
    }
}

fn resolve_range(
    first: Token,
    second: Token,
    now: DateTime<FixedOffset>,
) -> Result<ParsedRange, DateParseError> {
    let tz = *now.offset();
    match (first, second) {
        (Token::BareDay(a), Token::BareDay(b)) => {
            // Note: unlike the single-day form, a start day that has
            // already passed this month is NOT rolled forward here.
            let start_date = calendar_date(now.year(), now.month(), a)?;
            let end_date = if b >= a {
                calendar_date(now.year(), now.month(), b)?
            } else {
                // End day smaller than start day: the range crosses
                // into the next month.
                let (year, month) = next_month(now.year(), now.month());
                calendar_date(year, month, b)?
            };
            Ok(ParsedRange {
                start: at_hour(start_date, START_HOUR, tz),
                end: at_hour(end_date, END_HOUR, tz),
            })
        }
        (
            Token::DayMonth { day: d1, month: m1 },
            Token::DayMonth { day: d2, month: m2 },
        ) => {
            let mut start_date = calendar_date(now.year(), m1, d1)?;
            let mut end_date = calendar_date(now.year(), m2, d2)?;

            // Only a fully-past range rolls to the next year; a range
            // that merely started in the past stays put.
            let today = now.date_naive();
            if start_date < today && end_date < today {
                start_date = calendar_date(now.year() + 1, m1, d1)?;
                end_date = calendar_date(now.year() + 1, m2, d2)?;
            }

            let start = at_hour(start_date, START_HOUR, tz);
            let mut end = at_hour(end_date, START_HOUR, tz);
            if end < start {
                end = start + Duration::hours(24);
            }
            let end = at_hour(end.date_naive(), END_HOUR, tz);
            Ok(ParsedRange { start, end })
        }
        _ => Err(DateParseError::MixedRangeKinds),
    }
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, DateParseError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateParseError::InvalidDate { day, month })
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn day_window(date: NaiveDate, tz: FixedOffset) -> ParsedRange {
    ParsedRange {
        start: at_hour(date, START_HOUR, tz),
        end: at_hour(date, END_HOUR, tz),
    }
}

fn at_hour(date: NaiveDate, hour: u32, tz: FixedOffset) -> DateTime<FixedOffset> {
    // Fixed offsets have no DST gaps and the hour constants are valid
    // wall-clock times, so this mapping is unique.
    tz.from_local_datetime(&date.and_hms_opt(hour, 0, 0).expect("valid wall-clock time"))
        .single()
        .expect("fixed offset maps local time uniquely")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use proptest::prelude::*;

    const TZ_SECS: i32 = 3 * 3600;

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(TZ_SECS).unwrap()
    }

    /// Reference instant: 2024-03-15 12:00 local.
    fn mid_march() -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn local(y: i32, mo: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn bare_day_in_future_stays_in_current_month() {
        let range = resolve("20", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 3, 20, 8));
        assert_eq!(range.end, local(2024, 3, 20, 22));
    }

    #[test]
    fn bare_day_already_passed_rolls_to_next_month() {
        let range = resolve("10", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 4, 10, 8));
        assert_eq!(range.end, local(2024, 4, 10, 22));
    }

    #[test]
    fn bare_day_equal_to_today_stays() {
        let range = resolve("15", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 3, 15, 8));
    }

    #[test]
    fn bare_day_rollover_wraps_december_to_january() {
        let now = tz().with_ymd_and_hms(2024, 12, 20, 12, 0, 0).unwrap();
        let range = resolve("5", now).unwrap();
        assert_eq!(range.start, local(2025, 1, 5, 8));
    }

    #[test]
    fn day_range_same_month() {
        let range = resolve("10 12", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 3, 10, 8));
        assert_eq!(range.end, local(2024, 3, 12, 22));
    }

    #[test]
    fn day_range_crossing_month_boundary() {
        let range = resolve("31 3", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 3, 31, 8));
        assert_eq!(range.end, local(2024, 4, 3, 22));
    }

    #[test]
    fn day_range_does_not_roll_past_start_days() {
        // Observed behavior, intentionally preserved: "10 12" on the
        // 15th still resolves to the 10th–12th of the current month,
        // even though the single form "10" would roll forward.
        let range = resolve("10 12", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 3, 10, 8));
    }

    #[test]
    fn day_range_wraps_december_to_january() {
        let now = tz().with_ymd_and_hms(2024, 12, 20, 12, 0, 0).unwrap();
        let range = resolve("30 2", now).unwrap();
        assert_eq!(range.start, local(2024, 12, 30, 8));
        assert_eq!(range.end, local(2025, 1, 2, 22));
    }

    #[test]
    fn day_month_in_future_resolves_in_current_year() {
        let range = resolve("01.05", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 5, 1, 8));
        assert_eq!(range.end, local(2024, 5, 1, 22));
    }

    #[test]
    fn day_month_already_passed_rolls_to_next_year() {
        let range = resolve("03.02", mid_march()).unwrap();
        assert_eq!(range.start, local(2025, 2, 3, 8));
        assert_eq!(range.end, local(2025, 2, 3, 22));
    }

    #[test]
    fn day_month_range_fully_past_rolls_to_next_year() {
        let range = resolve("03.02-04.02", mid_march()).unwrap();
        assert_eq!(range.start, local(2025, 2, 3, 8));
        assert_eq!(range.end, local(2025, 2, 4, 22));
    }

    #[test]
    fn day_month_range_partially_past_stays_in_current_year() {
        let range = resolve("10.03 20.03", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 3, 10, 8));
        assert_eq!(range.end, local(2024, 3, 20, 22));
    }

    #[test]
    fn day_month_range_inverted_falls_back_to_next_day() {
        // End before start after year resolution: the end is pushed to
        // 24 hours after the start, then pinned to 22:00.
        let range = resolve("20.05 18.05", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 5, 20, 8));
        assert_eq!(range.end, local(2024, 5, 21, 22));
    }

    #[test]
    fn separators_are_interchangeable() {
        let now = mid_march();
        let plain = resolve("10 12", now).unwrap();
        for input in ["10-12", "10 - 12", "10,12", "10\u{2013}12", "10\u{2014}12", "10   12"] {
            assert_eq!(resolve(input, now).unwrap(), plain, "input {input:?}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let range = resolve("  20  ", mid_march()).unwrap();
        assert_eq!(range.start, local(2024, 3, 20, 8));
    }

    #[test]
    fn three_tokens_are_rejected() {
        assert_eq!(resolve("10 12 14", mid_march()), Err(DateParseError::TooManyParts));
    }

    #[test]
    fn mixed_range_kinds_are_rejected() {
        assert_eq!(resolve("10 04.02", mid_march()), Err(DateParseError::MixedRangeKinds));
        assert_eq!(resolve("04.02 10", mid_march()), Err(DateParseError::MixedRangeKinds));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(matches!(
            resolve("tomorrow", mid_march()),
            Err(DateParseError::UnrecognizedToken(_))
        ));
        assert!(matches!(
            resolve("123", mid_march()),
            Err(DateParseError::UnrecognizedToken(_))
        ));
        assert!(matches!(
            resolve("", mid_march()),
            Err(DateParseError::UnrecognizedToken(_))
        ));
    }

    #[test]
    fn nonexistent_calendar_dates_are_rejected() {
        assert_eq!(
            resolve("31.04", mid_march()),
            Err(DateParseError::InvalidDate { day: 31, month: 4 })
        );
        // "31" resolves on March 31st but not once April starts.
        let now = tz().with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        assert!(resolve("31", now).is_ok());
        let now = tz().with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap();
        assert_eq!(
            resolve("31", now),
            Err(DateParseError::InvalidDate { day: 31, month: 4 })
        );
    }

    proptest! {
        #[test]
        fn valid_bare_days_always_get_the_standard_window(day in 1u32..=28) {
            let range = resolve(&day.to_string(), mid_march()).unwrap();
            prop_assert_eq!(range.start.time().hour(), START_HOUR);
            prop_assert_eq!(range.end.time().hour(), END_HOUR);
            prop_assert!(range.start <= range.end);
        }

        #[test]
        fn resolution_never_inverts_the_window(a in 1u32..=28, b in 1u32..=28) {
            let range = resolve(&format!("{a} {b}"), mid_march()).unwrap();
            prop_assert!(range.start <= range.end);
        }

        #[test]
        fn resolution_is_idempotent(day in 1u32..=28, month in 1u32..=12) {
            let input = format!("{day:02}.{month:02}");
            let first = resolve(&input, mid_march());
            let second = resolve(&input, mid_march());
            prop_assert_eq!(first, second);
        }
    }
}
