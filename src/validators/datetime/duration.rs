//! xs:duration, xs:yearMonthDuration and xs:dayTimeDuration
//!
//! Durations are only partially ordered. Two durations are compared by
//! adding each to four reference instants chosen to expose every month
//! length and leap-year combination; they are ordered only if all four
//! sums agree.

use super::lexical::Scanner;
use super::{
    compare_order, f_quotient, f_quotient_range, max_day_in_month_for, modulo_range,
    CalendarKind, DateTimeData, ZoneMarker, CALENDAR_FACETS,
};
use crate::error::Result;
use crate::validators::base::{SchemaVersion, TypeValidator, ValidationContext, ValueOrdering};
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;
use once_cell::sync::Lazy;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt::Write as _;

/// Days in 400 Gregorian years
const DAYS_PER_CYCLE: i64 = 146_097;

const SECONDS_PER_DAY: i64 = 86_400;

/// Largest magnitude accepted for any duration field, for the total number
/// of months and for the total number of seconds. Canonical literals stay
/// within it, so they always parse back.
pub const DURATION_LIMIT: i64 = 999_999_999_999_999_999;

/// Integer digits allowed in the seconds field
const SECONDS_DIGITS: usize = 18;

static REFERENCE_DATES: Lazy<[DateTimeData; 4]> = Lazy::new(|| {
    [
        reference_date(1696, 9),
        reference_date(1697, 2),
        reference_date(1903, 3),
        reference_date(1903, 7),
    ]
});

fn reference_date(year: i64, month: i64) -> DateTimeData {
    let mut date = DateTimeData::new(CalendarKind::DateTime, SchemaVersion::V1_0);
    date.year = year;
    date.month = month;
    date.day = 1;
    date.utc = ZoneMarker::Utc;
    date.save_unnormalized();
    date
}

/// Parse a duration literal; the kind selects which designators are allowed
pub(crate) fn parse_duration(
    kind: CalendarKind,
    lexical: &str,
    version: SchemaVersion,
) -> Result<DateTimeData> {
    let scanner = Scanner::new(lexical, kind.type_name());
    let len = scanner.len();
    let mut date = DateTimeData::new(kind, version);

    let mut start = match scanner.at(0) {
        Some(b'P') => 1,
        Some(b'-') => {
            scanner.expect(1, b'P')?;
            date.utc = ZoneMarker::Minus;
            2
        }
        _ => return Err(scanner.error("a duration must start with 'P' or '-P'")),
    };
    let negate = if date.utc == ZoneMarker::Minus { -1 } else { 1 };
    let mut designator = false;

    let date_end = match scanner.index_of(start, len, b'T') {
        Some(_) if kind == CalendarKind::YearMonthDuration => {
            return Err(scanner.error("yearMonthDuration has no time part"))
        }
        Some(pos) => pos,
        None => len,
    };

    for (marker, field) in [(b'Y', 0usize), (b'M', 1), (b'D', 2)] {
        if let Some(end) = scanner.index_of(start, date_end, marker) {
            match (kind, marker) {
                (CalendarKind::DayTimeDuration, b'Y' | b'M') => {
                    return Err(scanner.error("dayTimeDuration has no year or month part"))
                }
                (CalendarKind::YearMonthDuration, b'D') => {
                    return Err(scanner.error("yearMonthDuration has no day part"))
                }
                _ => {}
            }
            let value = negate * scanner.parse_int_max(start, end, DURATION_LIMIT)?;
            match field {
                0 => date.year = value,
                1 => date.month = value,
                _ => date.day = value,
            }
            start = end + 1;
            designator = true;
        }
    }

    if start != date_end {
        return Err(scanner.error("unexpected characters in the date part"));
    }

    if date_end != len {
        start += 1;
        for (marker, field) in [(b'H', 0usize), (b'M', 1)] {
            if let Some(end) = scanner.index_of(start, len, marker) {
                let value = negate * scanner.parse_int_max(start, end, DURATION_LIMIT)?;
                if field == 0 {
                    date.hour = value;
                } else {
                    date.minute = value;
                }
                start = end + 1;
                designator = true;
            }
        }
        if let Some(end) = scanner.index_of(start, len, b'S') {
            let seconds = parse_duration_second(&scanner, start, end)?;
            date.second = if negate < 0 { -seconds } else { seconds };
            start = end + 1;
            designator = true;
        }
        if start != len || scanner.at(start - 1) == Some(b'T') {
            return Err(scanner.error("malformed time part"));
        }
    }

    if !designator {
        return Err(scanner.error("at least one field is required"));
    }
    check_totals(&scanner, &date)?;
    date.save_unnormalized();
    Ok(date)
}

fn check_totals(scanner: &Scanner<'_>, date: &DateTimeData) -> Result<()> {
    let limit = i128::from(DURATION_LIMIT);
    let months = i128::from(date.year) * 12 + i128::from(date.month);
    if months.abs() > limit {
        return Err(scanner.error("total months out of range"));
    }
    let whole_seconds = date.second.trunc().to_i128().unwrap_or(i128::MAX);
    let seconds = i128::from(date.day) * i128::from(SECONDS_PER_DAY)
        + i128::from(date.hour) * 3600
        + i128::from(date.minute) * 60
        + whole_seconds;
    if seconds.abs() > limit {
        return Err(scanner.error("total seconds out of range"));
    }
    Ok(())
}

fn parse_duration_second(scanner: &Scanner<'_>, start: usize, end: usize) -> Result<Decimal> {
    let field = scanner
        .slice(start, end)
        .filter(|field| !field.is_empty())
        .ok_or_else(|| scanner.error("missing seconds"))?;
    let mut dot = None;
    for (i, b) in field.bytes().enumerate() {
        match b {
            b'0'..=b'9' => {}
            b'.' if dot.is_none() => dot = Some(i),
            _ => return Err(scanner.error("invalid seconds")),
        }
    }
    let literal = match dot {
        Some(pos) if pos + 1 == field.len() => {
            return Err(scanner.error("'.' must be followed by at least one digit"))
        }
        Some(0) => format!("0{}", field),
        _ => field.to_string(),
    };
    let integer = literal.split('.').next().unwrap_or_default();
    if integer.trim_start_matches('0').len() > SECONDS_DIGITS {
        return Err(scanner.error("seconds out of range"));
    }
    literal
        .parse::<Decimal>()
        .map_err(|_| scanner.error("too many digits in seconds"))
}

/// Split `value` into a floored quotient and a non-negative remainder
fn div_floor(value: Decimal, divisor: Decimal) -> (Decimal, Decimal) {
    let mut remainder = value % divisor;
    if remainder.is_sign_negative() && !remainder.is_zero() {
        remainder += divisor;
    }
    ((value - remainder) / divisor, remainder)
}

/// Add a duration to a reference instant
pub(crate) fn add_duration(reference: &DateTimeData, duration: &DateTimeData) -> DateTimeData {
    let mut result = DateTimeData::new(CalendarKind::DateTime, reference.version);

    let temp = reference.month + duration.month;
    result.month = modulo_range(temp, 1, 13);
    result.year = reference.year + duration.year + f_quotient_range(temp, 1, 13);

    let (carry, second) = div_floor(reference.second + duration.second, Decimal::from(60));
    result.second = second;
    // Parsed seconds stay within DURATION_LIMIT, so the carry fits.
    let carry = carry.to_i64().unwrap_or(0);

    let temp = reference.minute + duration.minute + carry;
    let carry = f_quotient(temp, 60);
    result.minute = temp.rem_euclid(60);

    let temp = reference.hour + duration.hour + carry;
    let carry = f_quotient(temp, 24);
    result.hour = temp.rem_euclid(24);

    result.day = reference.day + duration.day + carry;

    // Every 400-year cycle has the same number of days.
    if result.day.abs() > DAYS_PER_CYCLE {
        let cycles = result.day.div_euclid(DAYS_PER_CYCLE);
        result.year += 400 * cycles;
        result.day -= DAYS_PER_CYCLE * cycles;
    }

    loop {
        let max_day = max_day_in_month_for(result.year, result.month);
        let carry = if result.day < 1 {
            result.day += max_day_in_month_for(result.year, result.month - 1);
            -1
        } else if result.day > max_day {
            result.day -= max_day;
            1
        } else {
            break;
        };
        let temp = result.month + carry;
        result.month = modulo_range(temp, 1, 13);
        result.year += f_quotient_range(temp, 1, 13);
    }

    result.utc = ZoneMarker::Utc;
    result
}

fn combine(previous: ValueOrdering, next: ValueOrdering, strict: bool) -> ValueOrdering {
    if previous == ValueOrdering::Indeterminate || next == ValueOrdering::Indeterminate {
        return ValueOrdering::Indeterminate;
    }
    if previous != next && strict {
        return ValueOrdering::Indeterminate;
    }
    if previous != next && !strict {
        if previous != ValueOrdering::Equal && next != ValueOrdering::Equal {
            return ValueOrdering::Indeterminate;
        }
        return if previous == ValueOrdering::Equal {
            next
        } else {
            previous
        };
    }
    next
}

/// Order two durations.
///
/// With `strict` any disagreement between reference instants makes the
/// result indeterminate; without it an `Equal` result on some instants
/// yields to the ordering found on the others.
pub fn compare_durations(
    duration1: &DateTimeData,
    duration2: &DateTimeData,
    strict: bool,
) -> ValueOrdering {
    if compare_order(duration1, duration2) == Ordering::Equal {
        return ValueOrdering::Equal;
    }

    let mut result: Option<ValueOrdering> = None;
    for reference in REFERENCE_DATES.iter() {
        let sum1 = add_duration(reference, duration1);
        let sum2 = add_duration(reference, duration2);
        let ordering = ValueOrdering::from(compare_order(&sum1, &sum2));
        let combined = match result {
            None => ordering,
            Some(previous) => combine(previous, ordering, strict),
        };
        if combined == ValueOrdering::Indeterminate {
            return ValueOrdering::Indeterminate;
        }
        result = Some(combined);
    }
    result.unwrap_or(ValueOrdering::Indeterminate)
}

/// Total months and total seconds of a duration
pub fn duration_totals(duration: &DateTimeData) -> (i64, Decimal) {
    let months = duration.year * 12 + duration.month;
    let whole = duration.day * SECONDS_PER_DAY + duration.hour * 3600 + duration.minute * 60;
    let seconds = Decimal::from(whole) + duration.second;
    (months, seconds)
}

/// Canonical literal: months folded into years, seconds into days, hours
/// and minutes, zero fields omitted
pub(crate) fn canonical(duration: &DateTimeData) -> String {
    let (months, seconds) = duration_totals(duration);
    if months == 0 && seconds.is_zero() {
        return if duration.kind == CalendarKind::YearMonthDuration {
            "P0M".to_string()
        } else {
            "PT0S".to_string()
        };
    }

    let mut out = String::with_capacity(24);
    if months < 0 || seconds.is_sign_negative() {
        out.push('-');
    }
    out.push('P');

    let months = months.abs();
    if months / 12 > 0 {
        let _ = write!(out, "{}Y", months / 12);
    }
    if months % 12 > 0 {
        let _ = write!(out, "{}M", months % 12);
    }

    let (days, rest) = div_floor(seconds.abs(), Decimal::from(SECONDS_PER_DAY));
    let (hours, rest) = div_floor(rest, Decimal::from(3600));
    let (minutes, secs) = div_floor(rest, Decimal::from(60));

    if !days.is_zero() {
        let _ = write!(out, "{}D", days.normalize());
    }
    if !hours.is_zero() || !minutes.is_zero() || !secs.is_zero() {
        out.push('T');
        if !hours.is_zero() {
            let _ = write!(out, "{}H", hours.normalize());
        }
        if !minutes.is_zero() {
            let _ = write!(out, "{}M", minutes.normalize());
        }
        if !secs.is_zero() {
            let _ = write!(out, "{}S", secs.normalize());
        }
    }
    out
}

/// Validator for the three duration types
#[derive(Debug)]
pub struct DurationValidator {
    /// Duration flavour handled
    pub kind: CalendarKind,
}

impl DurationValidator {
    fn duration<'a>(&self, value: &'a ActualValue) -> Option<&'a DateTimeData> {
        match value {
            ActualValue::Calendar(d) if d.kind.is_duration() => Some(d),
            _ => None,
        }
    }
}

impl TypeValidator for DurationValidator {
    fn allowed_facets(&self) -> FacetMask {
        CALENDAR_FACETS
    }

    fn parse(&self, lexical: &str, ctx: &ValidationContext) -> Result<ActualValue> {
        parse_duration(self.kind, lexical, ctx.version).map(ActualValue::Calendar)
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrdering {
        match (self.duration(a), self.duration(b)) {
            (Some(x), Some(y)) => compare_durations(x, y, true),
            _ => ValueOrdering::Indeterminate,
        }
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        self.compare(a, b) == ValueOrdering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dur(s: &str) -> DateTimeData {
        parse_duration(CalendarKind::Duration, s, SchemaVersion::V1_0).unwrap()
    }

    fn cmp(a: &str, b: &str) -> ValueOrdering {
        compare_durations(&dur(a), &dur(b), true)
    }

    #[test]
    fn test_parse_fields() {
        let d = dur("P1Y2M3DT10H30M12.3S");
        assert_eq!((d.year, d.month, d.day, d.hour, d.minute), (1, 2, 3, 10, 30));
        assert_eq!(d.second, Decimal::new(123, 1));

        let n = dur("-P1DT1S");
        assert_eq!(n.utc, ZoneMarker::Minus);
        assert_eq!((n.day, n.second), (-1, Decimal::from(-1)));
    }

    #[test]
    fn test_parse_invalid() {
        for bad in [
            "", "P", "PT", "P1YT", "1Y", "-1Y", "P-1Y", "P1S", "PT1Y", "P1Y2", "P1Y2T1H", "PT1.S",
            "PT1H2", "P1M1Y", "P T1H", "PT1,5S",
        ] {
            assert!(
                parse_duration(CalendarKind::Duration, bad, SchemaVersion::V1_0).is_err(),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_leading_dot_seconds() {
        assert_eq!(dur("PT.5S").second, Decimal::new(5, 1));
    }

    #[test]
    fn test_restricted_flavours() {
        let ym = |s: &str| parse_duration(CalendarKind::YearMonthDuration, s, SchemaVersion::V1_1);
        let dt = |s: &str| parse_duration(CalendarKind::DayTimeDuration, s, SchemaVersion::V1_1);
        assert!(ym("P1Y2M").is_ok());
        assert!(ym("-P14M").is_ok());
        assert!(ym("P1D").is_err());
        assert!(ym("P1YT1H").is_err());
        assert!(dt("P1DT2H").is_ok());
        assert!(dt("PT36H").is_ok());
        assert!(dt("P1M").is_err());
        assert!(dt("P1Y1D").is_err());
    }

    #[test]
    fn test_equal_across_units() {
        assert_eq!(cmp("P1Y", "P12M"), ValueOrdering::Equal);
        assert_eq!(cmp("P1D", "PT24H"), ValueOrdering::Equal);
        assert_eq!(cmp("PT1H", "PT60M"), ValueOrdering::Equal);
        assert_eq!(cmp("PT1M", "PT60S"), ValueOrdering::Equal);
    }

    #[test]
    fn test_ordered_durations() {
        assert_eq!(cmp("P1Y", "P13M"), ValueOrdering::Less);
        assert_eq!(cmp("P2Y", "P1Y11M"), ValueOrdering::Greater);
        assert_eq!(cmp("-P1D", "PT1S"), ValueOrdering::Less);
        assert_eq!(cmp("P400Y", "P146096D"), ValueOrdering::Greater);
        assert_eq!(cmp("P400Y", "P146097D"), ValueOrdering::Equal);
    }

    #[test]
    fn test_indeterminate_durations() {
        assert_eq!(cmp("P1M", "P30D"), ValueOrdering::Indeterminate);
        assert_eq!(cmp("P1Y", "P365D"), ValueOrdering::Indeterminate);
        assert_eq!(cmp("P5M", "P153D"), ValueOrdering::Indeterminate);
        assert_eq!(cmp("P1M", "P32D"), ValueOrdering::Less);
    }

    #[test]
    fn test_non_strict_lets_equal_yield() {
        // Equal on the 31-day reference months, longer on the others.
        let a = dur("P1M");
        let b = dur("P31D");
        assert_eq!(compare_durations(&a, &b, true), ValueOrdering::Indeterminate);
        assert_eq!(compare_durations(&a, &b, false), ValueOrdering::Less);
    }

    #[test]
    fn test_add_duration_crosses_months() {
        let reference = reference_date(1697, 2);
        let sum = add_duration(&reference, &dur("P28DT24H"));
        assert_eq!((sum.year, sum.month, sum.day), (1697, 3, 2));

        let back = add_duration(&reference, &dur("-P1D"));
        assert_eq!((back.year, back.month, back.day), (1697, 1, 31));
    }

    fn rejection_reason(s: &str) -> String {
        match parse_duration(CalendarKind::Duration, s, SchemaVersion::V1_0) {
            Err(crate::error::Error::Datatype(e)) => e.reason.unwrap_or_default(),
            other => panic!("{:?} should be rejected, got {:?}", s, other),
        }
    }

    #[test]
    fn test_seconds_beyond_limit_are_rejected() {
        assert_eq!(rejection_reason("PT100000000000000000000000S"), "seconds out of range");
        assert_eq!(rejection_reason("PT200000000000000000000000S"), "seconds out of range");
        assert_eq!(
            rejection_reason("PT99999999999999999999999999999S"),
            "seconds out of range"
        );
        assert_eq!(rejection_reason("P1000000000000000000Y"), "number out of range");
        assert_eq!(rejection_reason("P100000000000000000Y"), "total months out of range");
        assert_eq!(rejection_reason("P11574074074075D"), "total seconds out of range");
        assert_eq!(dur("PT000000000000000000001S").second, Decimal::ONE);
    }

    #[test]
    fn test_large_seconds_keep_their_carry() {
        let largest = "PT999999999999999999S";
        assert_eq!(cmp("PT999999999999999998S", largest), ValueOrdering::Less);
        assert_eq!(cmp(largest, "PT999999999999999998S"), ValueOrdering::Greater);
        assert_eq!(cmp(largest, "P1D"), ValueOrdering::Greater);
        assert_eq!(cmp("-PT999999999999999999S", "-P1D"), ValueOrdering::Less);

        let canonical = dur(largest).canonical();
        assert_eq!(canonical, "P11574074074074DT1H46M39S");
        assert_eq!(dur(&canonical).canonical(), canonical);
        assert_eq!(cmp(&canonical, largest), ValueOrdering::Equal);
        assert_eq!(dur("PT999999999999999999.25S").canonical(), "P11574074074074DT1H46M39.25S");
    }

    #[test]
    fn test_canonical() {
        assert_eq!(dur("P12M").canonical(), "P1Y");
        assert_eq!(dur("PT36H").canonical(), "P1DT12H");
        assert_eq!(dur("P0Y0M0DT0H0M0S").canonical(), "PT0S");
        assert_eq!(dur("-P1Y13M").canonical(), "-P2Y1M");
        assert_eq!(dur("PT90.50S").canonical(), "PT1M30.5S");
        assert_eq!(
            parse_duration(CalendarKind::YearMonthDuration, "P0Y", SchemaVersion::V1_1)
                .unwrap()
                .canonical(),
            "P0M"
        );
    }
}
