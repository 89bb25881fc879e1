//! Lexical scanning of date/time literals
//!
//! All positions are byte offsets. Only ASCII is meaningful in a calendar
//! literal, so any other byte simply fails the digit or separator checks.

use super::{
    max_day_in_month_for, normalize, CalendarKind, DateTimeData, ZoneMarker, DEFAULT_DAY,
    DEFAULT_MONTH, DEFAULT_YEAR,
};
use crate::error::{DatatypeError, Error, Result};
use crate::validators::base::SchemaVersion;
use rust_decimal::Decimal;

/// Fraction digits kept for seconds; further digits are dropped.
const MAX_SECOND_FRACTION_DIGITS: usize = 20;

/// Byte scanner over one literal
pub(crate) struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    type_name: &'static str,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(text: &'a str, type_name: &'static str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            type_name,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> Option<&'a str> {
        self.text.get(start..end)
    }

    pub(crate) fn at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> Error {
        DatatypeError::date_time(self.text, self.type_name)
            .with_reason(reason)
            .into()
    }

    pub(crate) fn expect(&self, pos: usize, expected: u8) -> Result<()> {
        if self.at(pos) == Some(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}' at offset {}", expected as char, pos)))
        }
    }

    pub(crate) fn index_of(&self, start: usize, end: usize, ch: u8) -> Option<usize> {
        (start..end.min(self.len())).find(|&i| self.bytes[i] == ch)
    }

    fn find_utc_sign(&self, start: usize, end: usize) -> Option<usize> {
        (start..end.min(self.len())).find(|&i| matches!(self.bytes[i], b'Z' | b'+' | b'-'))
    }

    fn is_utc_sign_at(&self, pos: usize, end: usize) -> bool {
        pos < end && matches!(self.at(pos), Some(b'Z' | b'+' | b'-'))
    }

    /// Unsigned decimal digits in `start..end`; at least one digit, at most
    /// the range of a 32-bit integer
    pub(crate) fn parse_int(&self, start: usize, end: usize) -> Result<i64> {
        self.parse_int_max(start, end, i64::from(i32::MAX))
    }

    /// Unsigned integer in `start..end`, rejected once it exceeds `max`
    pub(crate) fn parse_int_max(&self, start: usize, end: usize, max: i64) -> Result<i64> {
        if start >= end || end > self.len() {
            return Err(self.error("missing digits"));
        }
        let mut value: i64 = 0;
        for &b in &self.bytes[start..end] {
            if !b.is_ascii_digit() {
                return Err(self.error(format!("'{}' is not a digit", b as char)));
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(b - b'0')))
                .filter(|v| *v <= max)
                .ok_or_else(|| self.error("number out of range"))?;
        }
        Ok(value)
    }

    /// Year in `start..end` with an optional leading '-'
    fn parse_year(&self, start: usize, end: usize) -> Result<i64> {
        if self.at(start) == Some(b'-') {
            Ok(-self.parse_int(start + 1, end)?)
        } else {
            self.parse_int(start, end)
        }
    }

    /// Four or more year digits; more than four may not start with '0'
    fn check_year_digits(&self, digits_start: usize, end: usize) -> Result<()> {
        let length = end.saturating_sub(digits_start);
        if length < 4 {
            return Err(self.error("year must have at least 4 digits"));
        }
        if length > 4 && self.at(digits_start) == Some(b'0') {
            return Err(self.error("leading zeros are only allowed in a 4-digit year"));
        }
        Ok(())
    }

    /// `[-]YYYY-MM`; returns the offset after the month
    fn get_year_month(&self, start: usize, end: usize, date: &mut DateTimeData) -> Result<usize> {
        let digits_start = if self.at(start) == Some(b'-') {
            start + 1
        } else {
            start
        };
        let year_end = self
            .index_of(digits_start, end, b'-')
            .ok_or_else(|| self.error("year must be followed by '-'"))?;
        self.check_year_digits(digits_start, year_end)?;
        date.year = self.parse_year(start, year_end)?;

        let month_start = year_end + 1;
        let month_end = month_start + 2;
        date.month = self.parse_int(month_start, month_end)?;
        Ok(month_end)
    }

    /// `[-]YYYY-MM-DD`; returns the offset after the day
    fn get_date(&self, start: usize, end: usize, date: &mut DateTimeData) -> Result<usize> {
        let month_end = self.get_year_month(start, end, date)?;
        self.expect(month_end, b'-')?;
        let day_start = month_end + 1;
        date.day = self.parse_int(day_start, day_start + 2)?;
        Ok(day_start + 2)
    }

    /// `hh:mm:ss[.s+]` followed by an optional timezone, up to `end`
    fn get_time(&self, start: usize, end: usize, date: &mut DateTimeData) -> Result<()> {
        date.hour = self.parse_int(start, start + 2)?;
        self.expect(start + 2, b':')?;
        let minute_start = start + 3;
        date.minute = self.parse_int(minute_start, minute_start + 2)?;
        self.expect(minute_start + 2, b':')?;

        let sign = self.find_utc_sign(minute_start, end);
        let second_start = minute_start + 3;
        date.second = self.parse_second(second_start, sign.unwrap_or(end))?;

        if let Some(sign) = sign {
            self.get_time_zone(date, sign, end)?;
        }
        Ok(())
    }

    /// `ss` or `ss.f+`
    fn parse_second(&self, start: usize, end: usize) -> Result<Decimal> {
        if end > self.len() || start >= end {
            return Err(self.error("missing seconds"));
        }
        let field = &self.text[start..end];
        let (int_part, frac_part) = match field.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (field, None),
        };
        if int_part.len() != 2 || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.error("seconds must have exactly 2 integer digits"));
        }
        let frac = match frac_part {
            Some(f) if f.is_empty() => {
                return Err(self.error("'.' must be followed by at least one digit"))
            }
            Some(f) if !f.bytes().all(|b| b.is_ascii_digit()) => {
                return Err(self.error("invalid fractional seconds"))
            }
            Some(f) => &f[..f.len().min(MAX_SECOND_FRACTION_DIGITS)],
            None => "",
        };
        let literal = if frac.is_empty() {
            int_part.to_string()
        } else {
            format!("{}.{}", int_part, frac)
        };
        literal
            .parse::<Decimal>()
            .map_err(|e| self.error(e.to_string()))
    }

    /// `Z` or `(+|-)hh:mm` starting at `sign` and ending exactly at `end`
    fn get_time_zone(&self, date: &mut DateTimeData, sign: usize, end: usize) -> Result<()> {
        match self.at(sign) {
            Some(b'Z') => {
                date.utc = ZoneMarker::Utc;
                if end > sign + 1 {
                    return Err(self.error("'Z' must end the literal"));
                }
                return Ok(());
            }
            Some(b'+') => date.utc = ZoneMarker::Plus,
            Some(b'-') => date.utc = ZoneMarker::Minus,
            _ => return Err(self.error("expected a timezone")),
        }
        if sign + 6 != end {
            return Err(self.error("timezone must have the form (+|-)hh:mm"));
        }
        let negate = if date.utc == ZoneMarker::Minus { -1 } else { 1 };
        date.timezone_hour = negate * self.parse_int(sign + 1, sign + 3)?;
        self.expect(sign + 3, b':')?;
        date.timezone_minute = negate * self.parse_int(sign + 4, sign + 6)?;
        if date.timezone_hour != 0 || date.timezone_minute != 0 {
            date.normalized = false;
        }
        Ok(())
    }

    /// Optional timezone filling `start..end` exactly
    fn parse_time_zone(&self, start: usize, end: usize, date: &mut DateTimeData) -> Result<()> {
        if start < end {
            if !self.is_utc_sign_at(start, end) {
                return Err(self.error("unexpected characters after the value"));
            }
            self.get_time_zone(date, start, end)?;
        }
        Ok(())
    }
}

/// Range checks shared by every calendar kind; also resolves `24:00:00`
pub(crate) fn validate_date_time(scanner: &Scanner<'_>, date: &mut DateTimeData) -> Result<()> {
    let allows_year_zero = date.version.allows_year_zero();
    if date.year == 0 && !allows_year_zero {
        return Err(scanner.error("year 0000 is not allowed"));
    }
    if !(1..=12).contains(&date.month) {
        return Err(scanner.error("month must be between 01 and 12"));
    }
    if date.day > max_day_in_month_for(date.year, date.month) || date.day < 1 {
        return Err(scanner.error("day is out of range for the month"));
    }

    if date.hour > 23 || date.hour < 0 {
        if date.hour == 24 && date.minute == 0 && date.second.is_zero() {
            date.hour = 0;
            date.day += 1;
            if date.day > max_day_in_month_for(date.year, date.month) {
                date.day = 1;
                date.month += 1;
                if date.month > 12 {
                    date.month = 1;
                    date.year += 1;
                    if date.year == 0 && !allows_year_zero {
                        date.year = 1;
                    }
                }
            }
        } else {
            return Err(scanner.error("hour must be between 00 and 23, or 24:00:00"));
        }
    }
    if date.minute > 59 || date.minute < 0 {
        return Err(scanner.error("minute must be between 00 and 59"));
    }
    if date.second >= Decimal::from(60) || date.second.is_sign_negative() {
        return Err(scanner.error("second must be less than 60"));
    }

    if date.timezone_hour > 14 || date.timezone_hour < -14 {
        return Err(scanner.error("timezone hour must be between -14 and 14"));
    }
    if (date.timezone_hour == 14 || date.timezone_hour == -14) && date.timezone_minute != 0 {
        return Err(scanner.error("timezone must be between -14:00 and +14:00"));
    }
    if date.timezone_minute > 59 || date.timezone_minute < -59 {
        return Err(scanner.error("timezone minute must be between 00 and 59"));
    }
    Ok(())
}

fn finish(scanner: &Scanner<'_>, mut date: DateTimeData) -> Result<DateTimeData> {
    validate_date_time(scanner, &mut date)?;
    date.save_unnormalized();
    if date.utc != ZoneMarker::Absent && date.utc != ZoneMarker::Utc {
        normalize(&mut date);
    }
    if date.kind == CalendarKind::Time {
        // A time has no day; the carry from normalization or 24:00:00 is dropped.
        date.day = DEFAULT_DAY;
    }
    Ok(date)
}

/// Parse a literal of one of the date/time kinds
pub(crate) fn parse_calendar(
    kind: CalendarKind,
    lexical: &str,
    version: SchemaVersion,
) -> Result<DateTimeData> {
    let scanner = Scanner::new(lexical, kind.type_name());
    let len = scanner.len();
    let mut date = DateTimeData::new(kind, version);

    match kind {
        CalendarKind::DateTime => {
            let date_end = scanner
                .index_of(0, len, b'T')
                .ok_or_else(|| scanner.error("missing 'T' separator"))?;
            let end = scanner.get_date(0, date_end, &mut date)?;
            if end != date_end {
                return Err(scanner.error("date part must end at 'T'"));
            }
            scanner.get_time(date_end + 1, len, &mut date)?;
        }
        CalendarKind::Date => {
            let end = scanner.get_date(0, len, &mut date)?;
            scanner.parse_time_zone(end, len, &mut date)?;
        }
        CalendarKind::Time => {
            date.year = DEFAULT_YEAR;
            date.month = DEFAULT_MONTH;
            date.day = DEFAULT_DAY;
            scanner.get_time(0, len, &mut date)?;
        }
        CalendarKind::GYearMonth => {
            let end = scanner.get_year_month(0, len, &mut date)?;
            date.day = 1;
            scanner.parse_time_zone(end, len, &mut date)?;
        }
        CalendarKind::GYear => {
            let digits_start = usize::from(scanner.at(0) == Some(b'-'));
            let end = scanner.find_utc_sign(digits_start, len).unwrap_or(len);
            scanner.check_year_digits(digits_start, end)?;
            date.year = scanner.parse_year(0, end)?;
            date.month = DEFAULT_MONTH;
            date.day = 1;
            scanner.parse_time_zone(end, len, &mut date)?;
        }
        CalendarKind::GMonthDay => {
            scanner.expect(0, b'-')?;
            scanner.expect(1, b'-')?;
            date.year = DEFAULT_YEAR;
            date.month = scanner.parse_int(2, 4)?;
            scanner.expect(4, b'-')?;
            date.day = scanner.parse_int(5, 7)?;
            scanner.parse_time_zone(7, len, &mut date)?;
        }
        CalendarKind::GDay => {
            for pos in 0..3 {
                scanner.expect(pos, b'-')?;
            }
            date.year = DEFAULT_YEAR;
            date.month = DEFAULT_MONTH;
            date.day = scanner.parse_int(3, 5)?;
            scanner.parse_time_zone(5, len, &mut date)?;
        }
        CalendarKind::GMonth => {
            scanner.expect(0, b'-')?;
            scanner.expect(1, b'-')?;
            date.year = DEFAULT_YEAR;
            date.month = scanner.parse_int(2, 4)?;
            date.day = DEFAULT_DAY;
            scanner.parse_time_zone(4, len, &mut date)?;
        }
        CalendarKind::Duration | CalendarKind::YearMonthDuration | CalendarKind::DayTimeDuration => {
            return Err(scanner.error("not a date/time type"));
        }
    }

    finish(&scanner, date)
}
