//! Calendar values: date/time types and durations
//!
//! Every calendar datatype parses into a [`DateTimeData`]. Values carrying a
//! timezone offset are normalized to UTC on parse; the fields as written are
//! kept aside so the lexical form can be rendered back. Zoned and unzoned
//! values are only partially ordered: an unzoned value is compared against
//! both ends of the ±14:00 offset range and the result is indeterminate
//! unless both ends agree.

pub mod duration;
pub mod lexical;

use crate::error::Result;
use crate::validators::base::{SchemaVersion, TypeValidator, ValidationContext, ValueOrdering};
use crate::validators::facets::{Facet, FacetMask};
use crate::validators::primitives::PrimitiveKind;
use crate::validators::values::ActualValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt::Write as _;

/// Year used by types without a year component
pub(crate) const DEFAULT_YEAR: i64 = 2000;
/// Month used by types without a month component
pub(crate) const DEFAULT_MONTH: i64 = 1;
/// Day used by types without a day component
pub(crate) const DEFAULT_DAY: i64 = 15;

/// The calendar datatypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarKind {
    /// xs:dateTime
    DateTime,
    /// xs:time
    Time,
    /// xs:date
    Date,
    /// xs:gYearMonth
    GYearMonth,
    /// xs:gYear
    GYear,
    /// xs:gMonthDay
    GMonthDay,
    /// xs:gDay
    GDay,
    /// xs:gMonth
    GMonth,
    /// xs:duration
    Duration,
    /// xs:yearMonthDuration
    YearMonthDuration,
    /// xs:dayTimeDuration
    DayTimeDuration,
}

impl CalendarKind {
    /// Whether the kind is one of the duration types
    pub fn is_duration(&self) -> bool {
        matches!(
            self,
            CalendarKind::Duration | CalendarKind::YearMonthDuration | CalendarKind::DayTimeDuration
        )
    }

    /// Name of the datatype
    pub fn type_name(&self) -> &'static str {
        match self {
            CalendarKind::DateTime => "dateTime",
            CalendarKind::Time => "time",
            CalendarKind::Date => "date",
            CalendarKind::GYearMonth => "gYearMonth",
            CalendarKind::GYear => "gYear",
            CalendarKind::GMonthDay => "gMonthDay",
            CalendarKind::GDay => "gDay",
            CalendarKind::GMonth => "gMonth",
            CalendarKind::Duration => "duration",
            CalendarKind::YearMonthDuration => "yearMonthDuration",
            CalendarKind::DayTimeDuration => "dayTimeDuration",
        }
    }

    /// Primitive kind whose validator handles this calendar kind
    pub fn primitive_kind(&self) -> PrimitiveKind {
        match self {
            CalendarKind::DateTime => PrimitiveKind::DateTime,
            CalendarKind::Time => PrimitiveKind::Time,
            CalendarKind::Date => PrimitiveKind::Date,
            CalendarKind::GYearMonth => PrimitiveKind::GYearMonth,
            CalendarKind::GYear => PrimitiveKind::GYear,
            CalendarKind::GMonthDay => PrimitiveKind::GMonthDay,
            CalendarKind::GDay => PrimitiveKind::GDay,
            CalendarKind::GMonth => PrimitiveKind::GMonth,
            CalendarKind::Duration => PrimitiveKind::Duration,
            CalendarKind::YearMonthDuration => PrimitiveKind::YearMonthDuration,
            CalendarKind::DayTimeDuration => PrimitiveKind::DayTimeDuration,
        }
    }

    /// Number of leading fields (year, month) skipped when ordering
    fn order_start(&self) -> u8 {
        match self {
            CalendarKind::GMonth | CalendarKind::GMonthDay => 1,
            CalendarKind::GDay | CalendarKind::Time => 2,
            _ => 0,
        }
    }
}

/// Timezone state of a calendar value.
///
/// Variant order is the tie-break order used when all fields are equal.
/// Durations reuse `Minus` to mark a negative duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZoneMarker {
    /// No timezone
    Absent,
    /// Positive offset, before normalization
    Plus,
    /// Negative offset, before normalization
    Minus,
    /// UTC
    Utc,
}

/// Date and time fields as written in the literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnnormalizedFields {
    /// Year
    pub year: i64,
    /// Month
    pub month: i64,
    /// Day
    pub day: i64,
    /// Hour
    pub hour: i64,
    /// Minute
    pub minute: i64,
    /// Second
    pub second: Decimal,
}

/// A parsed calendar or duration value
#[derive(Debug, Clone)]
pub struct DateTimeData {
    /// Datatype of the value
    pub kind: CalendarKind,
    /// Year (normalized)
    pub year: i64,
    /// Month (normalized)
    pub month: i64,
    /// Day (normalized)
    pub day: i64,
    /// Hour (normalized)
    pub hour: i64,
    /// Minute (normalized)
    pub minute: i64,
    /// Second with fraction (normalized)
    pub second: Decimal,
    /// Timezone state
    pub utc: ZoneMarker,
    /// Hour part of the original offset, signed
    pub timezone_hour: i64,
    /// Minute part of the original offset, signed
    pub timezone_minute: i64,
    /// False when a non-zero offset has been folded into the fields
    pub normalized: bool,
    /// Fields as written
    pub unnormalized: UnnormalizedFields,
    /// Rules the value was parsed under
    pub version: SchemaVersion,
}

impl DateTimeData {
    /// An all-zero value of the given kind
    pub(crate) fn new(kind: CalendarKind, version: SchemaVersion) -> Self {
        Self {
            kind,
            year: 0,
            month: 0,
            day: 0,
            hour: 0,
            minute: 0,
            second: Decimal::ZERO,
            utc: ZoneMarker::Absent,
            timezone_hour: 0,
            timezone_minute: 0,
            normalized: true,
            unnormalized: UnnormalizedFields {
                year: 0,
                month: 0,
                day: 0,
                hour: 0,
                minute: 0,
                second: Decimal::ZERO,
            },
            version,
        }
    }

    /// Parse a literal of the given kind
    pub fn parse(kind: CalendarKind, lexical: &str, version: SchemaVersion) -> Result<Self> {
        if kind.is_duration() {
            duration::parse_duration(kind, lexical, version)
        } else {
            lexical::parse_calendar(kind, lexical, version)
        }
    }

    /// Whether the value carries a timezone
    pub fn has_timezone(&self) -> bool {
        self.utc != ZoneMarker::Absent
    }

    pub(crate) fn save_unnormalized(&mut self) {
        self.unnormalized = UnnormalizedFields {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        };
    }

    /// Canonical literal: UTC-normalized fields, `Z` when zoned
    pub fn canonical(&self) -> String {
        if self.kind.is_duration() {
            return duration::canonical(self);
        }
        let fields = UnnormalizedFields {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        };
        let zone = if self.has_timezone() { "Z" } else { "" };
        format_fields(self.kind, &fields, zone)
    }

    /// Lexical literal: fields and offset as originally written
    pub fn lexical(&self) -> String {
        if self.kind.is_duration() {
            return duration::canonical(self);
        }
        format_fields(self.kind, &self.unnormalized, &self.timezone_string())
    }

    fn timezone_string(&self) -> String {
        if !self.has_timezone() {
            return String::new();
        }
        if self.timezone_hour == 0 && self.timezone_minute == 0 {
            return "Z".to_string();
        }
        let sign = if self.timezone_hour < 0 || self.timezone_minute < 0 {
            '-'
        } else {
            '+'
        };
        format!(
            "{}{:02}:{:02}",
            sign,
            self.timezone_hour.abs(),
            self.timezone_minute.abs()
        )
    }

    /// Calendar year as chrono counts it (year 0 is 1 BCE)
    fn chrono_year(&self, year: i64) -> Option<i32> {
        let year = if self.version == SchemaVersion::V1_0 && year < 0 {
            year + 1
        } else {
            year
        };
        i32::try_from(year).ok()
    }

    fn chrono_date_time(&self, fields: &UnnormalizedFields) -> Option<NaiveDateTime> {
        let whole = fields.second.trunc();
        let nanos = ((fields.second - whole) * Decimal::from(1_000_000_000u32))
            .trunc()
            .to_u32()?;
        NaiveDate::from_ymd_opt(
            self.chrono_year(fields.year)?,
            u32::try_from(fields.month).ok()?,
            u32::try_from(fields.day).ok()?,
        )?
        .and_hms_nano_opt(
            u32::try_from(fields.hour).ok()?,
            u32::try_from(fields.minute).ok()?,
            whole.to_u32()?,
            nanos,
        )
    }

    /// The dateTime as a naive chrono value (UTC when zoned)
    pub fn to_naive_date_time(&self) -> Option<NaiveDateTime> {
        if self.kind != CalendarKind::DateTime {
            return None;
        }
        let fields = UnnormalizedFields {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        };
        self.chrono_date_time(&fields)
    }

    /// A zoned dateTime as a chrono UTC instant
    pub fn to_date_time_utc(&self) -> Option<DateTime<Utc>> {
        if !self.has_timezone() {
            return None;
        }
        self.to_naive_date_time().map(|naive| naive.and_utc())
    }

    /// The date as written, ignoring any offset
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        if !matches!(self.kind, CalendarKind::Date | CalendarKind::DateTime) {
            return None;
        }
        NaiveDate::from_ymd_opt(
            self.chrono_year(self.unnormalized.year)?,
            u32::try_from(self.unnormalized.month).ok()?,
            u32::try_from(self.unnormalized.day).ok()?,
        )
    }
}

// =============================================================================
// Calendar arithmetic
// =============================================================================

pub(crate) fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Days in a month; month 0 is December of the previous year
pub(crate) fn max_day_in_month_for(year: i64, month: i64) -> i64 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

pub(crate) fn f_quotient(a: i64, b: i64) -> i64 {
    a.div_euclid(b)
}

pub(crate) fn f_quotient_range(temp: i64, low: i64, high: i64) -> i64 {
    f_quotient(temp - low, high - low)
}

pub(crate) fn modulo_range(temp: i64, low: i64, high: i64) -> i64 {
    (temp - low).rem_euclid(high - low) + low
}

/// Fold a non-UTC offset into the fields and mark the value as UTC
pub(crate) fn normalize(date: &mut DateTimeData) {
    let temp = date.minute - date.timezone_minute;
    let carry = f_quotient(temp, 60);
    date.minute = temp.rem_euclid(60);

    let temp = date.hour - date.timezone_hour + carry;
    let carry = f_quotient(temp, 24);
    date.hour = temp.rem_euclid(24);

    date.day += carry;
    loop {
        let max_day = max_day_in_month_for(date.year, date.month);
        let carry = if date.day < 1 {
            date.day += max_day_in_month_for(date.year, date.month - 1);
            -1
        } else if date.day > max_day {
            date.day -= max_day;
            1
        } else {
            break;
        };
        let temp = date.month + carry;
        date.month = modulo_range(temp, 1, 13);
        date.year += f_quotient_range(temp, 1, 13);
        if date.year == 0 && !date.version.allows_year_zero() {
            date.year = if date.timezone_hour < 0 || date.timezone_minute < 0 {
                1
            } else {
                -1
            };
        }
    }
    date.utc = ZoneMarker::Utc;
}

/// Field-by-field order, skipping the fields the kind does not have
pub(crate) fn compare_order(date1: &DateTimeData, date2: &DateTimeData) -> Ordering {
    let start = date1.kind.order_start();
    let mut ordering = Ordering::Equal;
    if start < 1 {
        ordering = date1.year.cmp(&date2.year);
    }
    if start < 2 {
        ordering = ordering.then(date1.month.cmp(&date2.month));
    }
    ordering
        .then(date1.day.cmp(&date2.day))
        .then(date1.hour.cmp(&date2.hour))
        .then(date1.minute.cmp(&date2.minute))
        .then(date1.second.cmp(&date2.second))
        .then(date1.utc.cmp(&date2.utc))
}

fn with_offset(date: &DateTimeData, hours: i64) -> DateTimeData {
    let mut temp = date.clone();
    temp.timezone_hour = hours;
    temp.timezone_minute = 0;
    temp.utc = if hours < 0 {
        ZoneMarker::Minus
    } else {
        ZoneMarker::Plus
    };
    normalize(&mut temp);
    temp
}

/// Order two date/time values of the same kind.
///
/// When exactly one side is zoned the unzoned side is evaluated at +14:00
/// and -14:00. The two branches differ in which side is offset and in which
/// extreme is tried first; both orders are significant at the boundary.
pub fn compare_dates(date1: &DateTimeData, date2: &DateTimeData) -> ValueOrdering {
    if date1.utc == date2.utc {
        return compare_order(date1, date2).into();
    }

    if date1.utc == ZoneMarker::Utc {
        let earliest = with_offset(date2, 14);
        if compare_order(date1, &earliest) == Ordering::Less {
            return ValueOrdering::Less;
        }
        let latest = with_offset(date2, -14);
        if compare_order(date1, &latest) == Ordering::Greater {
            return ValueOrdering::Greater;
        }
        return ValueOrdering::Indeterminate;
    }

    if date2.utc == ZoneMarker::Utc {
        let latest = with_offset(date1, -14);
        if compare_order(&latest, date2) == Ordering::Less {
            return ValueOrdering::Less;
        }
        let earliest = with_offset(date1, 14);
        if compare_order(&earliest, date2) == Ordering::Greater {
            return ValueOrdering::Greater;
        }
        return ValueOrdering::Indeterminate;
    }

    ValueOrdering::Indeterminate
}

// =============================================================================
// Rendering
// =============================================================================

fn push_year(out: &mut String, year: i64) {
    if year < 0 {
        out.push('-');
    }
    let _ = write!(out, "{:04}", year.unsigned_abs());
}

fn push_second(out: &mut String, second: &Decimal) {
    let text = second.normalize().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };
    let _ = write!(out, "{:0>2}", int_part);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }
}

fn push_time(out: &mut String, fields: &UnnormalizedFields) {
    let _ = write!(out, "{:02}:{:02}:", fields.hour, fields.minute);
    push_second(out, &fields.second);
}

fn format_fields(kind: CalendarKind, fields: &UnnormalizedFields, zone: &str) -> String {
    let mut out = String::with_capacity(32);
    match kind {
        CalendarKind::DateTime => {
            push_year(&mut out, fields.year);
            let _ = write!(out, "-{:02}-{:02}T", fields.month, fields.day);
            push_time(&mut out, fields);
        }
        CalendarKind::Time => push_time(&mut out, fields),
        CalendarKind::Date => {
            push_year(&mut out, fields.year);
            let _ = write!(out, "-{:02}-{:02}", fields.month, fields.day);
        }
        CalendarKind::GYearMonth => {
            push_year(&mut out, fields.year);
            let _ = write!(out, "-{:02}", fields.month);
        }
        CalendarKind::GYear => push_year(&mut out, fields.year),
        CalendarKind::GMonthDay => {
            let _ = write!(out, "--{:02}-{:02}", fields.month, fields.day);
        }
        CalendarKind::GDay => {
            let _ = write!(out, "---{:02}", fields.day);
        }
        CalendarKind::GMonth => {
            let _ = write!(out, "--{:02}", fields.month);
        }
        CalendarKind::Duration | CalendarKind::YearMonthDuration | CalendarKind::DayTimeDuration => {}
    }
    out.push_str(zone);
    out
}

// =============================================================================
// Validator
// =============================================================================

pub(crate) const CALENDAR_FACETS: FacetMask = FacetMask::of(&[
    Facet::Pattern,
    Facet::WhiteSpace,
    Facet::Enumeration,
    Facet::MaxInclusive,
    Facet::MaxExclusive,
    Facet::MinInclusive,
    Facet::MinExclusive,
]);

/// Validator for the date/time types
#[derive(Debug)]
pub struct CalendarValidator {
    /// Datatype handled
    pub kind: CalendarKind,
}

impl CalendarValidator {
    fn calendar<'a>(&self, value: &'a ActualValue) -> Option<&'a DateTimeData> {
        match value {
            ActualValue::Calendar(d) if d.kind == self.kind => Some(d),
            _ => None,
        }
    }
}

impl TypeValidator for CalendarValidator {
    fn allowed_facets(&self) -> FacetMask {
        CALENDAR_FACETS
    }

    fn parse(&self, lexical: &str, ctx: &ValidationContext) -> Result<ActualValue> {
        DateTimeData::parse(self.kind, lexical, ctx.version).map(ActualValue::Calendar)
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrdering {
        match (self.calendar(a), self.calendar(b)) {
            (Some(x), Some(y)) => compare_dates(x, y),
            _ => ValueOrdering::Indeterminate,
        }
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        self.compare(a, b) == ValueOrdering::Equal
    }

    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        match (self.calendar(a), self.calendar(b)) {
            (Some(x), Some(y)) => {
                x.timezone_hour == y.timezone_hour
                    && x.timezone_minute == y.timezone_minute
                    && compare_dates(x, y) == ValueOrdering::Equal
            }
            _ => false,
        }
    }
}
