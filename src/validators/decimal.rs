//! xs:decimal and xs:integer values
//!
//! Decimals are only ever compared and rendered, never added, so the value
//! is kept as normalized digit strings rather than a big-number type.

use crate::error::{DatatypeError, Result};
use crate::validators::base::{TypeValidator, ValidationContext, ValueOrdering};
use crate::validators::facets::{Facet, FacetMask};
use crate::validators::values::ActualValue;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A decimal number as sign and digit strings.
///
/// `int_digits` has no leading zeros and `frac_digits` no trailing zeros,
/// so two equal numbers always have identical digit strings.
#[derive(Debug, Clone)]
pub struct XsdDecimal {
    sign: i8,
    int_digits: String,
    frac_digits: String,
    lexical_fraction_digits: usize,
    integer: bool,
}

impl XsdDecimal {
    /// Parse an xs:decimal literal
    pub fn parse(lexical: &str) -> Result<Self> {
        Self::parse_inner(lexical, false)
    }

    /// Parse an xs:integer literal (no decimal point)
    pub fn parse_integer(lexical: &str) -> Result<Self> {
        Self::parse_inner(lexical, true)
    }

    fn parse_inner(lexical: &str, integer: bool) -> Result<Self> {
        let type_name = if integer { "integer" } else { "decimal" };
        let error = || DatatypeError::number(lexical, type_name);

        let (sign, body) = match lexical.as_bytes().first() {
            Some(b'+') => (1i8, &lexical[1..]),
            Some(b'-') => (-1i8, &lexical[1..]),
            Some(_) => (1i8, lexical),
            None => return Err(error().with_reason("empty value").into()),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some(_) if integer => {
                return Err(error().with_reason("decimal point in an integer").into())
            }
            Some((i, f)) => (i, Some(f)),
            None => (body, None),
        };

        if int_part.is_empty() && frac_part.map_or(true, str::is_empty) {
            return Err(error().with_reason("no digits").into());
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
            return Err(error().with_reason("non-digit character").into());
        }

        let frac_part = frac_part.unwrap_or("");
        let int_digits = int_part.trim_start_matches('0').to_string();
        let frac_digits = frac_part.trim_end_matches('0').to_string();
        let sign = if int_digits.is_empty() && frac_digits.is_empty() {
            0
        } else {
            sign
        };

        Ok(Self {
            sign,
            int_digits,
            frac_digits,
            lexical_fraction_digits: frac_part.len(),
            integer,
        })
    }

    /// -1, 0 or 1
    pub fn signum(&self) -> i8 {
        self.sign
    }

    /// Whether the value came from an integer-derived type
    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// Integer digits without leading zeros
    pub fn int_digits(&self) -> &str {
        &self.int_digits
    }

    /// Fraction digits without trailing zeros
    pub fn frac_digits(&self) -> &str {
        &self.frac_digits
    }

    /// Fraction digits as written, trailing zeros included
    pub fn fraction_digits(&self) -> usize {
        self.lexical_fraction_digits
    }

    /// Integer digits plus fraction digits as written; zero counts one digit
    pub fn total_digits(&self) -> usize {
        let total = self.int_digits.len() + self.lexical_fraction_digits;
        total.max(1)
    }

    fn magnitude_cmp(&self, other: &Self) -> Ordering {
        self.int_digits
            .len()
            .cmp(&other.int_digits.len())
            .then_with(|| self.int_digits.cmp(&other.int_digits))
            .then_with(|| self.frac_digits.cmp(&other.frac_digits))
    }

    /// Canonical literal: `0`, `-12` for integers, `0.0`, `-1.5` for decimals
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        if self.sign < 0 {
            out.push('-');
        }
        if self.int_digits.is_empty() {
            out.push('0');
        } else {
            out.push_str(&self.int_digits);
        }
        if !self.integer {
            out.push('.');
            if self.frac_digits.is_empty() {
                out.push('0');
            } else {
                out.push_str(&self.frac_digits);
            }
        }
        out
    }
}

impl PartialEq for XsdDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for XsdDecimal {}

impl Ord for XsdDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.sign.cmp(&other.sign) {
            Ordering::Equal if self.sign == 0 => Ordering::Equal,
            Ordering::Equal if self.sign < 0 => self.magnitude_cmp(other).reverse(),
            Ordering::Equal => self.magnitude_cmp(other),
            unequal => unequal,
        }
    }
}

impl PartialOrd for XsdDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for XsdDecimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sign.hash(state);
        self.int_digits.hash(state);
        self.frac_digits.hash(state);
    }
}

impl fmt::Display for XsdDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Validator for xs:decimal, and with `integer` set for xs:integer
#[derive(Debug)]
pub struct DecimalValidator {
    /// Reject a decimal point
    pub integer: bool,
}

impl TypeValidator for DecimalValidator {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::of(&[
            Facet::Pattern,
            Facet::WhiteSpace,
            Facet::Enumeration,
            Facet::MaxInclusive,
            Facet::MaxExclusive,
            Facet::MinInclusive,
            Facet::MinExclusive,
            Facet::TotalDigits,
            Facet::FractionDigits,
        ])
    }

    fn parse(&self, lexical: &str, _ctx: &ValidationContext) -> Result<ActualValue> {
        let value = if self.integer {
            XsdDecimal::parse_integer(lexical)?
        } else {
            XsdDecimal::parse(lexical)?
        };
        Ok(ActualValue::Decimal(value))
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrdering {
        match (a, b) {
            (ActualValue::Decimal(x), ActualValue::Decimal(y)) => x.cmp(y).into(),
            _ => ValueOrdering::Indeterminate,
        }
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        self.compare(a, b) == ValueOrdering::Equal
    }

    fn total_digits(&self, value: &ActualValue) -> usize {
        match value {
            ActualValue::Decimal(d) => d.total_digits(),
            _ => 0,
        }
    }

    fn fraction_digits(&self, value: &ActualValue) -> usize {
        match value {
            ActualValue::Decimal(d) => d.fraction_digits(),
            _ => 0,
        }
    }
}
