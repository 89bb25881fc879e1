//! xs:precisionDecimal values (XSD 1.1)
//!
//! A finite value is `digits × 10^-scale`. Trailing zeros are kept because
//! they carry the arithmetic precision: `1.50` and `1.5` are equal but not
//! identical.

use crate::error::{DatatypeError, Result};
use crate::validators::base::{TypeValidator, ValidationContext, ValueOrdering};
use crate::validators::facets::{Facet, FacetMask};
use crate::validators::values::ActualValue;
use std::cmp::Ordering;
use std::fmt;

/// An xs:precisionDecimal value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrecisionDecimal {
    /// A finite number
    Finite {
        /// Sign of the literal, kept for negative zero
        negative: bool,
        /// Significant digits without leading zeros, empty for zero
        digits: String,
        /// Power of ten the digits are divided by
        scale: i64,
    },
    /// Positive or negative infinity
    Infinity {
        /// True for `-INF`
        negative: bool,
    },
    /// Not a number
    NaN,
}

impl PrecisionDecimal {
    /// Parse a precisionDecimal literal
    pub fn parse(lexical: &str) -> Result<Self> {
        match lexical {
            "INF" | "+INF" => return Ok(PrecisionDecimal::Infinity { negative: false }),
            "-INF" => return Ok(PrecisionDecimal::Infinity { negative: true }),
            "NaN" => return Ok(PrecisionDecimal::NaN),
            _ => {}
        }

        let error = || DatatypeError::number(lexical, "precisionDecimal");
        let (mantissa, exponent) = match lexical.find(['e', 'E']) {
            Some(pos) => (&lexical[..pos], Some(&lexical[pos + 1..])),
            None => (lexical, None),
        };

        let (negative, body) = match mantissa.as_bytes().first() {
            Some(b'+') => (false, &mantissa[1..]),
            Some(b'-') => (true, &mantissa[1..]),
            Some(_) => (false, mantissa),
            None => return Err(error().with_reason("empty mantissa").into()),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(error().with_reason("no digits").into());
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(error().with_reason("non-digit character").into());
        }

        let exponent: i64 = match exponent {
            Some(e) => {
                let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
                if digits.is_empty() || !all_digits(digits) {
                    return Err(error().with_reason("malformed exponent").into());
                }
                e.parse()
                    .map_err(|_| error().with_reason("exponent out of range"))?
            }
            None => 0,
        };

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        let digits = digits.trim_start_matches('0').to_string();

        Ok(PrecisionDecimal::Finite {
            negative,
            digits,
            scale: frac_part.len() as i64 - exponent,
        })
    }

    /// Whether the value is NaN
    pub fn is_nan(&self) -> bool {
        matches!(self, PrecisionDecimal::NaN)
    }

    /// Arithmetic precision; zero for the special values
    pub fn scale(&self) -> i64 {
        match self {
            PrecisionDecimal::Finite { scale, .. } => *scale,
            _ => 0,
        }
    }

    /// Number of significant digits, trailing zeros included
    pub fn total_digits(&self) -> usize {
        match self {
            PrecisionDecimal::Finite { digits, .. } => digits.len().max(1),
            _ => 0,
        }
    }

    fn rank(&self) -> i8 {
        match self {
            PrecisionDecimal::Infinity { negative: true } => -2,
            PrecisionDecimal::Infinity { negative: false } => 2,
            PrecisionDecimal::Finite { digits, .. } if digits.is_empty() => 0,
            PrecisionDecimal::Finite { negative: true, .. } => -1,
            PrecisionDecimal::Finite { .. } => 1,
            PrecisionDecimal::NaN => 0,
        }
    }

    /// Order two values by numeric value; NaN is unordered
    pub fn compare(&self, other: &Self) -> ValueOrdering {
        if self.is_nan() || other.is_nan() {
            return ValueOrdering::Indeterminate;
        }
        match self.rank().cmp(&other.rank()) {
            Ordering::Equal => {}
            unequal => return unequal.into(),
        }
        match (self, other) {
            (
                PrecisionDecimal::Finite { negative, digits: d1, scale: s1 },
                PrecisionDecimal::Finite { digits: d2, scale: s2, .. },
            ) if !d1.is_empty() => {
                let magnitude = magnitude_cmp(d1, *s1, d2, *s2);
                if *negative {
                    magnitude.reverse().into()
                } else {
                    magnitude.into()
                }
            }
            _ => ValueOrdering::Equal,
        }
    }

    /// Equal value and equal precision
    pub fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (PrecisionDecimal::NaN, PrecisionDecimal::NaN) => true,
            _ => self.compare(other) == ValueOrdering::Equal && self.scale() == other.scale(),
        }
    }

    /// Canonical literal, precision preserved
    pub fn canonical(&self) -> String {
        match self {
            PrecisionDecimal::NaN => "NaN".to_string(),
            PrecisionDecimal::Infinity { negative: false } => "INF".to_string(),
            PrecisionDecimal::Infinity { negative: true } => "-INF".to_string(),
            PrecisionDecimal::Finite {
                negative,
                digits,
                scale,
            } => {
                let digits = if digits.is_empty() { "0" } else { digits.as_str() };
                let sign = if *negative && digits != "0" { "-" } else { "" };
                if *scale <= 0 {
                    if *scale == 0 || digits == "0" {
                        format!("{}{}", sign, digits)
                    } else {
                        format!("{}{}E{}", sign, digits, -scale)
                    }
                } else {
                    let scale = *scale as usize;
                    let padded = if digits.len() <= scale {
                        format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
                    } else {
                        digits.to_string()
                    };
                    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
                    format!("{}{}.{}", sign, int_part, frac_part)
                }
            }
        }
    }
}

/// Compare two non-zero magnitudes given as significant digits and scale.
fn magnitude_cmp(d1: &str, s1: i64, d2: &str, s2: i64) -> Ordering {
    let t1 = d1.trim_end_matches('0');
    let t2 = d2.trim_end_matches('0');
    // Position of the most significant digit relative to the decimal point.
    let e1 = d1.len() as i64 - s1;
    let e2 = d2.len() as i64 - s2;
    e1.cmp(&e2).then_with(|| t1.cmp(t2))
}

impl fmt::Display for PrecisionDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Validator for xs:precisionDecimal
#[derive(Debug)]
pub struct PrecisionDecimalValidator;

impl TypeValidator for PrecisionDecimalValidator {
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
            Facet::MaxScale,
            Facet::MinScale,
        ])
    }

    fn parse(&self, lexical: &str, _ctx: &ValidationContext) -> Result<ActualValue> {
        PrecisionDecimal::parse(lexical).map(ActualValue::PrecisionDecimal)
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrdering {
        match (a, b) {
            (ActualValue::PrecisionDecimal(x), ActualValue::PrecisionDecimal(y)) => x.compare(y),
            _ => ValueOrdering::Indeterminate,
        }
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        self.compare(a, b) == ValueOrdering::Equal
    }

    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!(
            (a, b),
            (ActualValue::PrecisionDecimal(x), ActualValue::PrecisionDecimal(y)) if x.is_identical(y)
        )
    }

    fn total_digits(&self, value: &ActualValue) -> usize {
        match value {
            ActualValue::PrecisionDecimal(p) => p.total_digits(),
            _ => 0,
        }
    }

    fn scale(&self, value: &ActualValue) -> i64 {
        match value {
            ActualValue::PrecisionDecimal(p) => p.scale(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pd(s: &str) -> PrecisionDecimal {
        PrecisionDecimal::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_scale() {
        assert_eq!(pd("1.50").scale(), 2);
        assert_eq!(pd("1.50E2").scale(), 0);
        assert_eq!(pd("15E3").scale(), -3);
        assert_eq!(pd("0012.30").total_digits(), 4);
        assert!(pd("NaN").is_nan());
        assert_eq!(pd("+INF"), PrecisionDecimal::Infinity { negative: false });
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", ".", "1e", "1e+", "abc", "1.2.3", "inf", "1E5.0"] {
            assert!(PrecisionDecimal::parse(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_compare() {
        assert_eq!(pd("1.50").compare(&pd("1.5")), ValueOrdering::Equal);
        assert_eq!(pd("150E-2").compare(&pd("1.5")), ValueOrdering::Equal);
        assert_eq!(pd("1.49").compare(&pd("1.5")), ValueOrdering::Less);
        assert_eq!(pd("-2").compare(&pd("-10")), ValueOrdering::Greater);
        assert_eq!(pd("0.00").compare(&pd("-0")), ValueOrdering::Equal);
        assert_eq!(pd("INF").compare(&pd("1E300")), ValueOrdering::Greater);
        assert_eq!(pd("-INF").compare(&pd("-1")), ValueOrdering::Less);
        assert_eq!(pd("NaN").compare(&pd("NaN")), ValueOrdering::Indeterminate);
    }

    #[test]
    fn test_identity_requires_equal_precision() {
        assert!(!pd("1.50").is_identical(&pd("1.5")));
        assert!(pd("1.50").is_identical(&pd("15.0E-1")));
        assert!(pd("NaN").is_identical(&pd("NaN")));
    }

    #[test]
    fn test_canonical() {
        assert_eq!(pd("1.50").canonical(), "1.50");
        assert_eq!(pd("-0.005").canonical(), "-0.005");
        assert_eq!(pd("15E3").canonical(), "15E3");
        assert_eq!(pd("0.00").canonical(), "0.00");
        assert_eq!(pd("-INF").canonical(), "-INF");
    }
}
