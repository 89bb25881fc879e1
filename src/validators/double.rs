//! xs:double and xs:float values

use crate::error::{DatatypeError, Result};
use crate::validators::base::{SchemaVersion, TypeValidator, ValidationContext, ValueOrdering};
use crate::validators::facets::{Facet, FacetMask};
use crate::validators::values::ActualValue;
use std::fmt;

/// Only these characters may appear in a finite floating-point literal.
fn is_possible_fp(lexical: &str) -> bool {
    !lexical.is_empty()
        && lexical
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

fn parse_special(lexical: &str, version: SchemaVersion) -> Option<f64> {
    match lexical {
        "INF" => Some(f64::INFINITY),
        "+INF" if version == SchemaVersion::V1_1 => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None,
    }
}

fn compare_f64(a: f64, b: f64) -> ValueOrdering {
    // NaN is unordered, against itself too.
    a.partial_cmp(&b).into()
}

fn equals_f64(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn identical_f64(a: f64, b: f64) -> bool {
    if a == b {
        a != 0.0 || a.to_bits() == b.to_bits()
    } else {
        a.is_nan() && b.is_nan()
    }
}

/// Render a finite value in the canonical mantissa/exponent form: one
/// leading digit (nonzero unless the value is zero), a point, at least one
/// fraction digit with no trailing zeros, then `E` and the exponent.
///
/// `scientific` is the `{:e}` rendering, used only as the source of the
/// shortest digit string that reads back to the same value.
fn canonical_from_digits(scientific: &str) -> String {
    let (negative, body) = match scientific.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, scientific),
    };
    let (mantissa, exponent) = body.split_once('e').unwrap_or((body, "0"));
    let digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    let mut exponent: i32 = exponent.parse().unwrap_or(0);

    // Skip leading zeros; the exponent follows the first significant digit.
    let first = digits.iter().position(|&d| d != b'0');
    let significant = match first {
        Some(index) => {
            exponent -= index as i32;
            &digits[index..]
        }
        None => {
            exponent = 0;
            &b"0"[..]
        }
    };
    let fraction = match significant[1..].iter().rposition(|&d| d != b'0') {
        Some(last) => &significant[1..last + 2],
        None => &b"0"[..],
    };

    let mut out = String::with_capacity(fraction.len() + 8);
    if negative {
        out.push('-');
    }
    out.push(char::from(significant[0]));
    out.push('.');
    out.extend(fraction.iter().map(|&d| char::from(d)));
    out.push('E');
    out.push_str(&exponent.to_string());
    out
}

fn special_canonical(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("NaN".to_string())
    } else if value == f64::INFINITY {
        Some("INF".to_string())
    } else if value == f64::NEG_INFINITY {
        Some("-INF".to_string())
    } else if value == 0.0 {
        Some(if value.is_sign_negative() { "-0.0E0" } else { "0.0E0" }.to_string())
    } else {
        None
    }
}

/// An xs:double value
#[derive(Debug, Clone, Copy)]
pub struct XsdDouble(pub f64);

impl XsdDouble {
    /// Parse an xs:double literal
    pub fn parse(lexical: &str, version: SchemaVersion) -> Result<Self> {
        if is_possible_fp(lexical) {
            lexical
                .parse::<f64>()
                .map(XsdDouble)
                .map_err(|e| DatatypeError::number(lexical, "double").with_reason(e.to_string()).into())
        } else {
            parse_special(lexical, version)
                .map(XsdDouble)
                .ok_or_else(|| DatatypeError::number(lexical, "double").into())
        }
    }

    /// Order two values; NaN is unordered
    pub fn compare(&self, other: &Self) -> ValueOrdering {
        compare_f64(self.0, other.0)
    }

    /// Equality where NaN equals NaN and 0.0 equals -0.0
    pub fn equals(&self, other: &Self) -> bool {
        equals_f64(self.0, other.0)
    }

    /// Identity where 0.0 and -0.0 differ
    pub fn is_identical(&self, other: &Self) -> bool {
        identical_f64(self.0, other.0)
    }

    /// Canonical literal
    pub fn canonical(&self) -> String {
        special_canonical(self.0)
            .unwrap_or_else(|| canonical_from_digits(&format!("{:e}", self.0)))
    }
}

impl PartialEq for XsdDouble {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for XsdDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// An xs:float value
#[derive(Debug, Clone, Copy)]
pub struct XsdFloat(pub f32);

impl XsdFloat {
    /// Parse an xs:float literal
    pub fn parse(lexical: &str, version: SchemaVersion) -> Result<Self> {
        if is_possible_fp(lexical) {
            lexical
                .parse::<f32>()
                .map(XsdFloat)
                .map_err(|e| DatatypeError::number(lexical, "float").with_reason(e.to_string()).into())
        } else {
            parse_special(lexical, version)
                .map(|v| XsdFloat(v as f32))
                .ok_or_else(|| DatatypeError::number(lexical, "float").into())
        }
    }

    /// Order two values; NaN is unordered
    pub fn compare(&self, other: &Self) -> ValueOrdering {
        compare_f64(self.0 as f64, other.0 as f64)
    }

    /// Equality where NaN equals NaN and 0.0 equals -0.0
    pub fn equals(&self, other: &Self) -> bool {
        equals_f64(self.0 as f64, other.0 as f64)
    }

    /// Identity where 0.0 and -0.0 differ
    pub fn is_identical(&self, other: &Self) -> bool {
        identical_f64(self.0 as f64, other.0 as f64)
    }

    /// Canonical literal
    pub fn canonical(&self) -> String {
        special_canonical(self.0 as f64)
            .unwrap_or_else(|| canonical_from_digits(&format!("{:e}", self.0)))
    }
}

impl PartialEq for XsdFloat {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for XsdFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

const FLOATING_FACETS: FacetMask = FacetMask::of(&[
    Facet::Pattern,
    Facet::WhiteSpace,
    Facet::Enumeration,
    Facet::MaxInclusive,
    Facet::MaxExclusive,
    Facet::MinInclusive,
    Facet::MinExclusive,
]);

/// Validator for xs:double
#[derive(Debug)]
pub struct DoubleValidator;

impl TypeValidator for DoubleValidator {
    fn allowed_facets(&self) -> FacetMask {
        FLOATING_FACETS
    }

    fn parse(&self, lexical: &str, ctx: &ValidationContext) -> Result<ActualValue> {
        XsdDouble::parse(lexical, ctx.version).map(ActualValue::Double)
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrdering {
        match (a, b) {
            (ActualValue::Double(x), ActualValue::Double(y)) => x.compare(y),
            _ => ValueOrdering::Indeterminate,
        }
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::Double(x), ActualValue::Double(y)) if x.equals(y))
    }

    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::Double(x), ActualValue::Double(y)) if x.is_identical(y))
    }
}

/// Validator for xs:float
#[derive(Debug)]
pub struct FloatValidator;

impl TypeValidator for FloatValidator {
    fn allowed_facets(&self) -> FacetMask {
        FLOATING_FACETS
    }

    fn parse(&self, lexical: &str, ctx: &ValidationContext) -> Result<ActualValue> {
        XsdFloat::parse(lexical, ctx.version).map(ActualValue::Float)
    }

    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrdering {
        match (a, b) {
            (ActualValue::Float(x), ActualValue::Float(y)) => x.compare(y),
            _ => ValueOrdering::Indeterminate,
        }
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::Float(x), ActualValue::Float(y)) if x.equals(y))
    }

    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::Float(x), ActualValue::Float(y)) if x.is_identical(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dbl(s: &str) -> XsdDouble {
        XsdDouble::parse(s, SchemaVersion::V1_0).unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(dbl("1.5").0, 1.5);
        assert_eq!(dbl("-1E4").0, -10000.0);
        assert_eq!(dbl(".5e-1").0, 0.05);
        assert_eq!(dbl("INF").0, f64::INFINITY);
        assert_eq!(dbl("-INF").0, f64::NEG_INFINITY);
        assert!(dbl("NaN").0.is_nan());
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "inf", "Infinity", "nan", "+INF", "1.0d", "1,5", "e5", " 1"] {
            assert!(
                XsdDouble::parse(bad, SchemaVersion::V1_0).is_err(),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(XsdDouble::parse("+INF", SchemaVersion::V1_1).is_ok());
    }

    #[test]
    fn test_compare() {
        assert_eq!(dbl("INF").compare(&dbl("1.0e300")), ValueOrdering::Greater);
        assert_eq!(dbl("-INF").compare(&dbl("-1.0e300")), ValueOrdering::Less);
        assert_eq!(dbl("0.0").compare(&dbl("-0.0")), ValueOrdering::Equal);
        assert_eq!(dbl("NaN").compare(&dbl("1")), ValueOrdering::Indeterminate);
        assert_eq!(dbl("NaN").compare(&dbl("NaN")), ValueOrdering::Indeterminate);
    }

    #[test]
    fn test_equality_and_identity() {
        assert!(dbl("NaN").equals(&dbl("NaN")));
        assert!(dbl("0").equals(&dbl("-0")));
        assert!(!dbl("0").is_identical(&dbl("-0")));
        assert!(dbl("NaN").is_identical(&dbl("NaN")));
        assert!(dbl("1e2").is_identical(&dbl("100")));
    }

    #[test]
    fn test_canonical() {
        assert_eq!(dbl("100").canonical(), "1.0E2");
        assert_eq!(dbl("-0.00125").canonical(), "-1.25E-3");
        assert_eq!(dbl("0").canonical(), "0.0E0");
        assert_eq!(dbl("-0").canonical(), "-0.0E0");
        assert_eq!(dbl("INF").canonical(), "INF");
        assert_eq!(dbl("NaN").canonical(), "NaN");
        assert_eq!(dbl("12345.678").canonical(), "1.2345678E4");
        assert_eq!(dbl("1.0e300").canonical(), "1.0E300");
        assert_eq!(dbl("4.9E-324").canonical(), "5.0E-324");
        assert_eq!(dbl("0.1").canonical(), "1.0E-1");
    }

    #[test]
    fn test_canonical_layout() {
        assert_eq!(canonical_from_digits("1.2500e3"), "1.25E3");
        assert_eq!(canonical_from_digits("-7e-8"), "-7.0E-8");
        assert_eq!(canonical_from_digits("0.05e2"), "5.0E0");
        assert_eq!(canonical_from_digits("0e0"), "0.0E0");
        assert_eq!(canonical_from_digits("-0e0"), "-0.0E0");
    }

    #[test]
    fn test_float() {
        let f = XsdFloat::parse("0.1", SchemaVersion::V1_0).unwrap();
        assert_eq!(f.canonical(), "1.0E-1");
        assert!(XsdFloat::parse("NaN", SchemaVersion::V1_0)
            .unwrap()
            .compare(&f)
            .eq(&ValueOrdering::Indeterminate));
        assert!(XsdFloat::parse("1e39", SchemaVersion::V1_0).unwrap().0.is_infinite());
    }
}
