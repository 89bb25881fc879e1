//! Parsed values of simple types
//!
//! [`ActualValue`] is the value space shared by every datatype. Ordering and
//! equality of atomic values go through the validator of the value's
//! primitive kind; list values compare item by item.

use crate::namespaces::QNameValue;
use crate::validators::base::ValueOrdering;
use crate::validators::datetime::DateTimeData;
use crate::validators::decimal::XsdDecimal;
use crate::validators::double::{XsdDouble, XsdFloat};
use crate::validators::helpers::{boolean_to_string, encode_base64_binary, encode_hex_binary};
use crate::validators::precision_decimal::PrecisionDecimal;
use crate::validators::primitives::PrimitiveKind;
use std::fmt;

/// The value of a validated literal
#[derive(Debug, Clone)]
pub enum ActualValue {
    /// xs:string and anySimpleType values
    String(String),
    /// xs:boolean
    Boolean(bool),
    /// xs:decimal and the integer family
    Decimal(XsdDecimal),
    /// xs:precisionDecimal
    PrecisionDecimal(PrecisionDecimal),
    /// xs:float
    Float(XsdFloat),
    /// xs:double
    Double(XsdDouble),
    /// Date/time types and durations
    Calendar(DateTimeData),
    /// xs:hexBinary octets
    HexBinary(Vec<u8>),
    /// xs:base64Binary octets
    Base64Binary(Vec<u8>),
    /// xs:anyURI
    AnyUri(String),
    /// xs:QName
    QName(QNameValue),
    /// xs:NOTATION
    Notation(QNameValue),
    /// Items of a list type
    List(Vec<ActualValue>),
    /// Value of a union type, tagged with the member that accepted it
    UnionMember {
        /// Position of the member type in the union
        index: usize,
        /// Value produced by that member
        value: Box<ActualValue>,
    },
}

impl ActualValue {
    /// The value with any union tagging removed
    pub fn unwrap_member(&self) -> &ActualValue {
        match self {
            ActualValue::UnionMember { value, .. } => value.unwrap_member(),
            other => other,
        }
    }

    /// Primitive kind whose validator owns this value; `None` for lists
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        let kind = match self.unwrap_member() {
            ActualValue::String(_) => PrimitiveKind::String,
            ActualValue::Boolean(_) => PrimitiveKind::Boolean,
            ActualValue::Decimal(d) if d.is_integer() => PrimitiveKind::Integer,
            ActualValue::Decimal(_) => PrimitiveKind::Decimal,
            ActualValue::PrecisionDecimal(_) => PrimitiveKind::PrecisionDecimal,
            ActualValue::Float(_) => PrimitiveKind::Float,
            ActualValue::Double(_) => PrimitiveKind::Double,
            ActualValue::Calendar(d) => d.kind.primitive_kind(),
            ActualValue::HexBinary(_) => PrimitiveKind::HexBinary,
            ActualValue::Base64Binary(_) => PrimitiveKind::Base64Binary,
            ActualValue::AnyUri(_) => PrimitiveKind::AnyUri,
            ActualValue::QName(_) => PrimitiveKind::QName,
            ActualValue::Notation(_) => PrimitiveKind::Notation,
            ActualValue::List(_) | ActualValue::UnionMember { .. } => return None,
        };
        Some(kind)
    }

    /// Items of a list value
    pub fn as_list(&self) -> Option<&[ActualValue]> {
        match self.unwrap_member() {
            ActualValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Order two values. Values of different primitive families and list
    /// values that differ are indeterminate.
    pub fn compare(&self, other: &ActualValue) -> ValueOrdering {
        match (self.unwrap_member(), other.unwrap_member()) {
            (ActualValue::List(a), ActualValue::List(b)) => {
                if a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals_value(y)) {
                    ValueOrdering::Equal
                } else {
                    ValueOrdering::Indeterminate
                }
            }
            (a, b) => match a.primitive_kind() {
                Some(kind) => kind.validator().compare(a, b),
                None => ValueOrdering::Indeterminate,
            },
        }
    }

    /// Value-space equality
    pub fn equals_value(&self, other: &ActualValue) -> bool {
        match (self.unwrap_member(), other.unwrap_member()) {
            (ActualValue::List(a), ActualValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals_value(y))
            }
            (a, b) => a
                .primitive_kind()
                .map_or(false, |kind| kind.validator().is_equal(a, b)),
        }
    }

    /// Identity, which separates some equal values (`0` and `-0` doubles,
    /// offsets of date/times, precision of precisionDecimals)
    pub fn is_identical(&self, other: &ActualValue) -> bool {
        match (self.unwrap_member(), other.unwrap_member()) {
            (ActualValue::List(a), ActualValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_identical(y))
            }
            (a, b) => a
                .primitive_kind()
                .map_or(false, |kind| kind.validator().is_identical(a, b)),
        }
    }

    /// Canonical literal of the value
    pub fn canonical(&self) -> String {
        match self {
            ActualValue::String(s) | ActualValue::AnyUri(s) => s.clone(),
            ActualValue::Boolean(b) => boolean_to_string(*b).to_string(),
            ActualValue::Decimal(d) => d.canonical(),
            ActualValue::PrecisionDecimal(p) => p.canonical(),
            ActualValue::Float(f) => f.canonical(),
            ActualValue::Double(d) => d.canonical(),
            ActualValue::Calendar(c) => c.canonical(),
            ActualValue::HexBinary(bytes) => encode_hex_binary(bytes),
            ActualValue::Base64Binary(bytes) => encode_base64_binary(bytes),
            ActualValue::QName(q) | ActualValue::Notation(q) => q.lexical(),
            ActualValue::List(items) => items
                .iter()
                .map(ActualValue::canonical)
                .collect::<Vec<_>>()
                .join(" "),
            ActualValue::UnionMember { value, .. } => value.canonical(),
        }
    }
}

impl PartialEq for ActualValue {
    fn eq(&self, other: &Self) -> bool {
        self.equals_value(other)
    }
}

impl fmt::Display for ActualValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::base::SchemaVersion;
    use crate::validators::datetime::CalendarKind;

    fn decimal(s: &str) -> ActualValue {
        ActualValue::Decimal(XsdDecimal::parse(s).unwrap())
    }

    fn double(s: &str) -> ActualValue {
        ActualValue::Double(XsdDouble::parse(s, SchemaVersion::V1_0).unwrap())
    }

    fn calendar(kind: CalendarKind, s: &str) -> ActualValue {
        ActualValue::Calendar(DateTimeData::parse(kind, s, SchemaVersion::V1_1).unwrap())
    }

    #[test]
    fn test_compare_dispatches_by_kind() {
        assert_eq!(decimal("1.5").compare(&decimal("2")), ValueOrdering::Less);
        assert_eq!(double("NaN").compare(&double("NaN")), ValueOrdering::Indeterminate);
        assert_eq!(
            ActualValue::String("a".into()).compare(&ActualValue::String("b".into())),
            ValueOrdering::Indeterminate
        );
        assert_eq!(
            ActualValue::String("a".into()).compare(&ActualValue::String("a".into())),
            ValueOrdering::Equal
        );
    }

    #[test]
    fn test_integer_and_decimal_share_a_value_space() {
        let integer = ActualValue::Decimal(XsdDecimal::parse_integer("3").unwrap());
        assert_eq!(integer.compare(&decimal("3.0")), ValueOrdering::Equal);
        assert_eq!(integer, decimal("3"));
    }

    #[test]
    fn test_cross_family_values_are_unordered() {
        assert_eq!(decimal("1").compare(&double("1")), ValueOrdering::Indeterminate);
        assert!(!decimal("1").equals_value(&double("1")));
        assert_eq!(
            calendar(CalendarKind::Date, "2000-01-01")
                .compare(&calendar(CalendarKind::GYear, "2000")),
            ValueOrdering::Indeterminate
        );
    }

    #[test]
    fn test_durations_of_different_flavours_compare() {
        let ym = calendar(CalendarKind::YearMonthDuration, "P1Y");
        let plain = calendar(CalendarKind::Duration, "P12M");
        assert_eq!(ym.compare(&plain), ValueOrdering::Equal);
    }

    #[test]
    fn test_nan_equality_and_signed_zero_identity() {
        assert_eq!(double("NaN"), double("NaN"));
        assert_eq!(double("0"), double("-0"));
        assert!(!double("0").is_identical(&double("-0")));
    }

    #[test]
    fn test_lists_compare_item_by_item() {
        let a = ActualValue::List(vec![decimal("1"), decimal("2.0")]);
        let b = ActualValue::List(vec![decimal("1.0"), decimal("2")]);
        let c = ActualValue::List(vec![decimal("1")]);
        assert_eq!(a.compare(&b), ValueOrdering::Equal);
        assert_eq!(a.compare(&c), ValueOrdering::Indeterminate);
        assert_eq!(a.canonical(), "1.0 2.0");
    }

    #[test]
    fn test_union_members_are_unwrapped() {
        let tagged = ActualValue::UnionMember {
            index: 1,
            value: Box::new(decimal("5")),
        };
        assert_eq!(tagged.compare(&decimal("5.0")), ValueOrdering::Equal);
        assert_eq!(tagged.primitive_kind(), Some(PrimitiveKind::Decimal));
        assert_eq!(tagged.to_string(), "5.0");
    }
}
