//! Primitive datatypes
//!
//! [`PrimitiveKind`] names every datatype with its own lexical and value
//! space and maps it to a stateless [`TypeValidator`]. The validators for
//! the string-like, boolean, binary, URI and qualified-name types live here;
//! numeric and calendar validators have their own modules.

use crate::error::{DatatypeError, Error, Result, ValidationError};
use crate::names::{split_qname, validate_qname};
use crate::namespaces::{QName, QNameValue};
use crate::validators::base::{TypeValidator, ValidationContext};
use crate::validators::datetime::duration::DurationValidator;
use crate::validators::datetime::{CalendarKind, CalendarValidator};
use crate::validators::decimal::DecimalValidator;
use crate::validators::double::{DoubleValidator, FloatValidator};
use crate::validators::facets::{Facet, FacetMask};
use crate::validators::helpers::{decode_base64_binary, decode_hex_binary, parse_boolean};
use crate::validators::precision_decimal::PrecisionDecimalValidator;
use crate::validators::values::ActualValue;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;
use url::Url;

/// The `ordered` fundamental facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Ordered {
    /// No ordering
    False,
    /// Some pairs of values are incomparable
    Partial,
    /// Every pair of values is ordered
    Total,
}

impl Ordered {
    /// Facet value as written in a schema
    pub fn as_str(&self) -> &'static str {
        match self {
            Ordered::False => "false",
            Ordered::Partial => "partial",
            Ordered::Total => "total",
        }
    }
}

/// Datatypes with their own validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    /// anySimpleType and anyAtomicType
    AnySimpleType,
    /// string
    String,
    /// boolean
    Boolean,
    /// decimal
    Decimal,
    /// integer, with no fraction in the lexical space
    Integer,
    /// precisionDecimal
    PrecisionDecimal,
    /// float
    Float,
    /// double
    Double,
    /// duration
    Duration,
    /// yearMonthDuration
    YearMonthDuration,
    /// dayTimeDuration
    DayTimeDuration,
    /// dateTime
    DateTime,
    /// time
    Time,
    /// date
    Date,
    /// gYearMonth
    GYearMonth,
    /// gYear
    GYear,
    /// gMonthDay
    GMonthDay,
    /// gDay
    GDay,
    /// gMonth
    GMonth,
    /// hexBinary
    HexBinary,
    /// base64Binary
    Base64Binary,
    /// anyURI
    AnyUri,
    /// QName
    QName,
    /// NOTATION
    Notation,
}

static ANY_SIMPLE_TYPE: AnySimpleTypeValidator = AnySimpleTypeValidator;
static STRING: StringValidator = StringValidator;
static BOOLEAN: BooleanValidator = BooleanValidator;
static DECIMAL: DecimalValidator = DecimalValidator { integer: false };
static INTEGER: DecimalValidator = DecimalValidator { integer: true };
static PRECISION_DECIMAL: PrecisionDecimalValidator = PrecisionDecimalValidator;
static FLOAT: FloatValidator = FloatValidator;
static DOUBLE: DoubleValidator = DoubleValidator;
static DURATION: DurationValidator = DurationValidator {
    kind: CalendarKind::Duration,
};
static YEAR_MONTH_DURATION: DurationValidator = DurationValidator {
    kind: CalendarKind::YearMonthDuration,
};
static DAY_TIME_DURATION: DurationValidator = DurationValidator {
    kind: CalendarKind::DayTimeDuration,
};
static DATE_TIME: CalendarValidator = CalendarValidator {
    kind: CalendarKind::DateTime,
};
static TIME: CalendarValidator = CalendarValidator {
    kind: CalendarKind::Time,
};
static DATE: CalendarValidator = CalendarValidator {
    kind: CalendarKind::Date,
};
static G_YEAR_MONTH: CalendarValidator = CalendarValidator {
    kind: CalendarKind::GYearMonth,
};
static G_YEAR: CalendarValidator = CalendarValidator {
    kind: CalendarKind::GYear,
};
static G_MONTH_DAY: CalendarValidator = CalendarValidator {
    kind: CalendarKind::GMonthDay,
};
static G_DAY: CalendarValidator = CalendarValidator {
    kind: CalendarKind::GDay,
};
static G_MONTH: CalendarValidator = CalendarValidator {
    kind: CalendarKind::GMonth,
};
static HEX_BINARY: HexBinaryValidator = HexBinaryValidator;
static BASE64_BINARY: Base64BinaryValidator = Base64BinaryValidator;
static ANY_URI: AnyUriValidator = AnyUriValidator;
static QNAME: QNameValidator = QNameValidator { notation: false };
static NOTATION: QNameValidator = QNameValidator { notation: true };

impl PrimitiveKind {
    /// Every kind
    pub const ALL: [PrimitiveKind; 24] = [
        PrimitiveKind::AnySimpleType,
        PrimitiveKind::String,
        PrimitiveKind::Boolean,
        PrimitiveKind::Decimal,
        PrimitiveKind::Integer,
        PrimitiveKind::PrecisionDecimal,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Duration,
        PrimitiveKind::YearMonthDuration,
        PrimitiveKind::DayTimeDuration,
        PrimitiveKind::DateTime,
        PrimitiveKind::Time,
        PrimitiveKind::Date,
        PrimitiveKind::GYearMonth,
        PrimitiveKind::GYear,
        PrimitiveKind::GMonthDay,
        PrimitiveKind::GDay,
        PrimitiveKind::GMonth,
        PrimitiveKind::HexBinary,
        PrimitiveKind::Base64Binary,
        PrimitiveKind::AnyUri,
        PrimitiveKind::QName,
        PrimitiveKind::Notation,
    ];

    /// The validator implementing this kind
    pub fn validator(self) -> &'static dyn TypeValidator {
        match self {
            PrimitiveKind::AnySimpleType => &ANY_SIMPLE_TYPE,
            PrimitiveKind::String => &STRING,
            PrimitiveKind::Boolean => &BOOLEAN,
            PrimitiveKind::Decimal => &DECIMAL,
            PrimitiveKind::Integer => &INTEGER,
            PrimitiveKind::PrecisionDecimal => &PRECISION_DECIMAL,
            PrimitiveKind::Float => &FLOAT,
            PrimitiveKind::Double => &DOUBLE,
            PrimitiveKind::Duration => &DURATION,
            PrimitiveKind::YearMonthDuration => &YEAR_MONTH_DURATION,
            PrimitiveKind::DayTimeDuration => &DAY_TIME_DURATION,
            PrimitiveKind::DateTime => &DATE_TIME,
            PrimitiveKind::Time => &TIME,
            PrimitiveKind::Date => &DATE,
            PrimitiveKind::GYearMonth => &G_YEAR_MONTH,
            PrimitiveKind::GYear => &G_YEAR,
            PrimitiveKind::GMonthDay => &G_MONTH_DAY,
            PrimitiveKind::GDay => &G_DAY,
            PrimitiveKind::GMonth => &G_MONTH,
            PrimitiveKind::HexBinary => &HEX_BINARY,
            PrimitiveKind::Base64Binary => &BASE64_BINARY,
            PrimitiveKind::AnyUri => &ANY_URI,
            PrimitiveKind::QName => &QNAME,
            PrimitiveKind::Notation => &NOTATION,
        }
    }

    /// Name of the built-in type that introduces this kind
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::AnySimpleType => "anySimpleType",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::PrecisionDecimal => "precisionDecimal",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Duration => "duration",
            PrimitiveKind::YearMonthDuration => "yearMonthDuration",
            PrimitiveKind::DayTimeDuration => "dayTimeDuration",
            PrimitiveKind::DateTime => "dateTime",
            PrimitiveKind::Time => "time",
            PrimitiveKind::Date => "date",
            PrimitiveKind::GYearMonth => "gYearMonth",
            PrimitiveKind::GYear => "gYear",
            PrimitiveKind::GMonthDay => "gMonthDay",
            PrimitiveKind::GDay => "gDay",
            PrimitiveKind::GMonth => "gMonth",
            PrimitiveKind::HexBinary => "hexBinary",
            PrimitiveKind::Base64Binary => "base64Binary",
            PrimitiveKind::AnyUri => "anyURI",
            PrimitiveKind::QName => "QName",
            PrimitiveKind::Notation => "NOTATION",
        }
    }

    /// Kind with the given type name
    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The primitive datatype whose value space this kind shares
    pub fn primitive(self) -> PrimitiveKind {
        match self {
            PrimitiveKind::Integer => PrimitiveKind::Decimal,
            PrimitiveKind::YearMonthDuration | PrimitiveKind::DayTimeDuration => {
                PrimitiveKind::Duration
            }
            other => other,
        }
    }

    /// Facets this kind admits
    pub fn allowed_facets(self) -> FacetMask {
        self.validator().allowed_facets()
    }

    /// Value of the `ordered` fundamental facet
    pub fn ordered(self) -> Ordered {
        match self.primitive() {
            PrimitiveKind::Decimal
            | PrimitiveKind::PrecisionDecimal
            | PrimitiveKind::Float
            | PrimitiveKind::Double => Ordered::Total,
            PrimitiveKind::Duration
            | PrimitiveKind::DateTime
            | PrimitiveKind::Time
            | PrimitiveKind::Date
            | PrimitiveKind::GYearMonth
            | PrimitiveKind::GYear
            | PrimitiveKind::GMonthDay
            | PrimitiveKind::GDay
            | PrimitiveKind::GMonth => Ordered::Partial,
            _ => Ordered::False,
        }
    }

    /// Value of the `numeric` fundamental facet
    pub fn is_numeric(self) -> bool {
        self.ordered() == Ordered::Total
    }

    /// Whether the length facets are skipped for this kind
    pub(crate) fn ignores_length(self) -> bool {
        matches!(self, PrimitiveKind::QName | PrimitiveKind::Notation)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const LENGTH_FACETS: FacetMask = FacetMask::of(&[
    Facet::Length,
    Facet::MinLength,
    Facet::MaxLength,
    Facet::Pattern,
    Facet::Enumeration,
    Facet::WhiteSpace,
]);

// =============================================================================
// anySimpleType and string
// =============================================================================

/// Validator for anySimpleType: every literal, no facets
#[derive(Debug)]
pub struct AnySimpleTypeValidator;

impl TypeValidator for AnySimpleTypeValidator {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::EMPTY
    }

    fn parse(&self, lexical: &str, _ctx: &ValidationContext) -> Result<ActualValue> {
        Ok(ActualValue::String(lexical.to_string()))
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::String(x), ActualValue::String(y)) if x == y)
    }
}

/// Validator for xs:string
#[derive(Debug)]
pub struct StringValidator;

impl TypeValidator for StringValidator {
    fn allowed_facets(&self) -> FacetMask {
        LENGTH_FACETS
    }

    fn parse(&self, lexical: &str, _ctx: &ValidationContext) -> Result<ActualValue> {
        Ok(ActualValue::String(lexical.to_string()))
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::String(x), ActualValue::String(y)) if x == y)
    }
}

// =============================================================================
// boolean
// =============================================================================

/// Validator for xs:boolean
#[derive(Debug)]
pub struct BooleanValidator;

impl TypeValidator for BooleanValidator {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::of(&[Facet::Pattern, Facet::WhiteSpace])
    }

    fn parse(&self, lexical: &str, _ctx: &ValidationContext) -> Result<ActualValue> {
        parse_boolean(lexical).map(ActualValue::Boolean)
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::Boolean(x), ActualValue::Boolean(y)) if x == y)
    }
}

// =============================================================================
// Binary
// =============================================================================

/// Validator for xs:hexBinary; length counts octets
#[derive(Debug)]
pub struct HexBinaryValidator;

impl TypeValidator for HexBinaryValidator {
    fn allowed_facets(&self) -> FacetMask {
        LENGTH_FACETS
    }

    fn parse(&self, lexical: &str, _ctx: &ValidationContext) -> Result<ActualValue> {
        decode_hex_binary(lexical).map(ActualValue::HexBinary)
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::HexBinary(x), ActualValue::HexBinary(y)) if x == y)
    }

    fn data_length(&self, value: &ActualValue) -> usize {
        match value {
            ActualValue::HexBinary(bytes) => bytes.len(),
            _ => 0,
        }
    }
}

/// Validator for xs:base64Binary; length counts octets
#[derive(Debug)]
pub struct Base64BinaryValidator;

impl TypeValidator for Base64BinaryValidator {
    fn allowed_facets(&self) -> FacetMask {
        LENGTH_FACETS
    }

    fn parse(&self, lexical: &str, _ctx: &ValidationContext) -> Result<ActualValue> {
        decode_base64_binary(lexical).map(ActualValue::Base64Binary)
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::Base64Binary(x), ActualValue::Base64Binary(y)) if x == y)
    }

    fn data_length(&self, value: &ActualValue) -> usize {
        match value {
            ActualValue::Base64Binary(bytes) => bytes.len(),
            _ => 0,
        }
    }
}

// =============================================================================
// anyURI
// =============================================================================

static URI_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("abc://def.ghi.jkl").expect("static base URI"));

/// Every '%' starts a two-digit hex escape
fn has_valid_escapes(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// Check an anyURI literal, resolving it against a fixed base so relative
/// references are accepted
pub fn check_any_uri(value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    let error = |reason: &str| -> Error {
        DatatypeError::invalid(value, "anyURI")
            .with_reason(reason)
            .into()
    };
    if !has_valid_escapes(value) {
        return Err(error("'%' must be followed by two hexadecimal digits"));
    }
    if value.matches('#').count() > 1 {
        return Err(error("more than one fragment separator"));
    }
    URI_BASE
        .join(value)
        .map(|_| ())
        .map_err(|e| error(&e.to_string()))
}

/// Validator for xs:anyURI
#[derive(Debug)]
pub struct AnyUriValidator;

impl TypeValidator for AnyUriValidator {
    fn allowed_facets(&self) -> FacetMask {
        LENGTH_FACETS
    }

    fn parse(&self, lexical: &str, _ctx: &ValidationContext) -> Result<ActualValue> {
        check_any_uri(lexical)?;
        Ok(ActualValue::AnyUri(lexical.to_string()))
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        matches!((a, b), (ActualValue::AnyUri(x), ActualValue::AnyUri(y)) if x == y)
    }
}

// =============================================================================
// QName and NOTATION
// =============================================================================

/// Validator for xs:QName, and with `notation` set for xs:NOTATION.
///
/// Prefixes are resolved when the context carries namespace bindings; an
/// unbound prefix is reported by [`TypeValidator::check_extra_rules`].
#[derive(Debug)]
pub struct QNameValidator {
    /// Produce NOTATION values
    pub notation: bool,
}

impl QNameValidator {
    fn type_name(&self) -> &'static str {
        if self.notation {
            "NOTATION"
        } else {
            "QName"
        }
    }

    fn value<'a>(&self, value: &'a ActualValue) -> Option<&'a QNameValue> {
        match (value, self.notation) {
            (ActualValue::QName(q), false) | (ActualValue::Notation(q), true) => Some(q),
            _ => None,
        }
    }
}

impl TypeValidator for QNameValidator {
    fn allowed_facets(&self) -> FacetMask {
        LENGTH_FACETS
    }

    fn parse(&self, lexical: &str, ctx: &ValidationContext) -> Result<ActualValue> {
        validate_qname(lexical, self.type_name())?;
        let resolved = ctx
            .namespaces
            .as_ref()
            .and_then(|namespaces| namespaces.resolve(lexical).ok());
        let value = resolved.unwrap_or_else(|| {
            let (prefix, local) = split_qname(lexical);
            QNameValue {
                prefix: prefix.map(str::to_string),
                name: QName::local(local),
            }
        });
        Ok(if self.notation {
            ActualValue::Notation(value)
        } else {
            ActualValue::QName(value)
        })
    }

    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        match (self.value(a), self.value(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    fn check_extra_rules(&self, value: &ActualValue, ctx: &ValidationContext) -> Result<()> {
        let (Some(namespaces), Some(q)) = (ctx.namespaces.as_ref(), self.value(value)) else {
            return Ok(());
        };
        match &q.prefix {
            Some(prefix) if namespaces.get_namespace(prefix).is_none() => {
                Err(ValidationError::new("UndeclaredPrefix", q.lexical())
                    .with_type_name(self.type_name())
                    .with_reason(format!("prefix '{}' is not bound", prefix))
                    .into())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::NamespaceContext;
    use crate::validators::base::ValueOrdering;

    fn ctx() -> ValidationContext {
        ValidationContext::default()
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_name("token"), None);
    }

    #[test]
    fn test_primitive_families() {
        assert_eq!(PrimitiveKind::Integer.primitive(), PrimitiveKind::Decimal);
        assert_eq!(
            PrimitiveKind::DayTimeDuration.primitive(),
            PrimitiveKind::Duration
        );
        assert_eq!(PrimitiveKind::Time.primitive(), PrimitiveKind::Time);
    }

    #[test]
    fn test_fundamental_facets() {
        assert_eq!(PrimitiveKind::Decimal.ordered(), Ordered::Total);
        assert_eq!(PrimitiveKind::GDay.ordered(), Ordered::Partial);
        assert_eq!(PrimitiveKind::String.ordered(), Ordered::False);
        assert!(PrimitiveKind::Float.is_numeric());
        assert!(!PrimitiveKind::Duration.is_numeric());
    }

    #[test]
    fn test_allowed_facets() {
        assert!(PrimitiveKind::String
            .allowed_facets()
            .contains(Facet::MaxLength));
        assert!(!PrimitiveKind::Boolean
            .allowed_facets()
            .contains(Facet::Enumeration));
        assert!(PrimitiveKind::Decimal
            .allowed_facets()
            .contains(Facet::FractionDigits));
        assert!(!PrimitiveKind::Double
            .allowed_facets()
            .contains(Facet::TotalDigits));
        assert!(PrimitiveKind::PrecisionDecimal
            .allowed_facets()
            .contains(Facet::MinScale));
        assert!(PrimitiveKind::AnySimpleType.allowed_facets().is_empty());
    }

    #[test]
    fn test_binary_lengths_count_octets() {
        let v = PrimitiveKind::HexBinary.validator();
        let value = v.parse("0A0B0C", &ctx()).unwrap();
        assert_eq!(v.data_length(&value), 3);

        let v = PrimitiveKind::Base64Binary.validator();
        let value = v.parse("SGVsbG8=", &ctx()).unwrap();
        assert_eq!(v.data_length(&value), 5);
    }

    #[test]
    fn test_any_uri() {
        for ok in [
            "",
            "http://example.com/a?b=c#frag",
            "../relative/path",
            "urn:isbn:0451450523",
            "a%20b",
        ] {
            assert!(check_any_uri(ok).is_ok(), "{:?} should be accepted", ok);
        }
        for bad in ["a%2", "a%zz", "a#b#c", "http://[::1"] {
            assert!(check_any_uri(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_qname_without_namespaces() {
        let v = PrimitiveKind::QName.validator();
        let value = v.parse("xs:string", &ctx()).unwrap();
        assert_eq!(value.canonical(), "xs:string");
        assert!(v.check_extra_rules(&value, &ctx()).is_ok());
        assert!(v.parse("1abc", &ctx()).is_err());
        assert!(v.parse("a:b:c", &ctx()).is_err());
    }

    #[test]
    fn test_qname_with_namespaces() {
        let namespaces = NamespaceContext::new()
            .with_prefix("a", "urn:x")
            .with_prefix("b", "urn:x");
        let ctx = ctx().with_namespaces(namespaces);
        let v = PrimitiveKind::QName.validator();

        let a = v.parse("a:item", &ctx).unwrap();
        let b = v.parse("b:item", &ctx).unwrap();
        assert!(v.is_equal(&a, &b));

        let unbound = v.parse("c:item", &ctx).unwrap();
        let err = v.check_extra_rules(&unbound, &ctx).unwrap_err();
        assert_eq!(err.code(), Some("UndeclaredPrefix"));
    }

    #[test]
    fn test_unbound_prefixes_are_compared() {
        let v = PrimitiveKind::QName.validator();
        let a = v.parse("a:item", &ctx()).unwrap();
        let b = v.parse("b:item", &ctx()).unwrap();
        let plain = v.parse("item", &ctx()).unwrap();
        assert!(!v.is_equal(&a, &b));
        assert!(!v.is_equal(&a, &plain));
        assert!(v.is_equal(&a, &v.parse("a:item", &ctx()).unwrap()));
    }

    #[test]
    fn test_notation_and_qname_are_distinct() {
        let q = PrimitiveKind::QName.validator().parse("a", &ctx()).unwrap();
        let n = PrimitiveKind::Notation.validator().parse("a", &ctx()).unwrap();
        assert!(!PrimitiveKind::QName.validator().is_equal(&q, &n));
        assert_eq!(
            PrimitiveKind::Notation.validator().compare(&n, &n.clone()),
            ValueOrdering::Equal
        );
    }
}
