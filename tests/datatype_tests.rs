//! Datatype behaviour through the built-in declarations

use pretty_assertions::assert_eq;
use xsd_datatypes::{
    ActualValue, Error, NamespaceContext, SchemaVersion, TypeUniverse, ValidationContext,
    ValueOrdering,
};

fn validate(type_name: &str, literal: &str) -> Result<ActualValue, Error> {
    let universe = TypeUniverse::xsd10();
    universe.require(type_name)?.validate(literal, &universe.context())
}

fn validate11(type_name: &str, literal: &str) -> Result<ActualValue, Error> {
    let universe = TypeUniverse::xsd11();
    universe.require(type_name)?.validate(literal, &universe.context())
}

fn canonical(type_name: &str, literal: &str) -> String {
    validate(type_name, literal).unwrap().canonical()
}

fn compare(type_name: &str, a: &str, b: &str) -> ValueOrdering {
    let left = validate(type_name, a).unwrap();
    let right = validate(type_name, b).unwrap();
    left.compare(&right)
}

// ============================================================================
// Decimal
// ============================================================================

#[test]
fn test_decimal_canonical_forms() {
    assert_eq!(canonical("decimal", "+0012.500"), "12.5");
    assert_eq!(canonical("decimal", "-.5"), "-0.5");
    assert_eq!(canonical("decimal", "3"), "3.0");
    assert_eq!(canonical("decimal", "-0.0"), "0.0");
    assert_eq!(canonical("integer", "-007"), "-7");
}

#[test]
fn test_decimal_rejects_malformed() {
    for literal in ["", ".", "+", "1e5", "1.2.3", "12a", "- 1"] {
        let err = validate("decimal", literal).unwrap_err();
        assert!(matches!(err, Error::Datatype(_)), "{:?} accepted", literal);
    }
}

#[test]
fn test_decimal_ordering() {
    assert_eq!(compare("decimal", "10", "9.99"), ValueOrdering::Greater);
    assert_eq!(compare("decimal", "-10", "-9.99"), ValueOrdering::Less);
    assert_eq!(compare("decimal", "1.50", "1.5"), ValueOrdering::Equal);
}

// ============================================================================
// Double and float
// ============================================================================

#[test]
fn test_double_special_values() {
    assert_eq!(compare("double", "INF", "1.0e300"), ValueOrdering::Greater);
    assert_eq!(compare("double", "-INF", "-1.0e300"), ValueOrdering::Less);
    assert_eq!(compare("double", "NaN", "1"), ValueOrdering::Indeterminate);
    assert_eq!(compare("double", "NaN", "NaN"), ValueOrdering::Indeterminate);
    assert!(validate("double", "inf").is_err());
    assert!(validate("double", "+INF").is_err());
    assert!(validate11("double", "+INF").is_ok());
}

#[test]
fn test_double_signed_zero() {
    let zero = validate("double", "0").unwrap();
    let negative = validate("double", "-0").unwrap();
    assert_eq!(zero.compare(&negative), ValueOrdering::Equal);
    assert!(!zero.is_identical(&negative));
    assert_eq!(canonical("double", "-0"), "-0.0E0");
    assert_eq!(canonical("float", "100"), "1.0E2");
}

// ============================================================================
// Calendar types
// ============================================================================

#[test]
fn test_leap_days() {
    assert!(validate("date", "2000-02-29").is_ok());
    assert!(validate("date", "2004-02-29").is_ok());
    match validate("date", "2001-02-29").unwrap_err() {
        Error::Datatype(e) => assert_eq!(e.type_name, "date"),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(validate("date", "1900-02-29").is_err());
}

#[test]
fn test_year_zero_depends_on_version() {
    assert!(validate("date", "0000-01-01").is_err());
    assert!(validate11("date", "0000-01-01").is_ok());
}

#[test]
fn test_end_of_day() {
    assert_eq!(
        canonical("dateTime", "1999-12-31T24:00:00"),
        "2000-01-01T00:00:00"
    );
    assert!(validate("dateTime", "1999-12-31T24:00:01").is_err());
    assert_eq!(compare("time", "24:00:00", "00:00:00"), ValueOrdering::Equal);
}

#[test]
fn test_offsets_are_normalized() {
    assert_eq!(
        canonical("dateTime", "2002-10-10T12:00:00-05:00"),
        "2002-10-10T17:00:00Z"
    );
    assert_eq!(
        compare("dateTime", "2002-10-10T12:00:00-05:00", "2002-10-10T17:00:00Z"),
        ValueOrdering::Equal
    );
    let a = validate("dateTime", "2002-10-10T12:00:00-05:00").unwrap();
    let b = validate("dateTime", "2002-10-10T17:00:00Z").unwrap();
    assert!(!a.is_identical(&b));
}

#[test]
fn test_zoned_against_unzoned() {
    // Within 14 hours the unzoned value could fall on either side.
    assert_eq!(
        compare("dateTime", "2000-01-16T02:00:00", "2000-01-16T12:00:00Z"),
        ValueOrdering::Indeterminate
    );
    assert_eq!(
        compare("dateTime", "2000-01-15T00:00:00", "2000-01-16T12:00:00Z"),
        ValueOrdering::Less
    );
    assert_eq!(
        compare("dateTime", "2000-01-16T12:00:00Z", "2000-01-15T00:00:00"),
        ValueOrdering::Greater
    );
}

#[test]
fn test_calendar_lexical_keeps_offset() {
    let value = validate("dateTime", "2002-10-10T12:00:00+05:30").unwrap();
    match value {
        ActualValue::Calendar(date) => {
            assert_eq!(date.lexical(), "2002-10-10T12:00:00+05:30");
            assert_eq!(date.canonical(), "2002-10-10T06:30:00Z");
            let utc = date.to_date_time_utc().unwrap();
            assert_eq!(utc.to_rfc3339(), "2002-10-10T06:30:00+00:00");
        }
        other => panic!("unexpected value {:?}", other),
    }
}

#[test]
fn test_gregorian_fragments() {
    assert_eq!(canonical("gMonth", "--02"), "--02");
    assert!(validate("gMonth", "--02--").is_err());
    assert!(validate("gMonthDay", "--02-30").is_err());
    assert!(validate("gMonthDay", "--02-29").is_ok());
    assert_eq!(canonical("gDay", "---31"), "---31");
    assert_eq!(canonical("gYearMonth", "-0044-03"), "-0044-03");
    assert!(validate("gYear", "02000").is_err());
    assert_eq!(compare("gYear", "2001", "2000"), ValueOrdering::Greater);
}

// ============================================================================
// Durations
// ============================================================================

#[test]
fn test_duration_ordering() {
    assert_eq!(compare("duration", "P1Y", "P12M"), ValueOrdering::Equal);
    assert_eq!(compare("duration", "P1D", "PT24H"), ValueOrdering::Equal);
    assert_eq!(compare("duration", "P1Y", "P13M"), ValueOrdering::Less);
    assert_eq!(compare("duration", "P1M", "P30D"), ValueOrdering::Indeterminate);
    assert_eq!(compare("duration", "-P1D", "PT0S"), ValueOrdering::Less);
}

#[test]
fn test_duration_grammar() {
    for literal in ["P", "PT", "P1YT", "1Y", "P-1Y", "P1H", "P1D2Y"] {
        assert!(validate("duration", literal).is_err(), "{:?} accepted", literal);
    }
    assert_eq!(canonical("duration", "P0Y1347M"), "P112Y3M");
    assert_eq!(canonical("duration", "PT3600S"), "PT1H");
}

#[test]
fn test_xsd11_duration_flavours() {
    let ym = validate11("yearMonthDuration", "P2Y").unwrap();
    let dt = validate11("dayTimeDuration", "P1D").unwrap();
    assert_eq!(ym.compare(&dt), ValueOrdering::Greater);
    assert_eq!(validate11("yearMonthDuration", "P0M").unwrap().canonical(), "P0M");
}

// ============================================================================
// Binary, URI, boolean, names
// ============================================================================

#[test]
fn test_binary_types() {
    assert_eq!(canonical("hexBinary", "0fb7"), "0FB7");
    assert!(validate("hexBinary", "0fb").is_err());
    assert_eq!(canonical("base64Binary", "AQID"), "AQID");
    assert!(validate("base64Binary", "AQI").is_err());
}

#[test]
fn test_boolean() {
    assert_eq!(canonical("boolean", " 1 "), "true");
    assert_eq!(compare("boolean", "0", "false"), ValueOrdering::Equal);
    assert!(validate("boolean", "yes").is_err());
}

#[test]
fn test_any_uri() {
    assert!(validate("anyURI", "http://example.com/a b").is_ok());
    assert!(validate("anyURI", "../relative/path#frag").is_ok());
    assert!(validate("anyURI", "http://example.com/%zz").is_err());
}

#[test]
fn test_qname_resolution() {
    let universe = TypeUniverse::xsd10();
    let qname = universe.require("QName").unwrap();

    let bare = universe.context();
    let a = qname.validate("a:item", &bare).unwrap();
    let b = qname.validate("b:item", &bare).unwrap();
    assert_eq!(a.compare(&b), ValueOrdering::Indeterminate);
    let again = qname.validate("a:item", &bare).unwrap();
    assert_eq!(a.compare(&again), ValueOrdering::Equal);

    let namespaces = NamespaceContext::new()
        .with_prefix("a", "urn:one")
        .with_prefix("b", "urn:two");
    let ctx = ValidationContext::new(SchemaVersion::V1_0).with_namespaces(namespaces);
    let a = qname.validate("a:item", &ctx).unwrap();
    let b = qname.validate("b:item", &ctx).unwrap();
    assert_eq!(a.compare(&b), ValueOrdering::Indeterminate);

    let err = qname.validate("c:item", &ctx).unwrap_err();
    assert_eq!(err.code(), Some("UndeclaredPrefix"));
    assert!(qname.validate("1abc", &bare).is_err());
}
