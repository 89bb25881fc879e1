//! Error types for xsd-datatypes
//!
//! Three families are kept apart: lexical failures raised while parsing a
//! literal ([`DatatypeError`]), facet violations raised while validating a
//! parsed value ([`ValidationError`]) and schema-definition failures raised
//! while deriving a type ([`FacetError`]).

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for datatype operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Literal does not belong to the lexical space of a type
    #[error("datatype error: {0}")]
    Datatype(#[from] DatatypeError),

    /// Parsed value violates a constraining facet
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Facets of a derived type are inconsistent (bad schema, not bad data)
    #[error("facet error: {0}")]
    Facet(#[from] FacetError),

    /// Unknown or unusable type
    #[error("type error: {0}")]
    Type(String),

    /// Invalid configuration value
    #[error("value error: {0}")]
    Value(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

impl Error {
    /// Diagnostic code of the error, if it carries one
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Datatype(e) => Some(e.kind.code()),
            Error::Validation(e) => Some(&e.code),
            Error::Facet(e) => Some(&e.code),
            _ => None,
        }
    }

    /// True for errors describing an invalid schema rather than invalid data
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::Facet(_))
    }
}

/// Category of a lexical failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatatypeErrorKind {
    /// Generic lexical mismatch
    InvalidValue,
    /// Malformed date, time or duration
    DateTimeFormat,
    /// Malformed numeric literal
    NumberFormat,
}

impl DatatypeErrorKind {
    /// Diagnostic code for the kind
    pub fn code(&self) -> &'static str {
        match self {
            DatatypeErrorKind::InvalidValue => "cvc-datatype-valid.1.2.1",
            DatatypeErrorKind::DateTimeFormat => "cvc-datatype-valid.1.2.1 (date/time)",
            DatatypeErrorKind::NumberFormat => "cvc-datatype-valid.1.2.1 (number)",
        }
    }
}

/// A literal that cannot be converted into a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatypeError {
    /// Failure category
    pub kind: DatatypeErrorKind,
    /// The offending literal
    pub literal: String,
    /// Name of the target type
    pub type_name: String,
    /// Additional detail
    pub reason: Option<String>,
}

impl DatatypeError {
    /// Create a new datatype error
    pub fn new(
        kind: DatatypeErrorKind,
        literal: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            literal: literal.into(),
            type_name: type_name.into(),
            reason: None,
        }
    }

    /// Shorthand for an [`DatatypeErrorKind::InvalidValue`] error
    pub fn invalid(literal: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(DatatypeErrorKind::InvalidValue, literal, type_name)
    }

    /// Shorthand for a [`DatatypeErrorKind::DateTimeFormat`] error
    pub fn date_time(literal: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(DatatypeErrorKind::DateTimeFormat, literal, type_name)
    }

    /// Shorthand for a [`DatatypeErrorKind::NumberFormat`] error
    pub fn number(literal: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(DatatypeErrorKind::NumberFormat, literal, type_name)
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Replace the target type name
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }
}

impl fmt::Display for DatatypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a valid value for '{}'",
            self.literal, self.type_name
        )?;

        if let Some(ref reason) = self.reason {
            write!(f, "\n\nReason: {}", reason)?;
        }

        Ok(())
    }
}

impl std::error::Error for DatatypeError {}

/// A value rejected by a constraining facet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Constraint code, e.g. `cvc-maxInclusive-valid`
    pub code: String,
    /// The offending lexical value
    pub value: String,
    /// Facet that rejected the value
    pub facet: Option<String>,
    /// Limiting bound, pattern or enumeration listing
    pub bound: Option<String>,
    /// Type being validated
    pub type_name: Option<String>,
    /// Additional detail
    pub reason: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
            facet: None,
            bound: None,
            type_name: None,
            reason: None,
        }
    }

    /// Set the facet name
    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facet = Some(facet.into());
        self
    }

    /// Set the limiting bound
    pub fn with_bound(mut self, bound: impl Into<String>) -> Self {
        self.bound = Some(bound.into());
        self
    }

    /// Set the type name
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: value '{}'", self.code, self.value)?;

        if let Some(ref facet) = self.facet {
            write!(f, " violates facet '{}'", facet)?;
        }

        if let Some(ref bound) = self.bound {
            write!(f, " with value '{}'", bound)?;
        }

        if let Some(ref type_name) = self.type_name {
            write!(f, "\n\nType: {}", type_name)?;
        }

        if let Some(ref reason) = self.reason {
            write!(f, "\n\nReason: {}", reason)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Inconsistent or inapplicable facets on a derived type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetError {
    /// Constraint code, e.g. `minLength-less-than-equal-to-maxLength`
    pub code: String,
    /// Type being derived
    pub type_name: String,
    /// Facet involved
    pub facet: Option<String>,
    /// Offending facet value
    pub value: Option<String>,
    /// Additional detail
    pub reason: Option<String>,
}

impl FacetError {
    /// Create a new facet error
    pub fn new(code: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            type_name: type_name.into(),
            facet: None,
            value: None,
            reason: None,
        }
    }

    /// Set the facet name
    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facet = Some(facet.into());
        self
    }

    /// Set the offending facet value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for FacetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in type '{}'", self.code, self.type_name)?;

        if let Some(ref facet) = self.facet {
            write!(f, "\n\nFacet: {}", facet)?;
        }

        if let Some(ref value) = self.value {
            write!(f, "\n\nValue: {}", value)?;
        }

        if let Some(ref reason) = self.reason {
            write!(f, "\n\nReason: {}", reason)?;
        }

        Ok(())
    }
}

impl std::error::Error for FacetError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("cvc-maxInclusive-valid", "75")
            .with_facet("maxInclusive")
            .with_bound("50")
            .with_type_name("smallInt")
            .with_reason("value is greater than the bound");

        let msg = format!("{}", err);
        assert!(msg.contains("cvc-maxInclusive-valid"));
        assert!(msg.contains("'75'"));
        assert!(msg.contains("maxInclusive"));
        assert!(msg.contains("Type: smallInt"));
        assert!(msg.contains("Reason:"));
    }

    #[test]
    fn test_datatype_error_display() {
        let err = DatatypeError::date_time("2001-02-29", "date").with_reason("day out of range");

        let msg = format!("{}", err);
        assert!(msg.contains("'2001-02-29'"));
        assert!(msg.contains("'date'"));
        assert!(msg.contains("day out of range"));
    }

    #[test]
    fn test_facet_error_display() {
        let err = FacetError::new("minLength-less-than-equal-to-maxLength", "code")
            .with_facet("minLength")
            .with_value("5");

        let msg = format!("{}", err);
        assert!(msg.contains("minLength-less-than-equal-to-maxLength"));
        assert!(msg.contains("Facet: minLength"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ValidationError::new("cvc-length-valid", "abc").into();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.code(), Some("cvc-length-valid"));
        assert!(!err.is_schema_error());

        let err: Error = FacetError::new("cos-applicable-facets", "t").into();
        assert!(err.is_schema_error());
    }
}
