//! Base validator infrastructure
//!
//! The [`TypeValidator`] contract every primitive datatype implements, the
//! four-state [`ValueOrdering`] it compares with, and the
//! [`ValidationContext`] threaded through every parse and validation call.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::NamespaceContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;
use std::cmp::Ordering;
use std::fmt;

/// Result of comparing two values of a partially ordered value space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOrdering {
    /// First value is smaller
    Less,
    /// Values are equal
    Equal,
    /// First value is greater
    Greater,
    /// Values are incomparable
    Indeterminate,
}

impl ValueOrdering {
    /// Swap Less and Greater
    pub fn reverse(self) -> Self {
        match self {
            ValueOrdering::Less => ValueOrdering::Greater,
            ValueOrdering::Greater => ValueOrdering::Less,
            other => other,
        }
    }

    /// Convert to a total ordering, if determinate
    pub fn to_ordering(self) -> Option<Ordering> {
        match self {
            ValueOrdering::Less => Some(Ordering::Less),
            ValueOrdering::Equal => Some(Ordering::Equal),
            ValueOrdering::Greater => Some(Ordering::Greater),
            ValueOrdering::Indeterminate => None,
        }
    }

    /// Get the ordering as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueOrdering::Less => "less",
            ValueOrdering::Equal => "equal",
            ValueOrdering::Greater => "greater",
            ValueOrdering::Indeterminate => "indeterminate",
        }
    }
}

impl From<Ordering> for ValueOrdering {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => ValueOrdering::Less,
            Ordering::Equal => ValueOrdering::Equal,
            Ordering::Greater => ValueOrdering::Greater,
        }
    }
}

impl From<Option<Ordering>> for ValueOrdering {
    fn from(ordering: Option<Ordering>) -> Self {
        ordering.map_or(ValueOrdering::Indeterminate, ValueOrdering::from)
    }
}

impl fmt::Display for ValueOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// XML Schema version whose datatype rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SchemaVersion {
    /// XSD 1.0
    #[default]
    V1_0,
    /// XSD 1.1
    V1_1,
}

impl SchemaVersion {
    /// Parse a version from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "1.0" => Ok(SchemaVersion::V1_0),
            "1.1" => Ok(SchemaVersion::V1_1),
            _ => Err(Error::Value(format!(
                "Invalid schema version: '{}'. Must be '1.0' or '1.1'",
                s
            ))),
        }
    }

    /// Get the version as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1_0 => "1.0",
            SchemaVersion::V1_1 => "1.1",
        }
    }

    /// Whether year 0000 is a legal year
    pub fn allows_year_zero(&self) -> bool {
        *self == SchemaVersion::V1_1
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State threaded through parsing, validation and type derivation
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Datatype rules in force
    pub version: SchemaVersion,
    /// Processing limits
    pub limits: Limits,
    /// In-scope namespaces for QName and NOTATION values
    pub namespaces: Option<NamespaceContext>,
    /// When false only the lexical parse runs
    pub check_facets: bool,
}

impl ValidationContext {
    /// Create a context for a schema version
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Set the processing limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the namespace bindings
    pub fn with_namespaces(mut self, namespaces: NamespaceContext) -> Self {
        self.namespaces = Some(namespaces);
        self
    }

    /// Enable or disable facet checking
    pub fn with_facet_checking(mut self, check_facets: bool) -> Self {
        self.check_facets = check_facets;
        self
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            version: SchemaVersion::V1_0,
            limits: Limits::default(),
            namespaces: None,
            check_facets: true,
        }
    }
}

/// Behaviour of one primitive datatype.
///
/// Implementations are stateless; the value model lives in [`ActualValue`].
/// Values of a foreign kind never compare equal and order as
/// [`ValueOrdering::Indeterminate`]. Unordered datatypes only need
/// `is_equal`, whose default matches values of the same variant by their
/// canonical form; ordered datatypes override `compare`.
pub trait TypeValidator: fmt::Debug + Send + Sync {
    /// Facets this datatype admits
    fn allowed_facets(&self) -> FacetMask;

    /// Convert a whitespace-normalized literal into a value
    fn parse(&self, lexical: &str, ctx: &ValidationContext) -> Result<ActualValue>;

    /// Order two values
    fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrdering {
        if self.is_equal(a, b) {
            ValueOrdering::Equal
        } else {
            ValueOrdering::Indeterminate
        }
    }

    /// Value-space equality
    fn is_equal(&self, a: &ActualValue, b: &ActualValue) -> bool {
        std::mem::discriminant(a) == std::mem::discriminant(b) && a.canonical() == b.canonical()
    }

    /// Identity, which may distinguish equal values
    fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        self.is_equal(a, b)
    }

    /// Length as measured by the length facets
    fn data_length(&self, value: &ActualValue) -> usize {
        match value {
            ActualValue::String(s) | ActualValue::AnyUri(s) => s.chars().count(),
            _ => 0,
        }
    }

    /// Number of significant digits
    fn total_digits(&self, _value: &ActualValue) -> usize {
        0
    }

    /// Number of fraction digits
    fn fraction_digits(&self, _value: &ActualValue) -> usize {
        0
    }

    /// Arithmetic precision, for datatypes with a scale
    fn scale(&self, _value: &ActualValue) -> i64 {
        0
    }

    /// Context-dependent checks run after facet validation
    fn check_extra_rules(&self, _value: &ActualValue, _ctx: &ValidationContext) -> Result<()> {
        Ok(())
    }
}
