//! XSD built-in types
//!
//! The built-in simple types of XML Schema, gathered in a [`TypeUniverse`].
//! Primitive types are created directly; every other built-in is derived
//! through the same [`SimpleTypeBuilder`](crate::validators::simple_types::SimpleTypeBuilder)
//! that schema-defined types use, so their facets (integer's fixed
//! `fractionDigits`, the ranges of `byte` or `unsignedLong`) are ordinary
//! facets that further restrictions are checked against.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::split_qname;
use crate::namespaces::QName;
use crate::validators::base::{SchemaVersion, ValidationContext};
use crate::validators::facets::{Facet, FacetSet, WhiteSpace};
use crate::validators::primitives::PrimitiveKind;
use crate::validators::simple_types::SimpleTypeDecl;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

// =============================================================================
// XSD Namespace Constants
// =============================================================================

/// XSD Namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSD anySimpleType type name
pub const XSD_ANY_SIMPLE_TYPE: &str = "anySimpleType";
/// XSD anyAtomicType type name (XSD 1.1)
pub const XSD_ANY_ATOMIC_TYPE: &str = "anyAtomicType";

// String types
/// XSD string type name
pub const XSD_STRING: &str = "string";
/// XSD normalizedString type name
pub const XSD_NORMALIZED_STRING: &str = "normalizedString";
/// XSD token type name
pub const XSD_TOKEN: &str = "token";
/// XSD language type name
pub const XSD_LANGUAGE: &str = "language";
/// XSD Name type name
pub const XSD_NAME: &str = "Name";
/// XSD NCName type name
pub const XSD_NCNAME: &str = "NCName";
/// XSD ID type name
pub const XSD_ID: &str = "ID";
/// XSD IDREF type name
pub const XSD_IDREF: &str = "IDREF";
/// XSD IDREFS type name
pub const XSD_IDREFS: &str = "IDREFS";
/// XSD ENTITY type name
pub const XSD_ENTITY: &str = "ENTITY";
/// XSD ENTITIES type name
pub const XSD_ENTITIES: &str = "ENTITIES";
/// XSD NMTOKEN type name
pub const XSD_NMTOKEN: &str = "NMTOKEN";
/// XSD NMTOKENS type name
pub const XSD_NMTOKENS: &str = "NMTOKENS";

// Numeric types
/// XSD decimal type name
pub const XSD_DECIMAL: &str = "decimal";
/// XSD integer type name
pub const XSD_INTEGER: &str = "integer";
/// XSD nonPositiveInteger type name
pub const XSD_NON_POSITIVE_INTEGER: &str = "nonPositiveInteger";
/// XSD negativeInteger type name
pub const XSD_NEGATIVE_INTEGER: &str = "negativeInteger";
/// XSD long type name
pub const XSD_LONG: &str = "long";
/// XSD int type name
pub const XSD_INT: &str = "int";
/// XSD short type name
pub const XSD_SHORT: &str = "short";
/// XSD byte type name
pub const XSD_BYTE: &str = "byte";
/// XSD nonNegativeInteger type name
pub const XSD_NON_NEGATIVE_INTEGER: &str = "nonNegativeInteger";
/// XSD unsignedLong type name
pub const XSD_UNSIGNED_LONG: &str = "unsignedLong";
/// XSD unsignedInt type name
pub const XSD_UNSIGNED_INT: &str = "unsignedInt";
/// XSD unsignedShort type name
pub const XSD_UNSIGNED_SHORT: &str = "unsignedShort";
/// XSD unsignedByte type name
pub const XSD_UNSIGNED_BYTE: &str = "unsignedByte";
/// XSD positiveInteger type name
pub const XSD_POSITIVE_INTEGER: &str = "positiveInteger";
/// XSD precisionDecimal type name (XSD 1.1)
pub const XSD_PRECISION_DECIMAL: &str = "precisionDecimal";

// Date and time types
/// XSD dateTime type name
pub const XSD_DATE_TIME: &str = "dateTime";
/// XSD dateTimeStamp type name (XSD 1.1)
pub const XSD_DATE_TIME_STAMP: &str = "dateTimeStamp";
/// XSD duration type name
pub const XSD_DURATION: &str = "duration";
/// XSD yearMonthDuration type name (XSD 1.1)
pub const XSD_YEAR_MONTH_DURATION: &str = "yearMonthDuration";
/// XSD dayTimeDuration type name (XSD 1.1)
pub const XSD_DAY_TIME_DURATION: &str = "dayTimeDuration";

const LANGUAGE_PATTERN: &str = "[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*";
const NAME_PATTERN: &str = r"\i\c*";
const NCNAME_PATTERN: &str = r"[\i-[:]][\c-[:]]*";
const NMTOKEN_PATTERN: &str = r"\c+";
const INTEGER_PATTERN: &str = r"[\-+]?[0-9]+";
const DATE_TIME_STAMP_PATTERN: &str = r".*(Z|(\+|-)[0-9][0-9]:[0-9][0-9])";

/// Primitive types in registration order, with the XSD 1.1 ones flagged
const PRIMITIVES: &[(PrimitiveKind, bool)] = &[
    (PrimitiveKind::String, false),
    (PrimitiveKind::Boolean, false),
    (PrimitiveKind::Decimal, false),
    (PrimitiveKind::PrecisionDecimal, true),
    (PrimitiveKind::Float, false),
    (PrimitiveKind::Double, false),
    (PrimitiveKind::Duration, false),
    (PrimitiveKind::DateTime, false),
    (PrimitiveKind::Time, false),
    (PrimitiveKind::Date, false),
    (PrimitiveKind::GYearMonth, false),
    (PrimitiveKind::GYear, false),
    (PrimitiveKind::GMonthDay, false),
    (PrimitiveKind::GDay, false),
    (PrimitiveKind::GMonth, false),
    (PrimitiveKind::HexBinary, false),
    (PrimitiveKind::Base64Binary, false),
    (PrimitiveKind::AnyUri, false),
    (PrimitiveKind::QName, false),
    (PrimitiveKind::Notation, false),
];

/// Integer subtypes: (name, base, minInclusive, maxInclusive)
const INTEGER_TYPES: &[(&str, &str, Option<&str>, Option<&str>)] = &[
    (XSD_NON_POSITIVE_INTEGER, XSD_INTEGER, None, Some("0")),
    (XSD_NEGATIVE_INTEGER, XSD_NON_POSITIVE_INTEGER, None, Some("-1")),
    (
        XSD_LONG,
        XSD_INTEGER,
        Some("-9223372036854775808"),
        Some("9223372036854775807"),
    ),
    (XSD_INT, XSD_LONG, Some("-2147483648"), Some("2147483647")),
    (XSD_SHORT, XSD_INT, Some("-32768"), Some("32767")),
    (XSD_BYTE, XSD_SHORT, Some("-128"), Some("127")),
    (XSD_NON_NEGATIVE_INTEGER, XSD_INTEGER, Some("0"), None),
    (
        XSD_UNSIGNED_LONG,
        XSD_NON_NEGATIVE_INTEGER,
        None,
        Some("18446744073709551615"),
    ),
    (XSD_UNSIGNED_INT, XSD_UNSIGNED_LONG, None, Some("4294967295")),
    (XSD_UNSIGNED_SHORT, XSD_UNSIGNED_INT, None, Some("65535")),
    (XSD_UNSIGNED_BYTE, XSD_UNSIGNED_SHORT, None, Some("255")),
    (XSD_POSITIVE_INTEGER, XSD_NON_NEGATIVE_INTEGER, Some("1"), None),
];

static XSD10: Lazy<TypeUniverse> = Lazy::new(|| {
    TypeUniverse::new(SchemaVersion::V1_0).expect("XSD 1.0 built-in types are consistent")
});

static XSD11: Lazy<TypeUniverse> = Lazy::new(|| {
    TypeUniverse::new(SchemaVersion::V1_1).expect("XSD 1.1 built-in types are consistent")
});

/// Qualified name in the XSD namespace
pub fn xsd_name(local: &str) -> QName {
    QName::namespaced(XSD_NAMESPACE, local)
}

// =============================================================================
// Type universe
// =============================================================================

/// The built-in simple types of one schema version.
///
/// A universe is immutable once built. The shared instances returned by
/// [`TypeUniverse::xsd10`] and [`TypeUniverse::xsd11`] are built on first
/// use and can be handed to any number of threads.
#[derive(Debug)]
pub struct TypeUniverse {
    version: SchemaVersion,
    types: IndexMap<String, Arc<SimpleTypeDecl>>,
}

impl TypeUniverse {
    /// Shared XSD 1.0 universe
    pub fn xsd10() -> &'static TypeUniverse {
        &XSD10
    }

    /// Shared XSD 1.1 universe
    pub fn xsd11() -> &'static TypeUniverse {
        &XSD11
    }

    /// Shared universe for a schema version
    pub fn for_version(version: SchemaVersion) -> &'static TypeUniverse {
        match version {
            SchemaVersion::V1_0 => Self::xsd10(),
            SchemaVersion::V1_1 => Self::xsd11(),
        }
    }

    /// Build a fresh universe
    pub fn new(version: SchemaVersion) -> Result<Self> {
        let mut universe = Self {
            version,
            types: IndexMap::new(),
        };
        universe.register_primitives()?;
        universe.register_string_types()?;
        universe.register_integer_types()?;
        if version == SchemaVersion::V1_1 {
            universe.register_xsd11_types()?;
        }
        tracing::debug!(
            version = %version,
            types = universe.types.len(),
            "built-in type universe constructed"
        );
        Ok(universe)
    }

    /// Schema version of this universe
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// A context for validating against types of this universe
    pub fn context(&self) -> ValidationContext {
        ValidationContext::new(self.version)
    }

    /// Look up a type by local name; a prefix such as `xs:` is ignored
    pub fn get(&self, name: &str) -> Option<Arc<SimpleTypeDecl>> {
        let (_, local) = split_qname(name);
        self.types.get(local).cloned()
    }

    /// Look up a type that must exist
    pub fn require(&self, name: &str) -> Result<Arc<SimpleTypeDecl>> {
        self.get(name).ok_or_else(|| {
            Error::Type(format!(
                "unknown built-in type '{}' in XSD {}",
                name, self.version
            ))
        })
    }

    /// Whether a built-in type of this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Type names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Declarations in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SimpleTypeDecl>> {
        self.types.values()
    }

    /// Number of built-in types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the universe is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn insert(&mut self, decl: Arc<SimpleTypeDecl>) -> Arc<SimpleTypeDecl> {
        let name = decl.display_name();
        self.types.insert(name, Arc::clone(&decl));
        decl
    }

    fn builder_context(&self) -> ValidationContext {
        ValidationContext::new(self.version).with_limits(Limits::permissive())
    }

    fn derive(&mut self, name: &str, base: &str, facets: FacetSet) -> Result<Arc<SimpleTypeDecl>> {
        let base = self.require(base)?;
        let decl = SimpleTypeDecl::restrict(&base)
            .qualified_name(xsd_name(name))
            .facets(facets)
            .build(&self.builder_context())?;
        Ok(self.insert(decl))
    }

    /// A list of `item` with at least one entry
    fn derive_list(&mut self, name: &str, item: &str) -> Result<Arc<SimpleTypeDecl>> {
        let item = self.require(item)?;
        let ctx = self.builder_context();
        let list = SimpleTypeDecl::list(None, &item, &ctx)?;
        let decl = SimpleTypeDecl::restrict(&list)
            .qualified_name(xsd_name(name))
            .facets(FacetSet::new().min_length(1))
            .build(&ctx)?;
        Ok(self.insert(decl))
    }

    fn register_primitives(&mut self) -> Result<()> {
        let any = self.insert(SimpleTypeDecl::any_simple_type(xsd_name(XSD_ANY_SIMPLE_TYPE)));
        let parent = if self.version == SchemaVersion::V1_1 {
            let atomic = SimpleTypeDecl::restrict(&any)
                .qualified_name(xsd_name(XSD_ANY_ATOMIC_TYPE))
                .build(&self.builder_context())?;
            self.insert(atomic)
        } else {
            any
        };

        for &(kind, xsd11_only) in PRIMITIVES {
            if xsd11_only && self.version != SchemaVersion::V1_1 {
                continue;
            }
            let white_space = if kind == PrimitiveKind::String {
                WhiteSpace::Preserve
            } else {
                WhiteSpace::Collapse
            };
            self.insert(SimpleTypeDecl::primitive(
                xsd_name(kind.name()),
                kind,
                &parent,
                white_space,
            ));
        }
        Ok(())
    }

    fn register_string_types(&mut self) -> Result<()> {
        self.derive(
            XSD_NORMALIZED_STRING,
            XSD_STRING,
            FacetSet::new().white_space(WhiteSpace::Replace),
        )?;
        self.derive(
            XSD_TOKEN,
            XSD_NORMALIZED_STRING,
            FacetSet::new().white_space(WhiteSpace::Collapse),
        )?;
        self.derive(XSD_LANGUAGE, XSD_TOKEN, FacetSet::new().pattern(LANGUAGE_PATTERN))?;
        self.derive(XSD_NMTOKEN, XSD_TOKEN, FacetSet::new().pattern(NMTOKEN_PATTERN))?;
        self.derive_list(XSD_NMTOKENS, XSD_NMTOKEN)?;
        self.derive(XSD_NAME, XSD_TOKEN, FacetSet::new().pattern(NAME_PATTERN))?;
        self.derive(XSD_NCNAME, XSD_NAME, FacetSet::new().pattern(NCNAME_PATTERN))?;
        self.derive(XSD_ID, XSD_NCNAME, FacetSet::new())?;
        self.derive(XSD_IDREF, XSD_NCNAME, FacetSet::new())?;
        self.derive_list(XSD_IDREFS, XSD_IDREF)?;
        self.derive(XSD_ENTITY, XSD_NCNAME, FacetSet::new())?;
        self.derive_list(XSD_ENTITIES, XSD_ENTITY)?;
        Ok(())
    }

    fn register_integer_types(&mut self) -> Result<()> {
        let decimal = self.require(XSD_DECIMAL)?;
        let integer = SimpleTypeDecl::restrict(&decimal)
            .qualified_name(xsd_name(XSD_INTEGER))
            .kind(PrimitiveKind::Integer)
            .facets(
                FacetSet::new()
                    .fraction_digits(0)
                    .fixed(Facet::FractionDigits)
                    .pattern(INTEGER_PATTERN),
            )
            .build(&self.builder_context())?;
        self.insert(integer);

        for &(name, base, min, max) in INTEGER_TYPES {
            let mut facets = FacetSet::new();
            if let Some(min) = min {
                facets = facets.min_inclusive(min);
            }
            if let Some(max) = max {
                facets = facets.max_inclusive(max);
            }
            self.derive(name, base, facets)?;
        }
        Ok(())
    }

    fn register_xsd11_types(&mut self) -> Result<()> {
        let ctx = self.builder_context();
        let duration = self.require(XSD_DURATION)?;
        for (name, kind) in [
            (XSD_YEAR_MONTH_DURATION, PrimitiveKind::YearMonthDuration),
            (XSD_DAY_TIME_DURATION, PrimitiveKind::DayTimeDuration),
        ] {
            let decl = SimpleTypeDecl::restrict(&duration)
                .qualified_name(xsd_name(name))
                .kind(kind)
                .build(&ctx)?;
            self.insert(decl);
        }
        self.derive(
            XSD_DATE_TIME_STAMP,
            XSD_DATE_TIME,
            FacetSet::new().pattern(DATE_TIME_STAMP_PATTERN),
        )?;
        Ok(())
    }
}
