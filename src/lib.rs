//! # xsd-datatypes
//!
//! XML Schema (XSD 1.0 and XSD 1.1) simple-type datatypes.
//!
//! The crate parses literals into the value spaces of the built-in
//! primitive types, orders and compares those values (including the partial
//! orders of date/time values and durations), and derives new simple types
//! by restriction, list and union with full facet checking.
//!
//! ## Features
//!
//! - All XSD 1.0 built-in simple types, plus the XSD 1.1 additions
//!   (`precisionDecimal`, `yearMonthDuration`, `dayTimeDuration`,
//!   `dateTimeStamp`, `anyAtomicType`)
//! - Four-valued ordering (`less`, `equal`, `greater`, `indeterminate`)
//! - Facet derivation with the schema-component constraint checks
//! - Canonical rendering of every value
//! - Processing limits against hostile input
//!
//! ## Example
//!
//! ```rust
//! use xsd_datatypes::{FacetSet, SimpleTypeDecl, TypeUniverse, ValueOrdering};
//!
//! let universe = TypeUniverse::xsd10();
//! let ctx = universe.context();
//!
//! let date_time = universe.require("dateTime")?;
//! let zoned = date_time.validate("2000-01-01T12:00:00Z", &ctx)?;
//! let local = date_time.validate("2000-01-01T12:00:00", &ctx)?;
//! assert_eq!(date_time.compare(&zoned, &local), ValueOrdering::Indeterminate);
//!
//! let small = SimpleTypeDecl::restrict(&universe.require("int")?)
//!     .name("small")
//!     .facets(FacetSet::new().max_exclusive("10"))
//!     .build(&ctx)?;
//! assert!(small.is_valid(" 9 ", &ctx));
//! assert!(!small.is_valid("10", &ctx));
//! # Ok::<(), xsd_datatypes::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod namespaces;

// Datatypes
pub mod validators;

// Re-exports for convenience
pub use error::{DatatypeError, Error, FacetError, Result, ValidationError};
pub use limits::Limits;
pub use namespaces::{NamespaceContext, QName, QNameValue, XML_NAMESPACE};
pub use validators::{
    ActualValue, CalendarKind, DateTimeData, Facet, FacetMask, FacetSet, FacetSummary, Ordered,
    PrimitiveKind, SchemaVersion, SimpleTypeBuilder, SimpleTypeDecl, SimpleTypeVariety,
    TypeUniverse, ValidatedInfo, ValidationContext, ValueOrdering, WhiteSpace,
};

/// Version of the xsd-datatypes library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_1_0_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSD 1.1 namespace
pub const XSD_1_1_NAMESPACE: &str = "http://www.w3.org/2009/XMLSchema";
