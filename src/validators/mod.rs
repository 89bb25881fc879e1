//! XML Schema datatype validators
//!
//! This module contains the value parsers of the primitive datatypes and the
//! facet engine that derives new simple types from them.

// Foundation
pub mod base;
pub mod facets;
pub mod helpers;

// Primitive value spaces
pub mod datetime;
pub mod decimal;
pub mod double;
pub mod precision_decimal;
pub mod primitives;
pub mod values;

// Type system
pub mod builtins;
pub mod simple_types;

// Re-exports
pub use base::{SchemaVersion, TypeValidator, ValidationContext, ValueOrdering};
pub use builtins::{TypeUniverse, XSD_NAMESPACE};
pub use datetime::duration::{compare_durations, duration_totals, DURATION_LIMIT};
pub use datetime::{compare_dates, CalendarKind, DateTimeData, ZoneMarker};
pub use decimal::XsdDecimal;
pub use double::{XsdDouble, XsdFloat};
pub use facets::{Facet, FacetMask, FacetSet, Pattern, WhiteSpace};
pub use precision_decimal::PrecisionDecimal;
pub use primitives::{Ordered, PrimitiveKind};
pub use simple_types::{
    EffectiveFacets, FacetSummary, FacetValue, SimpleTypeBuilder, SimpleTypeDecl,
    SimpleTypeVariety, ValidatedInfo,
};
pub use values::ActualValue;
