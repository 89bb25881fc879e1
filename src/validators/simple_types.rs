//! XSD simple type declarations
//!
//! A [`SimpleTypeDecl`] is an immutable node of the derivation graph: an
//! atomic type backed by a primitive validator, a list of an item type, or a
//! union of member types. New declarations come from a
//! [`SimpleTypeBuilder`] (restriction) or from [`SimpleTypeDecl::list`] and
//! [`SimpleTypeDecl::union`]. The builder checks the new facets against the
//! base and folds the base's effective facets into the result, so a
//! published declaration never has to look up its chain while validating.

use crate::error::{Error, FacetError, Result, ValidationError};
use crate::namespaces::QName;
use crate::validators::base::{TypeValidator, ValidationContext, ValueOrdering};
use crate::validators::facets::{Facet, FacetMask, FacetSet, Pattern, WhiteSpace};
use crate::validators::primitives::{Ordered, PrimitiveKind};
use crate::validators::values::ActualValue;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Simple Type Variety
// =============================================================================

/// Variety of a simple type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SimpleTypeVariety {
    /// Atomic type
    Atomic,
    /// List type
    List,
    /// Union type
    Union,
}

impl SimpleTypeVariety {
    /// Variety name as used in the component model
    pub fn as_str(&self) -> &'static str {
        match self {
            SimpleTypeVariety::Atomic => "atomic",
            SimpleTypeVariety::List => "list",
            SimpleTypeVariety::Union => "union",
        }
    }
}

impl fmt::Display for SimpleTypeVariety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const LIST_FACETS: FacetMask = FacetMask::of(&[
    Facet::Length,
    Facet::MinLength,
    Facet::MaxLength,
    Facet::Pattern,
    Facet::Enumeration,
    Facet::WhiteSpace,
]);

const UNION_FACETS: FacetMask = FacetMask::of(&[Facet::Pattern, Facet::Enumeration]);

const LENGTH_FAMILY: FacetMask =
    FacetMask::of(&[Facet::Length, Facet::MinLength, Facet::MaxLength]);

// =============================================================================
// Effective facets
// =============================================================================

/// A bound or enumeration value with the literal it was given as
#[derive(Debug, Clone)]
pub struct FacetValue {
    /// Literal from the schema
    pub lexical: String,
    /// Value in the base type's value space
    pub value: ActualValue,
}

/// Facets in force on a declaration, own and inherited
#[derive(Debug, Clone, Default)]
pub struct EffectiveFacets {
    /// length
    pub length: Option<usize>,
    /// minLength
    pub min_length: Option<usize>,
    /// maxLength
    pub max_length: Option<usize>,
    /// whiteSpace
    pub white_space: Option<WhiteSpace>,
    /// One pattern per derivation step; a value must match all of them
    pub patterns: Vec<Pattern>,
    /// enumeration
    pub enumeration: Option<Vec<FacetValue>>,
    /// maxInclusive
    pub max_inclusive: Option<FacetValue>,
    /// maxExclusive
    pub max_exclusive: Option<FacetValue>,
    /// minInclusive
    pub min_inclusive: Option<FacetValue>,
    /// minExclusive
    pub min_exclusive: Option<FacetValue>,
    /// totalDigits
    pub total_digits: Option<usize>,
    /// fractionDigits
    pub fraction_digits: Option<usize>,
    /// maxScale
    pub max_scale: Option<i64>,
    /// minScale
    pub min_scale: Option<i64>,
    /// Facets that may not be changed by further restriction
    pub fixed: FacetMask,
    /// Facet annotations
    pub annotations: IndexMap<Facet, String>,
}

impl EffectiveFacets {
    /// Facets with a value
    pub fn defined(&self) -> FacetMask {
        let flags = [
            (self.length.is_some(), Facet::Length),
            (self.min_length.is_some(), Facet::MinLength),
            (self.max_length.is_some(), Facet::MaxLength),
            (!self.patterns.is_empty(), Facet::Pattern),
            (self.white_space.is_some(), Facet::WhiteSpace),
            (self.max_inclusive.is_some(), Facet::MaxInclusive),
            (self.max_exclusive.is_some(), Facet::MaxExclusive),
            (self.min_exclusive.is_some(), Facet::MinExclusive),
            (self.min_inclusive.is_some(), Facet::MinInclusive),
            (self.total_digits.is_some(), Facet::TotalDigits),
            (self.fraction_digits.is_some(), Facet::FractionDigits),
            (self.enumeration.is_some(), Facet::Enumeration),
            (self.max_scale.is_some(), Facet::MaxScale),
            (self.min_scale.is_some(), Facet::MinScale),
        ];
        let mut mask = FacetMask::EMPTY;
        for (present, facet) in flags {
            if present {
                mask.insert(facet);
            }
        }
        mask
    }

    fn bound(&self, facet: Facet) -> Option<&FacetValue> {
        match facet {
            Facet::MaxInclusive => self.max_inclusive.as_ref(),
            Facet::MaxExclusive => self.max_exclusive.as_ref(),
            Facet::MinInclusive => self.min_inclusive.as_ref(),
            Facet::MinExclusive => self.min_exclusive.as_ref(),
            _ => None,
        }
    }
}

/// Outcome of a successful validation
#[derive(Debug, Clone)]
pub struct ValidatedInfo {
    /// Literal after whitespace normalization
    pub normalized: String,
    /// The parsed value
    pub value: ActualValue,
    /// For unions, the member type that accepted the literal
    pub member_type: Option<Arc<SimpleTypeDecl>>,
}

// =============================================================================
// SimpleTypeDecl
// =============================================================================

/// An immutable simple type declaration
#[derive(Debug)]
pub struct SimpleTypeDecl {
    name: Option<QName>,
    variety: SimpleTypeVariety,
    kind: Option<PrimitiveKind>,
    base: Option<Arc<SimpleTypeDecl>>,
    item_type: Option<Arc<SimpleTypeDecl>>,
    member_types: Vec<Arc<SimpleTypeDecl>>,
    facets: EffectiveFacets,
    depth: usize,
    ordered: Ordered,
    bounded: bool,
    numeric: bool,
}

impl SimpleTypeDecl {
    /// The ur-type of all simple types
    pub(crate) fn any_simple_type(name: QName) -> Arc<Self> {
        Arc::new(Self {
            name: Some(name),
            variety: SimpleTypeVariety::Atomic,
            kind: Some(PrimitiveKind::AnySimpleType),
            base: None,
            item_type: None,
            member_types: Vec::new(),
            facets: EffectiveFacets::default(),
            depth: 0,
            ordered: Ordered::False,
            bounded: false,
            numeric: false,
        })
    }

    /// A primitive type directly below `base`
    pub(crate) fn primitive(
        name: QName,
        kind: PrimitiveKind,
        base: &Arc<SimpleTypeDecl>,
        white_space: WhiteSpace,
    ) -> Arc<Self> {
        let mut facets = EffectiveFacets {
            white_space: Some(white_space),
            ..EffectiveFacets::default()
        };
        if white_space == WhiteSpace::Collapse {
            facets.fixed.insert(Facet::WhiteSpace);
        }
        Arc::new(Self {
            name: Some(name),
            variety: SimpleTypeVariety::Atomic,
            kind: Some(kind),
            base: Some(Arc::clone(base)),
            item_type: None,
            member_types: Vec::new(),
            facets,
            depth: base.depth + 1,
            ordered: kind.ordered(),
            bounded: false,
            numeric: kind.is_numeric(),
        })
    }

    /// Start a restriction of `base`
    pub fn restrict(base: &Arc<SimpleTypeDecl>) -> SimpleTypeBuilder {
        SimpleTypeBuilder::new(Arc::clone(base))
    }

    /// Derive a list type.
    ///
    /// The item type must be atomic or a union of atomic types.
    pub fn list(
        name: Option<QName>,
        item_type: &Arc<SimpleTypeDecl>,
        ctx: &ValidationContext,
    ) -> Result<Arc<Self>> {
        let type_name = display_name(name.as_ref());
        if item_type.variety == SimpleTypeVariety::List {
            return Err(FacetError::new("cos-st-restricts.2.1", &type_name)
                .with_reason(format!(
                    "item type '{}' is itself a list",
                    item_type.display_name()
                ))
                .into());
        }
        if item_type.contains_list() {
            return Err(FacetError::new("cos-list-of-atomic", &type_name)
                .with_reason(format!(
                    "item type '{}' has a list member",
                    item_type.display_name()
                ))
                .into());
        }
        let depth = item_type.depth + 1;
        ctx.limits.check_derivation_depth(depth)?;

        let mut facets = EffectiveFacets {
            white_space: Some(WhiteSpace::Collapse),
            ..EffectiveFacets::default()
        };
        facets.fixed.insert(Facet::WhiteSpace);

        let decl = Arc::new(Self {
            name,
            variety: SimpleTypeVariety::List,
            kind: None,
            base: Some(item_type.root()),
            item_type: Some(Arc::clone(item_type)),
            member_types: Vec::new(),
            facets,
            depth,
            ordered: Ordered::False,
            bounded: false,
            numeric: false,
        });
        tracing::debug!(
            type_name = %decl.display_name(),
            item_type = %item_type.display_name(),
            "published list type"
        );
        Ok(decl)
    }

    /// Derive a union type; members are tried in order
    pub fn union(
        name: Option<QName>,
        member_types: Vec<Arc<SimpleTypeDecl>>,
        ctx: &ValidationContext,
    ) -> Result<Arc<Self>> {
        let type_name = display_name(name.as_ref());
        let first = member_types.first().ok_or_else(|| {
            Error::from(
                FacetError::new("src-union-memberTypes-or-simpleTypes", &type_name)
                    .with_reason("a union needs at least one member type"),
            )
        })?;
        let depth = member_types.iter().map(|m| m.depth).max().unwrap_or(0) + 1;
        ctx.limits.check_derivation_depth(depth)?;

        let (ordered, bounded, numeric) = union_fundamentals(&member_types);
        let decl = Arc::new(Self {
            name,
            variety: SimpleTypeVariety::Union,
            kind: None,
            base: Some(first.root()),
            item_type: None,
            member_types,
            facets: EffectiveFacets::default(),
            depth,
            ordered,
            bounded,
            numeric,
        });
        tracing::debug!(
            type_name = %decl.display_name(),
            members = decl.member_types.len(),
            "published union type"
        );
        Ok(decl)
    }

    fn root(self: &Arc<Self>) -> Arc<Self> {
        let mut current = Arc::clone(self);
        while let Some(base) = current.base.clone() {
            current = base;
        }
        current
    }

    fn contains_list(&self) -> bool {
        match self.variety {
            SimpleTypeVariety::List => true,
            SimpleTypeVariety::Union => self.member_types.iter().any(|m| m.contains_list()),
            SimpleTypeVariety::Atomic => false,
        }
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Qualified name, `None` for anonymous types
    pub fn name(&self) -> Option<&QName> {
        self.name.as_ref()
    }

    /// Local name, or `anonymous`
    pub fn display_name(&self) -> String {
        display_name(self.name.as_ref())
    }

    /// Variety
    pub fn variety(&self) -> SimpleTypeVariety {
        self.variety
    }

    /// Primitive kind of an atomic type
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.kind
    }

    /// Base type; `None` only for anySimpleType
    pub fn base_type(&self) -> Option<&Arc<SimpleTypeDecl>> {
        self.base.as_ref()
    }

    /// Item type of a list
    pub fn item_type(&self) -> Option<&Arc<SimpleTypeDecl>> {
        self.item_type.as_ref()
    }

    /// Member types of a union
    pub fn member_types(&self) -> &[Arc<SimpleTypeDecl>] {
        &self.member_types
    }

    /// Effective facets
    pub fn facets(&self) -> &EffectiveFacets {
        &self.facets
    }

    /// Facets this type admits in a further restriction
    pub fn allowed_facets(&self) -> FacetMask {
        match (self.variety, self.kind) {
            (SimpleTypeVariety::Atomic, Some(kind)) => kind.allowed_facets(),
            (SimpleTypeVariety::List, _) => LIST_FACETS,
            (SimpleTypeVariety::Union, _) => UNION_FACETS,
            (SimpleTypeVariety::Atomic, None) => FacetMask::EMPTY,
        }
    }

    /// Facets with a value, own or inherited
    pub fn defined_facets(&self) -> FacetMask {
        self.facets.defined()
    }

    /// Whether a facet has a value
    pub fn is_defined_facet(&self, facet: Facet) -> bool {
        self.defined_facets().contains(facet)
    }

    /// Facets that are fixed
    pub fn fixed_facets(&self) -> FacetMask {
        self.facets.fixed
    }

    /// Whether a facet is fixed
    pub fn is_fixed_facet(&self, facet: Facet) -> bool {
        self.facets.fixed.contains(facet)
    }

    /// Effective whitespace handling
    pub fn white_space(&self) -> WhiteSpace {
        self.facets.white_space.unwrap_or(WhiteSpace::Preserve)
    }

    /// Lexical value of a single-valued facet
    pub fn lexical_facet_value(&self, facet: Facet) -> Option<String> {
        let f = &self.facets;
        match facet {
            Facet::Length => f.length.map(|v| v.to_string()),
            Facet::MinLength => f.min_length.map(|v| v.to_string()),
            Facet::MaxLength => f.max_length.map(|v| v.to_string()),
            Facet::WhiteSpace => f.white_space.map(|w| w.as_str().to_string()),
            Facet::MaxInclusive | Facet::MaxExclusive | Facet::MinInclusive | Facet::MinExclusive => {
                f.bound(facet).map(|b| b.lexical.clone())
            }
            Facet::TotalDigits => f.total_digits.map(|v| v.to_string()),
            Facet::FractionDigits => f.fraction_digits.map(|v| v.to_string()),
            Facet::MaxScale => f.max_scale.map(|v| v.to_string()),
            Facet::MinScale => f.min_scale.map(|v| v.to_string()),
            Facet::Pattern | Facet::Enumeration => None,
        }
    }

    /// Enumeration literals
    pub fn lexical_enumeration(&self) -> Option<Vec<String>> {
        self.facets
            .enumeration
            .as_ref()
            .map(|values| values.iter().map(|v| v.lexical.clone()).collect())
    }

    /// Pattern literals, one entry per derivation step
    pub fn lexical_patterns(&self) -> Vec<Vec<String>> {
        self.facets
            .patterns
            .iter()
            .map(|p| p.sources().to_vec())
            .collect()
    }

    /// Annotation attached to a facet
    pub fn facet_annotation(&self, facet: Facet) -> Option<&str> {
        self.facets.annotations.get(&facet).map(String::as_str)
    }

    /// The `ordered` fundamental facet
    pub fn ordered(&self) -> Ordered {
        self.ordered
    }

    /// The `bounded` fundamental facet
    pub fn bounded(&self) -> bool {
        self.bounded
    }

    /// The `numeric` fundamental facet
    pub fn numeric(&self) -> bool {
        self.numeric
    }

    /// Whether this type is `name` or derives from it by restriction
    pub fn is_derived_from(&self, name: &str) -> bool {
        let mut current = Some(self);
        while let Some(decl) = current {
            if decl.name.as_ref().map(|n| n.local_name.as_str()) == Some(name) {
                return true;
            }
            current = decl.base.as_deref();
        }
        false
    }

    /// Introspection snapshot
    pub fn summary(&self) -> FacetSummary {
        let mut facets = IndexMap::new();
        for facet in self.defined_facets().iter() {
            if let Some(value) = self.lexical_facet_value(facet) {
                facets.insert(facet.name(), value);
            }
        }
        FacetSummary {
            name: self.name.as_ref().map(|n| n.local_name.clone()),
            variety: self.variety,
            primitive: self.kind.map(PrimitiveKind::primitive),
            base: self.base.as_ref().map(|b| b.display_name()),
            item_type: self.item_type.as_ref().map(|t| t.display_name()),
            member_types: self.member_types.iter().map(|m| m.display_name()).collect(),
            ordered: self.ordered,
            bounded: self.bounded,
            numeric: self.numeric,
            defined: self.defined_facets(),
            fixed: self.fixed_facets(),
            facets,
            patterns: self.lexical_patterns(),
            enumeration: self.lexical_enumeration(),
            annotations: self
                .facets
                .annotations
                .iter()
                .map(|(facet, text)| (facet.name(), text.clone()))
                .collect(),
        }
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Validate a literal and return its value
    pub fn validate(&self, lexical: &str, ctx: &ValidationContext) -> Result<ActualValue> {
        self.validate_info(lexical, ctx).map(|info| info.value)
    }

    /// Whether a literal is valid
    pub fn is_valid(&self, lexical: &str, ctx: &ValidationContext) -> bool {
        self.validate_info(lexical, ctx).is_ok()
    }

    /// Validate a literal, keeping the normalized form and matched member
    pub fn validate_info(&self, lexical: &str, ctx: &ValidationContext) -> Result<ValidatedInfo> {
        let result = self.validate_inner(lexical, ctx);
        if let Err(ref e) = result {
            tracing::trace!(
                type_name = %self.display_name(),
                code = e.code().unwrap_or("-"),
                "value rejected"
            );
        }
        result
    }

    fn validate_inner(&self, lexical: &str, ctx: &ValidationContext) -> Result<ValidatedInfo> {
        ctx.limits.check_value_length(lexical)?;
        let normalized = self.white_space().normalize(lexical).into_owned();
        let (value, member_type) = self.parse_value(&normalized, ctx)?;
        if ctx.check_facets {
            self.check_facets(&normalized, &value)?;
        }
        self.check_extra_rules(&value, ctx)?;
        Ok(ValidatedInfo {
            normalized,
            value,
            member_type,
        })
    }

    fn parse_value(
        &self,
        normalized: &str,
        ctx: &ValidationContext,
    ) -> Result<(ActualValue, Option<Arc<SimpleTypeDecl>>)> {
        match self.variety {
            SimpleTypeVariety::Atomic => {
                let kind = self.kind.unwrap_or(PrimitiveKind::AnySimpleType);
                let value = kind
                    .validator()
                    .parse(normalized, ctx)
                    .map_err(|e| self.tag_error(e))?;
                Ok((value, None))
            }
            SimpleTypeVariety::List => {
                let item_type = self
                    .item_type
                    .as_ref()
                    .ok_or_else(|| Error::Type(format!("list '{}' has no item type", self.display_name())))?;
                let items: Vec<&str> = normalized.split(' ').filter(|s| !s.is_empty()).collect();
                ctx.limits.check_list_items(items.len())?;
                let values = items
                    .into_iter()
                    .map(|item| item_type.validate(item, ctx))
                    .collect::<Result<Vec<_>>>()?;
                Ok((ActualValue::List(values), None))
            }
            SimpleTypeVariety::Union => {
                let mut last_error = None;
                for (index, member) in self.member_types.iter().enumerate() {
                    match member.validate_info(normalized, ctx) {
                        Ok(info) => {
                            let value = ActualValue::UnionMember {
                                index,
                                value: Box::new(info.value),
                            };
                            return Ok((value, Some(Arc::clone(member))));
                        }
                        Err(e) => {
                            tracing::trace!(
                                type_name = %self.display_name(),
                                member = %member.display_name(),
                                "union member rejected value"
                            );
                            last_error = Some(e);
                        }
                    }
                }
                let mut error = ValidationError::new("cvc-datatype-valid.1.2.3", normalized)
                    .with_type_name(self.display_name());
                if let Some(e) = last_error {
                    error = error.with_reason(e.to_string());
                }
                Err(error.into())
            }
        }
    }

    fn tag_error(&self, error: Error) -> Error {
        match error {
            Error::Datatype(e) => Error::Datatype(e.with_type_name(self.display_name())),
            Error::Validation(e) if e.type_name.is_none() => {
                Error::Validation(e.with_type_name(self.display_name()))
            }
            other => other,
        }
    }

    fn violation(&self, code: &str, value: &str, facet: Facet, bound: impl Into<String>) -> Error {
        ValidationError::new(code, value)
            .with_facet(facet.name())
            .with_bound(bound)
            .with_type_name(self.display_name())
            .into()
    }

    fn validator(&self) -> Option<&'static dyn TypeValidator> {
        match self.variety {
            SimpleTypeVariety::Atomic => self.kind.map(PrimitiveKind::validator),
            _ => None,
        }
    }

    /// Length as measured by the length facets
    pub fn data_length(&self, value: &ActualValue) -> usize {
        match (value.as_list(), self.validator()) {
            (Some(items), _) => items.len(),
            (None, Some(validator)) => validator.data_length(value),
            (None, None) => 0,
        }
    }

    fn check_facets(&self, normalized: &str, value: &ActualValue) -> Result<()> {
        let f = &self.facets;
        let defined = f.defined();
        let validator = self.validator();

        let skip_length = self.kind.map_or(false, PrimitiveKind::ignores_length);
        if defined.intersects(LENGTH_FAMILY) && !skip_length {
            let length = self.data_length(value);
            if let Some(expected) = f.length {
                if length != expected {
                    return Err(self.violation(
                        "cvc-length-valid",
                        normalized,
                        Facet::Length,
                        expected.to_string(),
                    ));
                }
            }
            if let Some(min) = f.min_length {
                if length < min {
                    return Err(self.violation(
                        "cvc-minLength-valid",
                        normalized,
                        Facet::MinLength,
                        min.to_string(),
                    ));
                }
            }
            if let Some(max) = f.max_length {
                if length > max {
                    return Err(self.violation(
                        "cvc-maxLength-valid",
                        normalized,
                        Facet::MaxLength,
                        max.to_string(),
                    ));
                }
            }
        }

        if let Some(values) = &f.enumeration {
            if !values.iter().any(|e| e.value.equals_value(value)) {
                let listing = values
                    .iter()
                    .map(|e| e.lexical.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(self.violation(
                    "cvc-enumeration-valid",
                    normalized,
                    Facet::Enumeration,
                    format!("[{}]", listing),
                ));
            }
        }

        if let Some(validator) = validator {
            if let Some(max) = f.fraction_digits {
                if validator.fraction_digits(value) > max {
                    return Err(self.violation(
                        "cvc-fractionDigits-valid",
                        normalized,
                        Facet::FractionDigits,
                        max.to_string(),
                    ));
                }
            }
            if let Some(max) = f.total_digits {
                if validator.total_digits(value) > max {
                    return Err(self.violation(
                        "cvc-totalDigits-valid",
                        normalized,
                        Facet::TotalDigits,
                        max.to_string(),
                    ));
                }
            }
        }

        let bound_checks: [(Facet, &str, &[ValueOrdering]); 4] = [
            (
                Facet::MaxInclusive,
                "cvc-maxInclusive-valid",
                &[ValueOrdering::Less, ValueOrdering::Equal],
            ),
            (Facet::MaxExclusive, "cvc-maxExclusive-valid", &[ValueOrdering::Less]),
            (
                Facet::MinInclusive,
                "cvc-minInclusive-valid",
                &[ValueOrdering::Greater, ValueOrdering::Equal],
            ),
            (Facet::MinExclusive, "cvc-minExclusive-valid", &[ValueOrdering::Greater]),
        ];
        for (facet, code, accepted) in bound_checks {
            if let Some(bound) = f.bound(facet) {
                if !accepted.contains(&value.compare(&bound.value)) {
                    return Err(self.violation(code, normalized, facet, bound.lexical.clone()));
                }
            }
        }

        if let Some(validator) = validator {
            if let Some(max) = f.max_scale {
                if validator.scale(value) > max {
                    return Err(self.violation(
                        "cvc-maxScale-valid",
                        normalized,
                        Facet::MaxScale,
                        max.to_string(),
                    ));
                }
            }
            if let Some(min) = f.min_scale {
                if validator.scale(value) < min {
                    return Err(self.violation(
                        "cvc-minScale-valid",
                        normalized,
                        Facet::MinScale,
                        min.to_string(),
                    ));
                }
            }
        }

        for pattern in &f.patterns {
            pattern.validate(normalized).map_err(|e| self.tag_error(e))?;
        }
        Ok(())
    }

    fn check_extra_rules(&self, value: &ActualValue, ctx: &ValidationContext) -> Result<()> {
        match self.validator() {
            Some(validator) => validator
                .check_extra_rules(value, ctx)
                .map_err(|e| self.tag_error(e)),
            None => Ok(()),
        }
    }

    /// Order two values of this type
    pub fn compare(&self, a: &ActualValue, b: &ActualValue) -> ValueOrdering {
        a.compare(b)
    }

    /// Identity of two values of this type
    pub fn is_identical(&self, a: &ActualValue, b: &ActualValue) -> bool {
        a.is_identical(b)
    }
}

impl fmt::Display for SimpleTypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.variety)
    }
}

fn display_name(name: Option<&QName>) -> String {
    name.map_or_else(|| "anonymous".to_string(), |n| n.local_name.clone())
}

fn union_fundamentals(members: &[Arc<SimpleTypeDecl>]) -> (Ordered, bool, bool) {
    let kinds: Vec<Option<PrimitiveKind>> = members
        .iter()
        .map(|m| m.kind.map(PrimitiveKind::primitive))
        .collect();
    let shared = match kinds.first() {
        Some(Some(first)) if kinds.iter().all(|k| *k == Some(*first)) => true,
        _ => false,
    };
    if !shared {
        return (Ordered::False, false, false);
    }
    let ordered = members.first().map_or(Ordered::False, |m| m.ordered);
    let bounded = members.iter().all(|m| m.bounded);
    let numeric = members.iter().all(|m| m.numeric);
    (ordered, bounded, numeric)
}

/// Serializable view of a declaration's facets
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetSummary {
    /// Type name
    pub name: Option<String>,
    /// Variety
    pub variety: SimpleTypeVariety,
    /// Primitive type of an atomic type
    pub primitive: Option<PrimitiveKind>,
    /// Base type name
    pub base: Option<String>,
    /// Item type name of a list
    pub item_type: Option<String>,
    /// Member type names of a union
    pub member_types: Vec<String>,
    /// `ordered` fundamental facet
    pub ordered: Ordered,
    /// `bounded` fundamental facet
    pub bounded: bool,
    /// `numeric` fundamental facet
    pub numeric: bool,
    /// Defined facets
    pub defined: FacetMask,
    /// Fixed facets
    pub fixed: FacetMask,
    /// Lexical values of single-valued facets
    pub facets: IndexMap<&'static str, String>,
    /// Patterns per derivation step
    pub patterns: Vec<Vec<String>>,
    /// Enumeration literals
    pub enumeration: Option<Vec<String>>,
    /// Facet annotations
    pub annotations: IndexMap<&'static str, String>,
}

// =============================================================================
// Restriction builder
// =============================================================================

/// Builds a restriction of a base type.
///
/// ```
/// use xsd_datatypes::{FacetSet, SimpleTypeDecl, TypeUniverse, ValidationContext};
///
/// let universe = TypeUniverse::xsd10();
/// let ctx = ValidationContext::default();
/// let percent = SimpleTypeDecl::restrict(&universe.require("integer").unwrap())
///     .name("percent")
///     .facets(FacetSet::new().min_inclusive("0").max_inclusive("100"))
///     .build(&ctx)
///     .unwrap();
/// assert!(percent.is_valid("42", &ctx));
/// assert!(!percent.is_valid("142", &ctx));
/// ```
#[derive(Debug, Clone)]
pub struct SimpleTypeBuilder {
    base: Arc<SimpleTypeDecl>,
    name: Option<QName>,
    facets: FacetSet,
    kind: Option<PrimitiveKind>,
}

impl SimpleTypeBuilder {
    /// Start a restriction of `base`
    pub fn new(base: Arc<SimpleTypeDecl>) -> Self {
        Self {
            base,
            name: None,
            facets: FacetSet::new(),
            kind: None,
        }
    }

    /// Name the new type (no namespace)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(QName::local(name));
        self
    }

    /// Give the new type a qualified name
    pub fn qualified_name(mut self, name: QName) -> Self {
        self.name = Some(name);
        self
    }

    /// Facets of this restriction step
    pub fn facets(mut self, facets: FacetSet) -> Self {
        self.facets = facets;
        self
    }

    /// Switch to a narrower primitive validator (integer below decimal,
    /// the 1.1 durations below duration)
    pub(crate) fn kind(mut self, kind: PrimitiveKind) -> Self {
        self.kind = Some(kind);
        self
    }

    fn error(&self, code: &str, facet: Facet) -> FacetError {
        FacetError::new(code, display_name(self.name.as_ref())).with_facet(facet.name())
    }

    /// Check the facets and publish the new declaration
    pub fn build(self, ctx: &ValidationContext) -> Result<Arc<SimpleTypeDecl>> {
        let base = Arc::clone(&self.base);
        let depth = base.depth + 1;
        ctx.limits.check_derivation_depth(depth)?;
        let type_name = display_name(self.name.as_ref());
        let given = &self.facets;

        let present = given.present();
        let allowed = base.allowed_facets();
        if let Some(facet) = present.iter().find(|f| !allowed.contains(*f)) {
            return Err(self
                .error("cos-applicable-facets", facet)
                .with_reason(format!(
                    "facet '{}' is not applicable to type '{}'",
                    facet,
                    base.display_name()
                ))
                .into());
        }
        if let Some(values) = &given.enumeration {
            ctx.limits.check_enumeration_values(values.len())?;
        }
        for pattern in &given.patterns {
            ctx.limits.check_pattern_length(pattern)?;
        }

        let own = self.convert(&base, ctx, &type_name)?;
        self.check_fixed(&base, &own)?;
        self.check_within_step(&own)?;
        self.check_against_base(&base, &own)?;

        let facets = inherit(&base.facets, own);
        let kind = self.kind.or(base.kind);
        let (ordered, numeric) = match (base.variety, kind) {
            (SimpleTypeVariety::Atomic, Some(kind)) => (kind.ordered(), kind.is_numeric()),
            _ => (base.ordered, base.numeric),
        };
        let bounded = match base.variety {
            SimpleTypeVariety::Atomic => {
                ordered != Ordered::False
                    && (facets.min_inclusive.is_some() || facets.min_exclusive.is_some())
                    && (facets.max_inclusive.is_some() || facets.max_exclusive.is_some())
            }
            _ => base.bounded,
        };

        let decl = Arc::new(SimpleTypeDecl {
            name: self.name,
            variety: base.variety,
            kind,
            base: Some(Arc::clone(&base)),
            item_type: base.item_type.clone(),
            member_types: base.member_types.clone(),
            facets,
            depth,
            ordered,
            bounded,
            numeric,
        });
        tracing::debug!(
            type_name = %decl.display_name(),
            base = %base.display_name(),
            variety = %decl.variety,
            defined = decl.defined_facets().bits(),
            "published restricted type"
        );
        Ok(decl)
    }

    /// Convert the given facets into typed values, checking bound and
    /// enumeration literals against the base type
    fn convert(
        &self,
        base: &Arc<SimpleTypeDecl>,
        ctx: &ValidationContext,
        type_name: &str,
    ) -> Result<EffectiveFacets> {
        let given = &self.facets;
        let mut own = EffectiveFacets {
            length: given.length,
            min_length: given.min_length,
            max_length: given.max_length,
            white_space: given.white_space,
            total_digits: given.total_digits,
            fraction_digits: given.fraction_digits,
            max_scale: given.max_scale,
            min_scale: given.min_scale,
            fixed: given.fixed.intersection(given.present()),
            annotations: given.annotations.clone(),
            ..EffectiveFacets::default()
        };

        if !given.patterns.is_empty() {
            own.patterns
                .push(Pattern::new(given.patterns.clone(), type_name)?);
        }

        let checking = ctx.clone().with_facet_checking(true);
        if let Some(literals) = &given.enumeration {
            let mut values = Vec::with_capacity(literals.len());
            for literal in literals {
                let value = base.validate(literal, &checking).map_err(|e| {
                    self.error("enumeration-valid-restriction", Facet::Enumeration)
                        .with_value(literal.clone())
                        .with_reason(e.to_string())
                })?;
                values.push(FacetValue {
                    lexical: literal.clone(),
                    value,
                });
            }
            own.enumeration = Some(values);
        }

        let bounds = [
            (Facet::MaxInclusive, &given.max_inclusive),
            (Facet::MaxExclusive, &given.max_exclusive),
            (Facet::MinInclusive, &given.min_inclusive),
            (Facet::MinExclusive, &given.min_exclusive),
        ];
        for (facet, literal) in bounds {
            let Some(literal) = literal else { continue };
            let value = self.convert_bound(base, facet, literal, &checking)?;
            let converted = Some(FacetValue {
                lexical: literal.clone(),
                value,
            });
            match facet {
                Facet::MaxInclusive => own.max_inclusive = converted,
                Facet::MaxExclusive => own.max_exclusive = converted,
                Facet::MinInclusive => own.min_inclusive = converted,
                _ => own.min_exclusive = converted,
            }
        }
        Ok(own)
    }

    fn convert_bound(
        &self,
        base: &Arc<SimpleTypeDecl>,
        facet: Facet,
        literal: &str,
        ctx: &ValidationContext,
    ) -> Result<ActualValue> {
        let from_base = |e: Error| -> Error {
            self.error("FacetValueFromBase", facet)
                .with_value(literal)
                .with_reason(e.to_string())
                .into()
        };
        // An exclusive bound may repeat the base's own exclusive bound even
        // though that value lies outside the base's value space.
        if matches!(facet, Facet::MaxExclusive | Facet::MinExclusive) {
            if let Some(base_bound) = base.facets.bound(facet) {
                let parsed = base
                    .validate(literal, &ctx.clone().with_facet_checking(false))
                    .map_err(from_base)?;
                if parsed.compare(&base_bound.value) == ValueOrdering::Equal {
                    return Ok(parsed);
                }
            }
        }
        base.validate(literal, ctx).map_err(from_base)
    }

    fn check_fixed(&self, base: &SimpleTypeDecl, own: &EffectiveFacets) -> Result<()> {
        let b = &base.facets;
        let changed = |facet: Facet| -> bool {
            match facet {
                Facet::Length => own.length.is_some() && own.length != b.length,
                Facet::MinLength => own.min_length.is_some() && own.min_length != b.min_length,
                Facet::MaxLength => own.max_length.is_some() && own.max_length != b.max_length,
                Facet::WhiteSpace => own.white_space.is_some() && own.white_space != b.white_space,
                Facet::TotalDigits => {
                    own.total_digits.is_some() && own.total_digits != b.total_digits
                }
                Facet::FractionDigits => {
                    own.fraction_digits.is_some() && own.fraction_digits != b.fraction_digits
                }
                Facet::MaxScale => own.max_scale.is_some() && own.max_scale != b.max_scale,
                Facet::MinScale => own.min_scale.is_some() && own.min_scale != b.min_scale,
                Facet::MaxInclusive | Facet::MaxExclusive | Facet::MinInclusive | Facet::MinExclusive => {
                    match (own.bound(facet), b.bound(facet)) {
                        (Some(mine), Some(theirs)) => {
                            mine.value.compare(&theirs.value) != ValueOrdering::Equal
                        }
                        _ => false,
                    }
                }
                Facet::Pattern | Facet::Enumeration => false,
            }
        };
        for facet in b.fixed.iter() {
            if changed(facet) {
                return Err(self
                    .error("FixedFacetValue", facet)
                    .with_value(self.lexical(own, facet))
                    .with_reason(format!(
                        "facet '{}' is fixed to '{}' in type '{}'",
                        facet,
                        base.lexical_facet_value(facet).unwrap_or_default(),
                        base.display_name()
                    ))
                    .into());
            }
        }
        Ok(())
    }

    fn lexical(&self, own: &EffectiveFacets, facet: Facet) -> String {
        match facet {
            Facet::Length => own.length.map(|v| v.to_string()),
            Facet::MinLength => own.min_length.map(|v| v.to_string()),
            Facet::MaxLength => own.max_length.map(|v| v.to_string()),
            Facet::WhiteSpace => own.white_space.map(|w| w.as_str().to_string()),
            Facet::TotalDigits => own.total_digits.map(|v| v.to_string()),
            Facet::FractionDigits => own.fraction_digits.map(|v| v.to_string()),
            Facet::MaxScale => own.max_scale.map(|v| v.to_string()),
            Facet::MinScale => own.min_scale.map(|v| v.to_string()),
            _ => own.bound(facet).map(|b| b.lexical.clone()),
        }
        .unwrap_or_default()
    }

    fn check_within_step(&self, own: &EffectiveFacets) -> Result<()> {
        if let Some(length) = own.length {
            if own.min_length.map_or(false, |min| min > length) {
                return Err(self.error("length-minLength-maxLength.1.1", Facet::Length).into());
            }
            if own.max_length.map_or(false, |max| max < length) {
                return Err(self.error("length-minLength-maxLength.2.1", Facet::Length).into());
            }
        }
        if let (Some(min), Some(max)) = (own.min_length, own.max_length) {
            if min > max {
                return Err(self
                    .error("minLength-less-than-equal-to-maxLength", Facet::MinLength)
                    .with_value(min.to_string())
                    .into());
            }
        }

        if own.max_inclusive.is_some() && own.max_exclusive.is_some() {
            return Err(self.error("maxInclusive-maxExclusive", Facet::MaxInclusive).into());
        }
        if own.min_inclusive.is_some() && own.min_exclusive.is_some() {
            return Err(self.error("minInclusive-minExclusive", Facet::MinInclusive).into());
        }

        let pairs: [(&Option<FacetValue>, &Option<FacetValue>, &str, Facet, bool); 4] = [
            (
                &own.min_inclusive,
                &own.max_inclusive,
                "minInclusive-less-than-equal-to-maxInclusive",
                Facet::MinInclusive,
                true,
            ),
            (
                &own.min_exclusive,
                &own.max_exclusive,
                "minExclusive-less-than-equal-to-maxExclusive",
                Facet::MinExclusive,
                true,
            ),
            (
                &own.min_exclusive,
                &own.max_inclusive,
                "minExclusive-less-than-maxInclusive",
                Facet::MinExclusive,
                false,
            ),
            (
                &own.min_inclusive,
                &own.max_exclusive,
                "minInclusive-less-than-maxExclusive",
                Facet::MinInclusive,
                false,
            ),
        ];
        for (min, max, code, facet, equal_ok) in pairs {
            if let (Some(min), Some(max)) = (min, max) {
                let ordering = min.value.compare(&max.value);
                let ok = ordering == ValueOrdering::Less
                    || (equal_ok && ordering == ValueOrdering::Equal);
                if !ok {
                    return Err(self
                        .error(code, facet)
                        .with_value(min.lexical.clone())
                        .with_reason(format!("limit is '{}'", max.lexical))
                        .into());
                }
            }
        }

        if let (Some(fraction), Some(total)) = (own.fraction_digits, own.total_digits) {
            if fraction > total {
                return Err(self
                    .error("fractionDigits-totalDigits", Facet::FractionDigits)
                    .with_value(fraction.to_string())
                    .into());
            }
        }
        if let (Some(min), Some(max)) = (own.min_scale, own.max_scale) {
            if min > max {
                return Err(self
                    .error("minScale-maxScale", Facet::MinScale)
                    .with_value(min.to_string())
                    .into());
            }
        }
        Ok(())
    }

    fn check_against_base(&self, base: &SimpleTypeDecl, own: &EffectiveFacets) -> Result<()> {
        let b = &base.facets;

        if let Some(length) = own.length {
            if b.length.map_or(false, |base_length| base_length != length) {
                return Err(self.error("length-valid-restriction", Facet::Length).into());
            }
            if b.min_length.map_or(false, |min| min > length) {
                return Err(self.error("length-minLength-maxLength.1.1", Facet::Length).into());
            }
            if b.max_length.map_or(false, |max| max < length) {
                return Err(self.error("length-minLength-maxLength.2.1", Facet::Length).into());
            }
        }
        if let Some(min) = own.min_length {
            if b.length.map_or(false, |length| min > length) {
                return Err(self.error("length-minLength-maxLength.1.1", Facet::MinLength).into());
            }
            if b.min_length.map_or(false, |base_min| min < base_min) {
                return Err(self.error("minLength-valid-restriction", Facet::MinLength).into());
            }
            if own.max_length.is_none() && b.max_length.map_or(false, |max| min > max) {
                return Err(self
                    .error("minLength-less-than-equal-to-maxLength", Facet::MinLength)
                    .into());
            }
        }
        if let Some(max) = own.max_length {
            if b.length.map_or(false, |length| max < length) {
                return Err(self.error("length-minLength-maxLength.2.1", Facet::MaxLength).into());
            }
            if b.max_length.map_or(false, |base_max| max > base_max) {
                return Err(self.error("maxLength-valid-restriction", Facet::MaxLength).into());
            }
            if own.min_length.is_none() && b.min_length.map_or(false, |min| min > max) {
                return Err(self
                    .error("minLength-less-than-equal-to-maxLength", Facet::MaxLength)
                    .into());
            }
        }

        if let Some(total) = own.total_digits {
            if b.total_digits.map_or(false, |base_total| total > base_total) {
                return Err(self.error("totalDigits-valid-restriction", Facet::TotalDigits).into());
            }
            if own.fraction_digits.is_none() && b.fraction_digits.map_or(false, |f| f > total) {
                return Err(self.error("fractionDigits-totalDigits", Facet::TotalDigits).into());
            }
        }
        if let Some(fraction) = own.fraction_digits {
            if b.fraction_digits.map_or(false, |base_fraction| fraction > base_fraction) {
                return Err(self
                    .error("fractionDigits-valid-restriction", Facet::FractionDigits)
                    .into());
            }
            if own.total_digits.is_none() && b.total_digits.map_or(false, |t| fraction > t) {
                return Err(self
                    .error("fractionDigits-totalDigits", Facet::FractionDigits)
                    .into());
            }
        }

        if let (Some(mine), Some(theirs)) = (own.white_space, b.white_space) {
            if mine == WhiteSpace::Preserve && theirs != WhiteSpace::Preserve {
                return Err(self.error("whiteSpace-valid-restriction.1", Facet::WhiteSpace).into());
            }
            if mine == WhiteSpace::Replace && theirs == WhiteSpace::Collapse {
                return Err(self.error("whiteSpace-valid-restriction.2", Facet::WhiteSpace).into());
            }
        }

        if let Some(max) = own.max_scale {
            if b.max_scale.map_or(false, |base_max| max > base_max) {
                return Err(self.error("maxScale-valid-restriction", Facet::MaxScale).into());
            }
            if own.min_scale.is_none() && b.min_scale.map_or(false, |min| min > max) {
                return Err(self.error("minScale-maxScale", Facet::MaxScale).into());
            }
        }
        if let Some(min) = own.min_scale {
            if b.min_scale.map_or(false, |base_min| min < base_min) {
                return Err(self.error("minScale-valid-restriction", Facet::MinScale).into());
            }
            if own.max_scale.is_none() && b.max_scale.map_or(false, |max| min > max) {
                return Err(self.error("minScale-maxScale", Facet::MinScale).into());
            }
        }

        self.check_bounds_against_base(b, own)
    }

    /// Each new bound against each bound of the base. The suffix of the
    /// error code names which base bound was violated.
    fn check_bounds_against_base(&self, b: &EffectiveFacets, own: &EffectiveFacets) -> Result<()> {
        use ValueOrdering::{Equal, Greater, Less};
        const LESS_OR_EQUAL: &[ValueOrdering] = &[Less, Equal];
        const LESS: &[ValueOrdering] = &[Less];
        const GREATER_OR_EQUAL: &[ValueOrdering] = &[Greater, Equal];
        const GREATER: &[ValueOrdering] = &[Greater];

        // (derived facet, base facet, accepted orderings, code suffix)
        let rules: [(Facet, Facet, &[ValueOrdering], u8); 16] = [
            (Facet::MaxInclusive, Facet::MaxInclusive, LESS_OR_EQUAL, 1),
            (Facet::MaxInclusive, Facet::MaxExclusive, LESS, 2),
            (Facet::MaxInclusive, Facet::MinInclusive, GREATER_OR_EQUAL, 3),
            (Facet::MaxInclusive, Facet::MinExclusive, GREATER, 4),
            (Facet::MaxExclusive, Facet::MaxExclusive, LESS_OR_EQUAL, 1),
            (Facet::MaxExclusive, Facet::MaxInclusive, LESS_OR_EQUAL, 2),
            (Facet::MaxExclusive, Facet::MinExclusive, GREATER, 3),
            (Facet::MaxExclusive, Facet::MinInclusive, GREATER, 4),
            (Facet::MinExclusive, Facet::MinExclusive, GREATER_OR_EQUAL, 1),
            (Facet::MinExclusive, Facet::MaxInclusive, LESS_OR_EQUAL, 2),
            (Facet::MinExclusive, Facet::MinInclusive, GREATER_OR_EQUAL, 3),
            (Facet::MinExclusive, Facet::MaxExclusive, LESS, 4),
            (Facet::MinInclusive, Facet::MinInclusive, GREATER_OR_EQUAL, 1),
            (Facet::MinInclusive, Facet::MaxInclusive, LESS_OR_EQUAL, 2),
            (Facet::MinInclusive, Facet::MinExclusive, GREATER, 3),
            (Facet::MinInclusive, Facet::MaxExclusive, LESS, 4),
        ];

        for (derived, base_facet, accepted, suffix) in rules {
            if let (Some(mine), Some(theirs)) = (own.bound(derived), b.bound(base_facet)) {
                if !accepted.contains(&mine.value.compare(&theirs.value)) {
                    return Err(self
                        .error(
                            &format!("{}-valid-restriction.{}", derived.name(), suffix),
                            derived,
                        )
                        .with_value(mine.lexical.clone())
                        .with_reason(format!(
                            "base type has {} '{}'",
                            base_facet.name(),
                            theirs.lexical
                        ))
                        .into());
                }
            }
        }
        Ok(())
    }
}

/// Fold the own facets of a restriction step over the base's effective facets
fn inherit(base: &EffectiveFacets, own: EffectiveFacets) -> EffectiveFacets {
    let mut facets = base.clone();

    if own.length.is_some() {
        facets.length = own.length;
    }
    if own.min_length.is_some() {
        facets.min_length = own.min_length;
    }
    if own.max_length.is_some() {
        facets.max_length = own.max_length;
    }
    if own.white_space.is_some() {
        facets.white_space = own.white_space;
    }
    facets.patterns.extend(own.patterns);
    if own.enumeration.is_some() {
        facets.enumeration = own.enumeration;
    }
    if own.max_inclusive.is_some() || own.max_exclusive.is_some() {
        facets.max_inclusive = own.max_inclusive;
        facets.max_exclusive = own.max_exclusive;
    }
    if own.min_inclusive.is_some() || own.min_exclusive.is_some() {
        facets.min_inclusive = own.min_inclusive;
        facets.min_exclusive = own.min_exclusive;
    }
    if own.total_digits.is_some() {
        facets.total_digits = own.total_digits;
    }
    if own.fraction_digits.is_some() {
        facets.fraction_digits = own.fraction_digits;
    }
    if own.max_scale.is_some() {
        facets.max_scale = own.max_scale;
    }
    if own.min_scale.is_some() {
        facets.min_scale = own.min_scale;
    }

    // A fixed bit survives only while its facet is still defined.
    let defined = facets.defined();
    facets.fixed = base.fixed.union(own.fixed).intersection(defined);
    for (facet, text) in own.annotations {
        facets.annotations.insert(facet, text);
    }
    facets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::builtins::TypeUniverse;

    fn ctx() -> ValidationContext {
        ValidationContext::default()
    }

    fn builtin(name: &str) -> Arc<SimpleTypeDecl> {
        TypeUniverse::xsd10().require(name).unwrap()
    }

    fn restrict(base: &Arc<SimpleTypeDecl>, facets: FacetSet) -> Result<Arc<SimpleTypeDecl>> {
        SimpleTypeDecl::restrict(base)
            .name("derived")
            .facets(facets)
            .build(&ctx())
    }

    fn code(result: Result<Arc<SimpleTypeDecl>>) -> String {
        result.unwrap_err().code().unwrap_or_default().to_string()
    }

    #[test]
    fn test_inapplicable_facet() {
        let err = code(restrict(&builtin("boolean"), FacetSet::new().max_length(3)));
        assert_eq!(err, "cos-applicable-facets");
        let err = code(restrict(&builtin("string"), FacetSet::new().total_digits(3)));
        assert_eq!(err, "cos-applicable-facets");
    }

    #[test]
    fn test_bound_narrowing() {
        let base = restrict(&builtin("integer"), FacetSet::new().max_inclusive("100")).unwrap();
        let err = restrict(&base, FacetSet::new().max_inclusive("150")).unwrap_err();
        assert!(err.is_schema_error());

        let narrow = restrict(&base, FacetSet::new().max_inclusive("50")).unwrap();
        assert!(narrow.is_valid("50", &ctx()));
        let err = narrow.validate("75", &ctx()).unwrap_err();
        assert_eq!(err.code(), Some("cvc-maxInclusive-valid"));
    }

    #[test]
    fn test_within_step_consistency() {
        let string = builtin("string");
        assert_eq!(
            code(restrict(&string, FacetSet::new().min_length(5).max_length(2))),
            "minLength-less-than-equal-to-maxLength"
        );
        assert_eq!(
            code(restrict(&string, FacetSet::new().length(3).min_length(4))),
            "length-minLength-maxLength.1.1"
        );
        let decimal = builtin("decimal");
        assert_eq!(
            code(restrict(
                &decimal,
                FacetSet::new().max_inclusive("5").max_exclusive("6")
            )),
            "maxInclusive-maxExclusive"
        );
        assert_eq!(
            code(restrict(
                &decimal,
                FacetSet::new().min_inclusive("5").max_inclusive("4")
            )),
            "minInclusive-less-than-equal-to-maxInclusive"
        );
        assert_eq!(
            code(restrict(
                &decimal,
                FacetSet::new().min_exclusive("5").max_inclusive("5")
            )),
            "minExclusive-less-than-maxInclusive"
        );
        assert_eq!(
            code(restrict(
                &decimal,
                FacetSet::new().total_digits(2).fraction_digits(3)
            )),
            "fractionDigits-totalDigits"
        );
    }

    #[test]
    fn test_fixed_facets() {
        let integer = builtin("integer");
        assert_eq!(
            code(restrict(&integer, FacetSet::new().fraction_digits(2))),
            "FixedFacetValue"
        );
        assert!(restrict(&integer, FacetSet::new().fraction_digits(0)).is_ok());

        let fixed = restrict(
            &builtin("string"),
            FacetSet::new().max_length(10).fixed(Facet::MaxLength),
        )
        .unwrap();
        assert!(fixed.is_fixed_facet(Facet::MaxLength));
        assert_eq!(
            code(restrict(&fixed, FacetSet::new().max_length(5))),
            "FixedFacetValue"
        );
    }

    #[test]
    fn test_whitespace_only_tightens() {
        let token = builtin("token");
        assert_eq!(
            code(restrict(&token, FacetSet::new().white_space(WhiteSpace::Preserve))),
            "whiteSpace-valid-restriction.1"
        );
        let normalized = builtin("normalizedString");
        assert!(restrict(&normalized, FacetSet::new().white_space(WhiteSpace::Collapse)).is_ok());
        assert_eq!(
            code(restrict(&builtin("decimal"), FacetSet::new().white_space(WhiteSpace::Replace))),
            "FixedFacetValue"
        );
    }

    #[test]
    fn test_bound_literal_must_be_in_base() {
        let byte = builtin("byte");
        assert_eq!(
            code(restrict(&byte, FacetSet::new().max_inclusive("300"))),
            "FacetValueFromBase"
        );
        assert_eq!(
            code(restrict(&byte, FacetSet::new().max_inclusive("abc"))),
            "FacetValueFromBase"
        );
    }

    #[test]
    fn test_exclusive_bound_may_repeat_base() {
        let base = restrict(&builtin("decimal"), FacetSet::new().max_exclusive("10")).unwrap();
        let again = restrict(&base, FacetSet::new().max_exclusive("10")).unwrap();
        assert!(!again.is_valid("10", &ctx()));
        assert!(again.is_valid("9.99", &ctx()));
    }

    #[test]
    fn test_bound_restriction_codes() {
        let base = restrict(
            &builtin("decimal"),
            FacetSet::new().min_inclusive("0").max_exclusive("10"),
        )
        .unwrap();
        assert_eq!(
            code(restrict(&base, FacetSet::new().max_exclusive("11"))),
            "FacetValueFromBase"
        );
        let plain = restrict(&builtin("decimal"), FacetSet::new().min_exclusive("0")).unwrap();
        assert_eq!(
            code(restrict(&plain, FacetSet::new().min_exclusive("-1"))),
            "FacetValueFromBase"
        );
    }

    #[test]
    fn test_enumeration_from_base() {
        let small = restrict(&builtin("integer"), FacetSet::new().max_inclusive("10")).unwrap();
        assert_eq!(
            code(restrict(&small, FacetSet::new().enumeration(["5", "20"]))),
            "enumeration-valid-restriction"
        );
        let colors = restrict(
            &builtin("token"),
            FacetSet::new().enumeration(["red", "green"]),
        )
        .unwrap();
        assert!(colors.is_valid("  red ", &ctx()));
        let err = colors.validate("blue", &ctx()).unwrap_err();
        assert_eq!(err.code(), Some("cvc-enumeration-valid"));
    }

    #[test]
    fn test_inherited_bounds_replaced_per_side() {
        let base = restrict(
            &builtin("decimal"),
            FacetSet::new().min_inclusive("0").max_inclusive("100"),
        )
        .unwrap();
        let derived = restrict(&base, FacetSet::new().max_exclusive("50")).unwrap();
        assert!(derived.is_defined_facet(Facet::MinInclusive));
        assert!(derived.is_defined_facet(Facet::MaxExclusive));
        assert!(!derived.is_defined_facet(Facet::MaxInclusive));
        assert!(derived.bounded());
        assert!(!derived.is_valid("50", &ctx()));
        assert!(!derived.is_valid("-1", &ctx()));
    }

    #[test]
    fn test_patterns_accumulate() {
        let first = restrict(&builtin("string"), FacetSet::new().pattern("[a-z]+")).unwrap();
        let second = restrict(&first, FacetSet::new().pattern(".{3}")).unwrap();
        assert!(second.is_valid("abc", &ctx()));
        assert!(!second.is_valid("abcd", &ctx()));
        assert!(!second.is_valid("AB1", &ctx()));
        assert_eq!(second.lexical_patterns().len(), 2);
    }

    #[test]
    fn test_digit_facets() {
        let money = restrict(
            &builtin("decimal"),
            FacetSet::new().total_digits(5).fraction_digits(2),
        )
        .unwrap();
        assert!(money.is_valid("123.45", &ctx()));
        assert_eq!(
            money.validate("1.234", &ctx()).unwrap_err().code(),
            Some("cvc-fractionDigits-valid")
        );
        assert_eq!(
            money.validate("1234.5", &ctx()).unwrap_err().code(),
            Some("cvc-totalDigits-valid")
        );
    }

    #[test]
    fn test_list_of_enumerated_items() {
        let item = restrict(
            &builtin("integer"),
            FacetSet::new().enumeration(["1", "2", "3", "4"]),
        )
        .unwrap();
        let list = SimpleTypeDecl::list(Some(QName::local("numbers")), &item, &ctx()).unwrap();
        assert!(list.is_valid("1 2 3", &ctx()));
        let err = list.validate("1 2 5", &ctx()).unwrap_err();
        assert_eq!(err.code(), Some("cvc-enumeration-valid"));
    }

    #[test]
    fn test_list_length_counts_items() {
        let list = SimpleTypeDecl::list(None, &builtin("integer"), &ctx()).unwrap();
        let short = restrict(&list, FacetSet::new().max_length(2)).unwrap();
        assert!(short.is_valid(" 1\t2 ", &ctx()));
        assert_eq!(
            short.validate("1 2 3", &ctx()).unwrap_err().code(),
            Some("cvc-maxLength-valid")
        );
        assert_eq!(short.variety(), SimpleTypeVariety::List);
    }

    #[test]
    fn test_list_enumeration_compares_items() {
        let list = SimpleTypeDecl::list(None, &builtin("decimal"), &ctx()).unwrap();
        let pairs = restrict(&list, FacetSet::new().enumeration(["1 2", "3 4"])).unwrap();
        assert!(pairs.is_valid("1.0 2.00", &ctx()));
        assert!(!pairs.is_valid("1 3", &ctx()));
    }

    #[test]
    fn test_list_of_list_rejected() {
        let list = SimpleTypeDecl::list(None, &builtin("integer"), &ctx()).unwrap();
        let err = SimpleTypeDecl::list(None, &list, &ctx()).unwrap_err();
        assert_eq!(err.code(), Some("cos-st-restricts.2.1"));

        let union = SimpleTypeDecl::union(None, vec![list, builtin("date")], &ctx()).unwrap();
        let err = SimpleTypeDecl::list(None, &union, &ctx()).unwrap_err();
        assert_eq!(err.code(), Some("cos-list-of-atomic"));
    }

    #[test]
    fn test_union_tries_members_in_order() {
        let union = SimpleTypeDecl::union(
            Some(QName::local("sizeOrWord")),
            vec![builtin("integer"), builtin("token")],
            &ctx(),
        )
        .unwrap();
        let info = union.validate_info("42", &ctx()).unwrap();
        assert_eq!(info.member_type.unwrap().display_name(), "integer");
        let info = union.validate_info("large", &ctx()).unwrap();
        assert_eq!(info.member_type.unwrap().display_name(), "token");
        assert_eq!(union.ordered(), Ordered::False);

        let numbers =
            SimpleTypeDecl::union(None, vec![builtin("byte"), builtin("boolean")], &ctx()).unwrap();
        let err = numbers.validate("300", &ctx()).unwrap_err();
        assert_eq!(err.code(), Some("cvc-datatype-valid.1.2.3"));
    }

    #[test]
    fn test_union_enumeration() {
        let union =
            SimpleTypeDecl::union(None, vec![builtin("integer"), builtin("date")], &ctx()).unwrap();
        let restricted = restrict(
            &union,
            FacetSet::new().enumeration(["1", "2000-01-01"]),
        )
        .unwrap();
        assert!(restricted.is_valid("01", &ctx()));
        assert!(restricted.is_valid("2000-01-01", &ctx()));
        assert!(!restricted.is_valid("2", &ctx()));
        assert_eq!(
            code(restrict(&union, FacetSet::new().max_length(3))),
            "cos-applicable-facets"
        );
    }

    #[test]
    fn test_datatype_errors_name_the_type() {
        let percent = restrict(&builtin("integer"), FacetSet::new().max_inclusive("100")).unwrap();
        match percent.validate("abc", &ctx()).unwrap_err() {
            Error::Datatype(e) => assert_eq!(e.type_name, "derived"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_facet_checking_can_be_disabled() {
        let small = restrict(&builtin("integer"), FacetSet::new().max_inclusive("10")).unwrap();
        let lexical_only = ctx().with_facet_checking(false);
        assert!(small.is_valid("100", &lexical_only));
        assert!(!small.is_valid("1.5", &lexical_only));
    }

    #[test]
    fn test_annotations_are_inherited() {
        let base = restrict(
            &builtin("string"),
            FacetSet::new()
                .max_length(8)
                .annotate(Facet::MaxLength, "short codes"),
        )
        .unwrap();
        let derived = restrict(&base, FacetSet::new().min_length(1)).unwrap();
        assert_eq!(derived.facet_annotation(Facet::MaxLength), Some("short codes"));
        assert_eq!(derived.lexical_facet_value(Facet::MaxLength).as_deref(), Some("8"));
    }

    #[test]
    fn test_derivation_depth_limit() {
        use crate::limits::Limits;
        let limits = Limits {
            max_derivation_depth: 3,
            ..Limits::default()
        };
        let tight = ctx().with_limits(limits);
        let err = SimpleTypeDecl::restrict(&builtin("int"))
            .build(&tight)
            .unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
    }
}
