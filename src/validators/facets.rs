//! XSD constraining facets
//!
//! The facet vocabulary shared by every datatype: facet identifiers and
//! bitmasks, whitespace policies, the lexical facet input of a restriction
//! step, and compiled pattern facets.

use crate::error::{Error, FacetError, Result, ValidationError};
use crate::validators::helpers::translate_pattern;
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

// =============================================================================
// Facet identifiers
// =============================================================================

/// A constraining facet, carrying its component-model bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
#[repr(u16)]
pub enum Facet {
    /// Exact length
    Length = 1,
    /// Minimum length
    MinLength = 2,
    /// Maximum length
    MaxLength = 4,
    /// Regular expression constraint
    Pattern = 8,
    /// Whitespace normalization policy
    WhiteSpace = 16,
    /// Inclusive upper bound
    MaxInclusive = 32,
    /// Exclusive upper bound
    MaxExclusive = 64,
    /// Exclusive lower bound
    MinExclusive = 128,
    /// Inclusive lower bound
    MinInclusive = 256,
    /// Maximum number of significant digits
    TotalDigits = 512,
    /// Maximum number of fraction digits
    FractionDigits = 1024,
    /// Closed set of values
    Enumeration = 2048,
    /// Maximum arithmetic precision
    MaxScale = 4096,
    /// Minimum arithmetic precision
    MinScale = 8192,
}

impl Facet {
    /// All facets in bit order
    pub const ALL: [Facet; 14] = [
        Facet::Length,
        Facet::MinLength,
        Facet::MaxLength,
        Facet::Pattern,
        Facet::WhiteSpace,
        Facet::MaxInclusive,
        Facet::MaxExclusive,
        Facet::MinExclusive,
        Facet::MinInclusive,
        Facet::TotalDigits,
        Facet::FractionDigits,
        Facet::Enumeration,
        Facet::MaxScale,
        Facet::MinScale,
    ];

    /// Bit value of the facet
    pub const fn bit(self) -> u16 {
        self as u16
    }

    /// Schema keyword of the facet
    pub fn name(self) -> &'static str {
        match self {
            Facet::Length => "length",
            Facet::MinLength => "minLength",
            Facet::MaxLength => "maxLength",
            Facet::Pattern => "pattern",
            Facet::WhiteSpace => "whiteSpace",
            Facet::MaxInclusive => "maxInclusive",
            Facet::MaxExclusive => "maxExclusive",
            Facet::MinExclusive => "minExclusive",
            Facet::MinInclusive => "minInclusive",
            Facet::TotalDigits => "totalDigits",
            Facet::FractionDigits => "fractionDigits",
            Facet::Enumeration => "enumeration",
            Facet::MaxScale => "maxScale",
            Facet::MinScale => "minScale",
        }
    }

    /// Look up a facet by its schema keyword
    pub fn from_name(name: &str) -> Option<Facet> {
        Facet::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of facets as a bitmask
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FacetMask(u16);

impl FacetMask {
    /// The empty mask
    pub const EMPTY: FacetMask = FacetMask(0);

    /// Build a mask from raw bits, dropping unknown bits
    pub const fn from_bits(bits: u16) -> Self {
        FacetMask(bits & 0x3fff)
    }

    /// Build a mask from a list of facets
    pub const fn of(facets: &[Facet]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < facets.len() {
            bits |= facets[i].bit();
            i += 1;
        }
        FacetMask(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether the facet is in the mask
    pub const fn contains(self, facet: Facet) -> bool {
        self.0 & facet.bit() != 0
    }

    /// Whether any facet of `other` is in the mask
    pub const fn intersects(self, other: FacetMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether the mask is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Add a facet
    pub fn insert(&mut self, facet: Facet) {
        self.0 |= facet.bit();
    }

    /// Remove a facet
    pub fn remove(&mut self, facet: Facet) {
        self.0 &= !facet.bit();
    }

    /// Union of two masks
    pub const fn union(self, other: FacetMask) -> Self {
        FacetMask(self.0 | other.0)
    }

    /// Intersection of two masks
    pub const fn intersection(self, other: FacetMask) -> Self {
        FacetMask(self.0 & other.0)
    }

    /// Facets of `self` missing from `other`
    pub const fn difference(self, other: FacetMask) -> Self {
        FacetMask(self.0 & !other.0)
    }

    /// Iterate over the facets in bit order
    pub fn iter(self) -> impl Iterator<Item = Facet> {
        Facet::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl BitOr for FacetMask {
    type Output = FacetMask;

    fn bitor(self, rhs: FacetMask) -> FacetMask {
        self.union(rhs)
    }
}

impl BitOr<Facet> for FacetMask {
    type Output = FacetMask;

    fn bitor(self, rhs: Facet) -> FacetMask {
        FacetMask(self.0 | rhs.bit())
    }
}

impl From<Facet> for FacetMask {
    fn from(facet: Facet) -> Self {
        FacetMask(facet.bit())
    }
}

impl fmt::Debug for FacetMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Facet::name)).finish()
    }
}

impl Serialize for FacetMask {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

// =============================================================================
// WhiteSpace
// =============================================================================

/// White space handling modes, ordered from loosest to tightest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WhiteSpace {
    /// Preserve all white space
    Preserve,
    /// Replace tabs and newlines with spaces
    Replace,
    /// Replace and collapse multiple spaces
    Collapse,
}

impl WhiteSpace {
    /// Schema keyword of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            WhiteSpace::Preserve => "preserve",
            WhiteSpace::Replace => "replace",
            WhiteSpace::Collapse => "collapse",
        }
    }

    /// Normalize a string according to this white space mode
    pub fn normalize<'a>(&self, s: &'a str) -> Cow<'a, str> {
        const WS: [char; 3] = ['\t', '\n', '\r'];
        match self {
            WhiteSpace::Preserve => Cow::Borrowed(s),
            WhiteSpace::Replace => {
                if s.contains(WS) {
                    Cow::Owned(s.replace(WS, " "))
                } else {
                    Cow::Borrowed(s)
                }
            }
            WhiteSpace::Collapse => {
                let is_collapsed = !s.contains(WS)
                    && !s.contains("  ")
                    && !s.starts_with(' ')
                    && !s.ends_with(' ');
                if is_collapsed {
                    return Cow::Borrowed(s);
                }

                let mut result = String::with_capacity(s.len());
                for word in s.split([' ', '\t', '\n', '\r']).filter(|w| !w.is_empty()) {
                    if !result.is_empty() {
                        result.push(' ');
                    }
                    result.push_str(word);
                }
                Cow::Owned(result)
            }
        }
    }
}

impl FromStr for WhiteSpace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "preserve" => Ok(WhiteSpace::Preserve),
            "replace" => Ok(WhiteSpace::Replace),
            "collapse" => Ok(WhiteSpace::Collapse),
            _ => Err(Error::Value(format!(
                "Invalid whiteSpace value: '{}'. Must be 'preserve', 'replace', or 'collapse'",
                s
            ))),
        }
    }
}

impl fmt::Display for WhiteSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Facet input of a restriction step
// =============================================================================

/// Facets supplied by one restriction step, in lexical form.
///
/// Which facets are present follows from which fields are set; bound and
/// enumeration literals are converted through the base type when the
/// restriction is built.
#[derive(Debug, Clone, Default)]
pub struct FacetSet {
    /// length
    pub length: Option<usize>,
    /// minLength
    pub min_length: Option<usize>,
    /// maxLength
    pub max_length: Option<usize>,
    /// pattern values of this step, alternatives of one another
    pub patterns: Vec<String>,
    /// whiteSpace
    pub white_space: Option<WhiteSpace>,
    /// enumeration literals
    pub enumeration: Option<Vec<String>>,
    /// maxInclusive literal
    pub max_inclusive: Option<String>,
    /// maxExclusive literal
    pub max_exclusive: Option<String>,
    /// minInclusive literal
    pub min_inclusive: Option<String>,
    /// minExclusive literal
    pub min_exclusive: Option<String>,
    /// totalDigits
    pub total_digits: Option<usize>,
    /// fractionDigits
    pub fraction_digits: Option<usize>,
    /// maxScale
    pub max_scale: Option<i64>,
    /// minScale
    pub min_scale: Option<i64>,
    /// Facets marked `fixed="true"`
    pub fixed: FacetMask,
    /// Documentation attached to individual facets
    pub annotations: IndexMap<Facet, String>,
}

impl FacetSet {
    /// Create an empty facet set
    pub fn new() -> Self {
        Self::default()
    }

    /// Facets present in this set
    pub fn present(&self) -> FacetMask {
        let mut mask = FacetMask::EMPTY;
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
        for (set, facet) in flags {
            if set {
                mask.insert(facet);
            }
        }
        mask
    }

    /// Set the length facet
    pub fn length(mut self, value: usize) -> Self {
        self.length = Some(value);
        self
    }

    /// Set the minLength facet
    pub fn min_length(mut self, value: usize) -> Self {
        self.min_length = Some(value);
        self
    }

    /// Set the maxLength facet
    pub fn max_length(mut self, value: usize) -> Self {
        self.max_length = Some(value);
        self
    }

    /// Add a pattern
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Set the whiteSpace facet
    pub fn white_space(mut self, mode: WhiteSpace) -> Self {
        self.white_space = Some(mode);
        self
    }

    /// Set the enumeration facet
    pub fn enumeration<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumeration = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the maxInclusive facet
    pub fn max_inclusive(mut self, value: impl Into<String>) -> Self {
        self.max_inclusive = Some(value.into());
        self
    }

    /// Set the maxExclusive facet
    pub fn max_exclusive(mut self, value: impl Into<String>) -> Self {
        self.max_exclusive = Some(value.into());
        self
    }

    /// Set the minInclusive facet
    pub fn min_inclusive(mut self, value: impl Into<String>) -> Self {
        self.min_inclusive = Some(value.into());
        self
    }

    /// Set the minExclusive facet
    pub fn min_exclusive(mut self, value: impl Into<String>) -> Self {
        self.min_exclusive = Some(value.into());
        self
    }

    /// Set the totalDigits facet
    pub fn total_digits(mut self, value: usize) -> Self {
        self.total_digits = Some(value);
        self
    }

    /// Set the fractionDigits facet
    pub fn fraction_digits(mut self, value: usize) -> Self {
        self.fraction_digits = Some(value);
        self
    }

    /// Set the maxScale facet
    pub fn max_scale(mut self, value: i64) -> Self {
        self.max_scale = Some(value);
        self
    }

    /// Set the minScale facet
    pub fn min_scale(mut self, value: i64) -> Self {
        self.min_scale = Some(value);
        self
    }

    /// Mark a facet as fixed
    pub fn fixed(mut self, facet: Facet) -> Self {
        self.fixed.insert(facet);
        self
    }

    /// Attach documentation to a facet
    pub fn annotate(mut self, facet: Facet, text: impl Into<String>) -> Self {
        self.annotations.insert(facet, text.into());
        self
    }
}

// =============================================================================
// Pattern
// =============================================================================

/// The pattern facet values of one derivation step.
///
/// Values given in the same step are alternatives; a value must match the
/// pattern of every step in its derivation chain.
#[derive(Debug, Clone)]
pub struct Pattern {
    sources: Vec<String>,
    regex: Regex,
}

impl Pattern {
    /// Compile the pattern values of one step
    pub fn new(sources: Vec<String>, type_name: &str) -> Result<Self> {
        let translated: Vec<String> = sources
            .iter()
            .map(|s| translate_pattern(s))
            .collect::<Result<_>>()
            .map_err(|e| {
                FacetError::new("InvalidRegex", type_name)
                    .with_facet("pattern")
                    .with_value(sources.join("|"))
                    .with_reason(e.to_string())
            })?;
        let combined = format!("^(?:{})$", translated.join("|"));
        let regex = Regex::new(&combined).map_err(|e| {
            FacetError::new("InvalidRegex", type_name)
                .with_facet("pattern")
                .with_value(sources.join("|"))
                .with_reason(e.to_string())
        })?;

        Ok(Self { sources, regex })
    }

    /// Pattern values as written in the schema
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Check whether a normalized value matches
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Validate a normalized value against this pattern
    pub fn validate(&self, value: &str) -> Result<()> {
        if self.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::new("cvc-pattern-valid", value)
                .with_facet("pattern")
                .with_bound(self.sources.join("|"))
                .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_bits_and_names() {
        assert_eq!(Facet::Length.bit(), 1);
        assert_eq!(Facet::MinInclusive.bit(), 256);
        assert_eq!(Facet::MinScale.bit(), 8192);
        assert_eq!(Facet::from_name("fractionDigits"), Some(Facet::FractionDigits));
        assert_eq!(Facet::from_name("explicitTimezone"), None);
        for facet in Facet::ALL {
            assert_eq!(Facet::from_name(facet.name()), Some(facet));
        }
    }

    #[test]
    fn test_facet_mask() {
        let mut mask = FacetMask::of(&[Facet::Pattern, Facet::Enumeration]);
        assert!(mask.contains(Facet::Pattern));
        assert!(!mask.contains(Facet::Length));
        mask.insert(Facet::Length);
        assert_eq!(mask.bits(), 1 | 8 | 2048);
        mask.remove(Facet::Pattern);
        assert_eq!(
            mask.iter().collect::<Vec<_>>(),
            vec![Facet::Length, Facet::Enumeration]
        );
        assert_eq!(FacetMask::from_bits(0xffff).iter().count(), 14);
        assert_eq!((FacetMask::EMPTY | Facet::WhiteSpace).bits(), 16);
    }

    #[test]
    fn test_whitespace_normalize() {
        assert_eq!(WhiteSpace::Preserve.normalize(" a\tb "), " a\tb ");
        assert_eq!(WhiteSpace::Replace.normalize(" a\tb\n"), " a b ");
        assert_eq!(WhiteSpace::Collapse.normalize("  a \t\n b  c "), "a b c");
        assert_eq!(WhiteSpace::Collapse.normalize("   "), "");
        assert!(matches!(WhiteSpace::Collapse.normalize("a b"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_whitespace_order_and_parse() {
        assert!(WhiteSpace::Preserve < WhiteSpace::Replace);
        assert!(WhiteSpace::Replace < WhiteSpace::Collapse);
        assert_eq!("collapse".parse::<WhiteSpace>().unwrap(), WhiteSpace::Collapse);
        assert!("squash".parse::<WhiteSpace>().is_err());
    }

    #[test]
    fn test_facet_set_present() {
        let set = FacetSet::new()
            .max_inclusive("100")
            .pattern("[0-9]+")
            .fixed(Facet::MaxInclusive)
            .annotate(Facet::MaxInclusive, "upper bound");
        assert_eq!(
            set.present(),
            FacetMask::of(&[Facet::MaxInclusive, Facet::Pattern])
        );
        assert!(set.fixed.contains(Facet::MaxInclusive));
        assert_eq!(set.annotations.get(&Facet::MaxInclusive).unwrap(), "upper bound");
    }

    #[test]
    fn test_pattern_alternatives_are_anchored() {
        let pattern = Pattern::new(vec!["a+".to_string(), "b+".to_string()], "t").unwrap();
        assert!(pattern.is_match("aaa"));
        assert!(pattern.is_match("bb"));
        assert!(!pattern.is_match("ab"));
        assert!(!pattern.is_match("xaa"));
        assert!(pattern.validate("c").is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Pattern::new(vec!["(a".to_string()], "t").unwrap_err();
        assert_eq!(err.code(), Some("InvalidRegex"));
    }
}
