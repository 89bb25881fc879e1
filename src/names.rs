//! XML name validation and utilities
//!
//! Name, NCName, NMTOKEN and QName checks following the XML 1.0 (fifth
//! edition) `NameStartChar` and `NameChar` productions.

use crate::error::{DatatypeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Body of a regex character class matching `NameStartChar` minus `:`
pub const NCNAME_START_CLASS: &str = r"A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\u{10000}-\u{EFFFF}";

/// Characters `NameChar` adds to `NameStartChar`
pub const NAME_CHAR_EXTRA_CLASS: &str = r"\-\.0-9\u{B7}\u{300}-\u{36F}\u{203F}-\u{2040}";

static NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "^[:{s}][:{s}{e}]*$",
        s = NCNAME_START_CLASS,
        e = NAME_CHAR_EXTRA_CLASS
    ))
    .expect("static Name pattern")
});

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "^[{s}][{s}{e}]*$",
        s = NCNAME_START_CLASS,
        e = NAME_CHAR_EXTRA_CLASS
    ))
    .expect("static NCName pattern")
});

static NMTOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "^[:{s}{e}]+$",
        s = NCNAME_START_CLASS,
        e = NAME_CHAR_EXTRA_CLASS
    ))
    .expect("static NMTOKEN pattern")
});

/// Check if a character matches `NameStartChar`
pub fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

/// Check if a character matches `NameChar`
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Check if a string is a valid XML Name
pub fn is_valid_name(name: &str) -> bool {
    NAME.is_match(name)
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Check if a string is a valid NMTOKEN
pub fn is_valid_nmtoken(name: &str) -> bool {
    NMTOKEN.is_match(name)
}

/// Check if a string is a valid QName (qualified name)
pub fn is_valid_qname(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_valid_ncname(prefix) && is_valid_ncname(local),
        None => is_valid_ncname(name),
    }
}

/// Validate a QName literal for the named type
pub fn validate_qname(name: &str, type_name: &str) -> Result<()> {
    if is_valid_qname(name) {
        Ok(())
    } else {
        Err(DatatypeError::invalid(name, type_name)
            .with_reason("not a valid QName")
            .into())
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}
