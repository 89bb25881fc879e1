//! Validator helper functions
//!
//! Lexical helpers shared by the primitive datatypes, and the translation
//! of XSD regular expressions into the `regex` crate syntax.

use crate::error::{DatatypeError, Error, Result};
use crate::names::{NAME_CHAR_EXTRA_CLASS, NCNAME_START_CLASS};
use base64::Engine;
use std::collections::HashMap;

lazy_static::lazy_static! {
    /// XSD boolean value mapping
    pub static ref XSD_BOOLEAN_MAP: HashMap<&'static str, bool> = {
        let mut m = HashMap::new();
        m.insert("false", false);
        m.insert("0", false);
        m.insert("true", true);
        m.insert("1", true);
        m
    };

    static ref HEX_BINARY_REGEX: regex::Regex =
        regex::Regex::new(r"^([0-9a-fA-F]{2})*$").expect("static hexBinary pattern");

    // Groups of four base64 characters, optionally separated by single spaces,
    // where only the last group may carry padding.
    static ref BASE64_BINARY_REGEX: regex::Regex = regex::Regex::new(
        r"^(([A-Za-z0-9+/] ?){4})*(([A-Za-z0-9+/] ?){3}[A-Za-z0-9+/]|([A-Za-z0-9+/] ?){2}[AEIMQUYcgkosw048] ?=|[A-Za-z0-9+/] ?[AQgw] ?= ?=)?$"
    )
    .expect("static base64Binary pattern");
}

// =============================================================================
// Boolean
// =============================================================================

/// Convert an XSD boolean literal to a Rust bool
pub fn parse_boolean(value: &str) -> Result<bool> {
    XSD_BOOLEAN_MAP
        .get(value)
        .copied()
        .ok_or_else(|| DatatypeError::invalid(value, "boolean").into())
}

/// Canonical XSD boolean literal
pub fn boolean_to_string(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

// =============================================================================
// Binary
// =============================================================================

/// Decode a hexBinary literal
pub fn decode_hex_binary(value: &str) -> Result<Vec<u8>> {
    if !HEX_BINARY_REGEX.is_match(value) {
        return Err(DatatypeError::invalid(value, "hexBinary")
            .with_reason("not a valid hexadecimal encoding")
            .into());
    }

    (0..value.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&value[i..i + 2], 16)
                .map_err(|_| Error::from(DatatypeError::invalid(value, "hexBinary")))
        })
        .collect()
}

/// Canonical hexBinary literal (upper case)
pub fn encode_hex_binary(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Decode a base64Binary literal
pub fn decode_base64_binary(value: &str) -> Result<Vec<u8>> {
    if !BASE64_BINARY_REGEX.is_match(value) || value.ends_with(' ') {
        return Err(DatatypeError::invalid(value, "base64Binary")
            .with_reason("not a valid base64 encoding")
            .into());
    }

    let cleaned = value.replace(' ', "");
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    base64::engine::general_purpose::STANDARD
        .decode(&cleaned)
        .map_err(|e| {
            Error::from(DatatypeError::invalid(value, "base64Binary").with_reason(e.to_string()))
        })
}

/// Canonical base64Binary literal
pub fn encode_base64_binary(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

// =============================================================================
// Regular expressions
// =============================================================================

const XSD_SPACE_CLASS: &str = r" \t\n\r";
const XSD_NOT_WORD_CLASS: &str = r"\p{P}\p{Z}\p{C}";

/// Translate an XSD regular expression into `regex` syntax.
///
/// The result is not anchored; XSD patterns always match the whole value,
/// so callers wrap it in `^(?:...)$`.
pub fn translate_pattern(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut chars = pattern.chars().peekable();
    let mut class_depth = 0usize;

    while let Some(c) = chars.next() {
        if class_depth == 0 {
            match c {
                '\\' => {
                    let escaped = chars.next().ok_or_else(|| dangling_escape(pattern))?;
                    push_escape(&mut out, escaped, false, &mut chars)?;
                }
                '.' => out.push_str(r"[^\n\r]"),
                '^' => out.push_str(r"\^"),
                '$' => out.push_str(r"\$"),
                '[' => {
                    class_depth += 1;
                    out.push('[');
                    if chars.peek() == Some(&'^') {
                        chars.next();
                        out.push('^');
                    }
                }
                _ => out.push(c),
            }
        } else {
            match c {
                '\\' => {
                    let escaped = chars.next().ok_or_else(|| dangling_escape(pattern))?;
                    push_escape(&mut out, escaped, true, &mut chars)?;
                }
                '-' if chars.peek() == Some(&'[') => {
                    chars.next();
                    class_depth += 1;
                    out.push_str("--[");
                    if chars.peek() == Some(&'^') {
                        chars.next();
                        out.push('^');
                    }
                }
                '[' => out.push_str(r"\["),
                ']' => {
                    class_depth -= 1;
                    out.push(']');
                }
                '&' | '~' => {
                    out.push('\\');
                    out.push(c);
                }
                _ => out.push(c),
            }
        }
    }

    if class_depth != 0 {
        return Err(Error::Value(format!(
            "unterminated character class in pattern '{}'",
            pattern
        )));
    }

    Ok(out)
}

fn dangling_escape(pattern: &str) -> Error {
    Error::Value(format!("dangling escape in pattern '{}'", pattern))
}

fn push_escape(
    out: &mut String,
    escaped: char,
    in_class: bool,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<()> {
    // Positive classes are spliced into an enclosing class; negated ones
    // become nested classes, which `regex` unions with their surroundings.
    let (body, negated): (String, bool) = match escaped {
        'i' => (format!(":{}", NCNAME_START_CLASS), false),
        'I' => (format!(":{}", NCNAME_START_CLASS), true),
        'c' => (
            format!(":{}{}", NCNAME_START_CLASS, NAME_CHAR_EXTRA_CLASS),
            false,
        ),
        'C' => (
            format!(":{}{}", NCNAME_START_CLASS, NAME_CHAR_EXTRA_CLASS),
            true,
        ),
        's' => (XSD_SPACE_CLASS.to_string(), false),
        'S' => (XSD_SPACE_CLASS.to_string(), true),
        'w' => (XSD_NOT_WORD_CLASS.to_string(), true),
        'W' => (XSD_NOT_WORD_CLASS.to_string(), false),
        'd' | 'D' => {
            out.push('\\');
            out.push(escaped);
            return Ok(());
        }
        'p' | 'P' => {
            out.push('\\');
            out.push(escaped);
            let mut closed = false;
            for c in chars.by_ref() {
                out.push(c);
                if c == '}' {
                    closed = true;
                    break;
                }
            }
            if !closed {
                return Err(Error::Value(
                    "unterminated category escape in pattern".to_string(),
                ));
            }
            return Ok(());
        }
        'n' | 'r' | 't' | '\\' | '|' | '.' | '-' | '^' | '?' | '*' | '+' | '{' | '}' | '('
        | ')' | '[' | ']' => {
            out.push('\\');
            out.push(escaped);
            return Ok(());
        }
        other => {
            return Err(Error::Value(format!(
                "unknown escape '\\{}' in pattern",
                other
            )))
        }
    };

    match (in_class, negated) {
        (true, false) => out.push_str(&body),
        (_, true) => {
            out.push_str("[^");
            out.push_str(&body);
            out.push(']');
        }
        (false, false) => {
            out.push('[');
            out.push_str(&body);
            out.push(']');
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn full_match(pattern: &str, value: &str) -> bool {
        let translated = translate_pattern(pattern).unwrap();
        Regex::new(&format!("^(?:{})$", translated))
            .unwrap()
            .is_match(value)
    }

    #[test]
    fn test_boolean() {
        assert!(parse_boolean("true").unwrap());
        assert!(!parse_boolean("0").unwrap());
        assert!(parse_boolean("TRUE").is_err());
        assert_eq!(boolean_to_string(true), "true");
    }

    #[test]
    fn test_hex_binary() {
        assert_eq!(decode_hex_binary("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_hex_binary("0a1B").unwrap(), vec![0x0a, 0x1b]);
        assert!(decode_hex_binary("0").is_err());
        assert!(decode_hex_binary("GH").is_err());
        assert_eq!(encode_hex_binary(&[0x0a, 0xff]), "0AFF");
    }

    #[test]
    fn test_base64_binary() {
        assert_eq!(decode_base64_binary("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_base64_binary("SGVsbG8=").unwrap(), b"Hello".to_vec());
        assert_eq!(decode_base64_binary("SGVs bG8=").unwrap(), b"Hello".to_vec());
        assert!(decode_base64_binary("SGVsbG8").is_err());
        assert!(decode_base64_binary("SGVsbG8=SGVs").is_err());
        assert!(decode_base64_binary("!!!!").is_err());
        assert_eq!(encode_base64_binary(b"Hello"), "SGVsbG8=");
    }

    #[test]
    fn test_translate_simple_patterns() {
        assert!(full_match("[0-9]+", "123"));
        assert!(!full_match("[0-9]+", "12a"));
        assert!(full_match("a|b", "b"));
        assert!(full_match("\\d{3}-\\d{4}", "555-1234"));
    }

    #[test]
    fn test_translate_anchors_are_literal() {
        assert!(full_match("^a$", "^a$"));
        assert!(!full_match("^a$", "a"));
    }

    #[test]
    fn test_translate_dot_excludes_newlines() {
        assert!(full_match("a.c", "abc"));
        assert!(!full_match("a.c", "a\nc"));
    }

    #[test]
    fn test_translate_name_classes() {
        assert!(full_match("\\i\\c*", "xs:element"));
        assert!(!full_match("\\i\\c*", "1abc"));
        assert!(full_match("[\\i-[:]][\\c-[:]]*", "element"));
        assert!(!full_match("[\\i-[:]][\\c-[:]]*", "xs:element"));
        assert!(full_match("\\I", "1"));
    }

    #[test]
    fn test_translate_space_and_word() {
        assert!(full_match("a\\sb", "a b"));
        assert!(!full_match("a\\Sb", "a b"));
        assert!(full_match("\\w+", "abc1"));
        assert!(!full_match("\\w+", "a,b"));
        assert!(full_match("\\W", ","));
    }

    #[test]
    fn test_translate_subtraction() {
        assert!(full_match("[a-z-[aeiou]]+", "bcd"));
        assert!(!full_match("[a-z-[aeiou]]+", "bad"));
    }

    #[test]
    fn test_translate_escapes_set_operators() {
        assert!(full_match("[a&&b]+", "a&b"));
        assert!(full_match("[~]", "~"));
    }

    #[test]
    fn test_translate_errors() {
        assert!(translate_pattern("[abc").is_err());
        assert!(translate_pattern("abc\\").is_err());
        assert!(translate_pattern("\\q").is_err());
    }
}
