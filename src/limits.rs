//! Limits for datatype processing
//!
//! Bounds the work a single parse, validation or derivation may perform so
//! that hostile literals and schemas cannot exhaust resources.

use crate::error::{Error, Result};

/// Processing limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum length of a lexical value in characters
    pub max_value_length: usize,

    /// Maximum number of items in a list value
    pub max_list_items: usize,

    /// Maximum number of enumeration values on one type
    pub max_enumeration_values: usize,

    /// Maximum length of a single pattern facet
    pub max_pattern_length: usize,

    /// Maximum depth of a restriction chain
    pub max_derivation_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_value_length: 1024 * 1024,
            max_list_items: 100_000,
            max_enumeration_values: 10_000,
            max_pattern_length: 10_000,
            max_derivation_depth: 256,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_value_length: 64 * 1024,
            max_list_items: 1_000,
            max_enumeration_values: 1_000,
            max_pattern_length: 1_000,
            max_derivation_depth: 32,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_value_length: 64 * 1024 * 1024,
            max_list_items: 10_000_000,
            max_enumeration_values: 1_000_000,
            max_pattern_length: 1_000_000,
            max_derivation_depth: 4096,
        }
    }

    /// Check if a lexical value is within limits
    pub fn check_value_length(&self, value: &str) -> Result<()> {
        // Byte length bounds the char count, so only count when it might matter.
        if value.len() > self.max_value_length && value.chars().count() > self.max_value_length {
            Err(Error::LimitExceeded(format!(
                "Value length {} exceeds maximum {}",
                value.chars().count(),
                self.max_value_length
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of list items is within limits
    pub fn check_list_items(&self, count: usize) -> Result<()> {
        if count > self.max_list_items {
            Err(Error::LimitExceeded(format!(
                "List item count {} exceeds maximum {}",
                count, self.max_list_items
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of enumeration values is within limits
    pub fn check_enumeration_values(&self, count: usize) -> Result<()> {
        if count > self.max_enumeration_values {
            Err(Error::LimitExceeded(format!(
                "Enumeration value count {} exceeds maximum {}",
                count, self.max_enumeration_values
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a pattern is within limits
    pub fn check_pattern_length(&self, pattern: &str) -> Result<()> {
        if pattern.len() > self.max_pattern_length {
            Err(Error::LimitExceeded(format!(
                "Pattern length {} exceeds maximum {}",
                pattern.len(),
                self.max_pattern_length
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a restriction chain depth is within limits
    pub fn check_derivation_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_derivation_depth {
            Err(Error::LimitExceeded(format!(
                "Derivation depth {} exceeds maximum {}",
                depth, self.max_derivation_depth
            )))
        } else {
            Ok(())
        }
    }
}
