//! XML namespace handling
//!
//! Qualified names, the namespace bindings used to resolve prefixed QName
//! and NOTATION literals, and the value those literals parse into.

use crate::error::{Result, ValidationError};
use std::collections::HashMap;
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// The namespace permanently bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// A parsed QName or NOTATION value.
///
/// Two values are equal when their expanded names are equal. A prefixed
/// name read without namespace bindings has no namespace, so its prefix
/// takes part in equality instead.
#[derive(Debug, Clone)]
pub struct QNameValue {
    /// Prefix as written in the literal
    pub prefix: Option<Prefix>,
    /// Expanded name
    pub name: QName,
}

impl QNameValue {
    /// Lexical form, `prefix:local` or `local`
    pub fn lexical(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.name.local_name),
            None => self.name.local_name.clone(),
        }
    }
}

impl QNameValue {
    fn unresolved_prefix(&self) -> Option<&str> {
        match self.name.namespace {
            None => self.prefix.as_deref(),
            Some(_) => None,
        }
    }
}

impl PartialEq for QNameValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.unresolved_prefix() == other.unresolved_prefix()
    }
}

impl Eq for QNameValue {}

impl std::hash::Hash for QNameValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.unresolved_prefix().hash(state);
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new namespace context with only the `xml` binding
    pub fn new() -> Self {
        let mut prefixes = HashMap::new();
        prefixes.insert("xml".to_string(), XML_NAMESPACE.to_string());
        Self {
            prefixes,
            default_namespace: None,
        }
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Builder-style variant of [`NamespaceContext::add_prefix`]
    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.add_prefix(prefix, namespace);
        self
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Resolve a QName literal (already checked to be lexically valid)
    pub fn resolve(&self, literal: &str) -> Result<QNameValue> {
        match literal.split_once(':') {
            Some((prefix, local)) => {
                let namespace = self.get_namespace(prefix).ok_or_else(|| {
                    ValidationError::new("UndeclaredPrefix", literal)
                        .with_reason(format!("prefix '{}' is not bound", prefix))
                })?;
                Ok(QNameValue {
                    prefix: Some(prefix.to_string()),
                    name: QName::namespaced(namespace, local),
                })
            }
            None => Ok(QNameValue {
                prefix: None,
                name: QName::new(self.default_namespace.clone(), literal),
            }),
        }
    }
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}
