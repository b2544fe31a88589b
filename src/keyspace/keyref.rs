//! `keyref` / `conkeyref` values.

use std::sync::Arc;

use serde::Serialize;

use super::KeyDefinition;

/// A parsed key reference: `key` or `key/element`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRef<'a> {
    pub key: &'a str,
    pub element_id: Option<&'a str>,
}

impl<'a> KeyRef<'a> {
    /// Split a reference at the first `/`.
    ///
    /// Returns `None` for an empty key or a key containing whitespace.
    pub fn parse(value: &'a str) -> Option<Self> {
        let value = value.trim();
        let (key, element_id) = match value.split_once('/') {
            Some((key, element)) => (key, Some(element).filter(|e| !e.is_empty())),
            None => (value, None),
        };
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self { key, element_id })
    }
}

/// A key reference resolved against a key space.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedKeyRef {
    pub definition: Arc<KeyDefinition>,
    /// Element from the reference if given, else the definition's fragment
    pub element_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_key() {
        let r = KeyRef::parse("product").unwrap();
        assert_eq!(r.key, "product");
        assert_eq!(r.element_id, None);
    }

    #[test]
    fn test_parse_key_with_element() {
        let r = KeyRef::parse("shared/warning-1").unwrap();
        assert_eq!(r.key, "shared");
        assert_eq!(r.element_id, Some("warning-1"));

        let r = KeyRef::parse("shared/").unwrap();
        assert_eq!(r.element_id, None);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(KeyRef::parse("").is_none());
        assert!(KeyRef::parse("/elem").is_none());
        assert!(KeyRef::parse("two words").is_none());
    }
}
