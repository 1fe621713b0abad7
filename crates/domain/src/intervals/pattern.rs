use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::DomainError;

/// Regular expression that must match the whole input, not a substring.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self, DomainError> {
        let source = source.into();
        let invalid =
            |e: regex::Error| DomainError::InvalidConfiguration(format!("Invalid pattern '{source}': {e}"));
        // The source must stand alone, otherwise `a)|(b` would escape the anchors.
        Regex::new(&source).map_err(invalid)?;
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(invalid)?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(source).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_match_only() {
        let pattern = Pattern::new("NG920-5250[6-9]").unwrap();

        assert!(pattern.matches("NG920-52507"));
        assert!(!pattern.matches("NG920-525071"));
        assert!(!pattern.matches("XNG920-52507"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let pattern = Pattern::new("abc|def").unwrap();

        assert!(pattern.matches("abc"));
        assert!(pattern.matches("def"));
        assert!(!pattern.matches("abcdef"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = Pattern::new("G3-(");
        assert!(matches!(
            result,
            Err(DomainError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unbalanced_group_cannot_escape_anchors() {
        let result = Pattern::new("a)|(b");
        assert!(matches!(
            result,
            Err(DomainError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let pattern: Pattern = serde_json::from_str(r#""1[.]2[.].*""#).unwrap();
        assert!(pattern.matches("1.2.10"));
        assert_eq!(serde_json::to_string(&pattern).unwrap(), r#""1[.]2[.].*""#);

        let invalid: Result<Pattern, _> = serde_json::from_str(r#""(""#);
        assert!(invalid.is_err());
    }
}
