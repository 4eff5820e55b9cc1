//! Manifest field paths.
//!
//! A FieldPath is the ordered list of keys leading to a value inside a
//! manifest document, e.g. `["dependencies", "react"]`. Rules may spell a
//! path either as a dotted string (`"publishConfig.access"`) or as an
//! already-split list of keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered list of manifest keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Create a path from already-split keys.
    pub fn new(segments: Vec<String>) -> Self {
        FieldPath(segments)
    }

    /// Parse a dotted path such as `scripts.build`.
    pub fn parse(dotted: &str) -> Self {
        FieldPath(dotted.split('.').map(str::to_string).collect())
    }

    /// Get the individual keys.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of keys in the path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the path has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a key, returning the extended path.
    pub fn join(mut self, key: impl Into<String>) -> Self {
        self.0.push(key.into());
        self
    }

    /// Read the value at this path inside a JSON document.
    ///
    /// Objects are traversed by key and arrays by numeric index. Any
    /// missing key or scalar in the middle of the path yields `None`.
    pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.0 {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        FieldPath::parse(dotted)
    }
}

impl From<String> for FieldPath {
    fn from(dotted: String) -> Self {
        FieldPath::parse(&dotted)
    }
}

impl From<Vec<String>> for FieldPath {
    fn from(segments: Vec<String>) -> Self {
        FieldPath(segments)
    }
}

impl From<&[&str]> for FieldPath {
    fn from(segments: &[&str]) -> Self {
        FieldPath(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldPath {
    fn from(segments: [&str; N]) -> Self {
        FieldPath(segments.iter().map(|s| s.to_string()).collect())
    }
}
