//! Dependency declarations.
//!
//! A Dependency is one entry of a workspace manifest's dependency tables,
//! identified by the (workspace, type, ident) triple.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::index::{FieldValue, Indexable};
use crate::core::FieldPath;

/// Which manifest table a dependency is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyType {
    Dependencies,
    DevDependencies,
    PeerDependencies,
}

impl DependencyType {
    /// All dependency types, in manifest order.
    pub const ALL: [DependencyType; 3] = [
        DependencyType::Dependencies,
        DependencyType::DevDependencies,
        DependencyType::PeerDependencies,
    ];

    /// Types that resolve to an installed package.
    pub const REGULAR: [DependencyType; 2] =
        [DependencyType::Dependencies, DependencyType::DevDependencies];

    /// The manifest key for this table.
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::Dependencies => "dependencies",
            DependencyType::DevDependencies => "devDependencies",
            DependencyType::PeerDependencies => "peerDependencies",
        }
    }

    /// Check if this is the peer dependency table.
    pub fn is_peer(&self) -> bool {
        matches!(self, DependencyType::PeerDependencies)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing a dependency type.
#[derive(Debug, Clone)]
pub struct DependencyTypeParseError(pub String);

impl fmt::Display for DependencyTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid dependency type '{}', valid values: dependencies, devDependencies, peerDependencies",
            self.0
        )
    }
}

impl std::error::Error for DependencyTypeParseError {}

impl FromStr for DependencyType {
    type Err = DependencyTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DependencyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DependencyTypeParseError(s.to_string()))
    }
}

impl From<DependencyType> for FieldValue {
    fn from(kind: DependencyType) -> Self {
        FieldValue::Str(kind.as_str().to_string())
    }
}

/// A declared dependency of a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Declaring workspace cwd
    workspace: String,

    /// Table the dependency is declared in
    kind: DependencyType,

    /// Dependency ident (package name)
    ident: String,

    /// Declared range, verbatim
    range: String,

    /// Locator of the resolved package (none for peer dependencies)
    resolution: Option<String>,
}

impl Dependency {
    /// Create a new dependency.
    pub fn new(
        workspace: impl Into<String>,
        kind: DependencyType,
        ident: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Dependency {
            workspace: workspace.into(),
            kind,
            ident: ident.into(),
            range: range.into(),
            resolution: None,
        }
    }

    /// Set the resolved package locator.
    pub fn with_resolution(mut self, locator: Option<String>) -> Self {
        self.resolution = locator;
        self
    }

    /// Get the declaring workspace cwd.
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Get the dependency type.
    pub fn kind(&self) -> DependencyType {
        self.kind
    }

    /// Get the ident.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Get the declared range.
    pub fn range(&self) -> &str {
        &self.range
    }

    /// Get the resolved package locator.
    pub fn resolution(&self) -> Option<&str> {
        self.resolution.as_deref()
    }

    /// The manifest path holding this dependency's range.
    pub fn field_path(&self) -> FieldPath {
        FieldPath::from([self.kind.as_str(), self.ident.as_str()])
    }
}

impl Indexable for Dependency {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "workspace" => Some(self.workspace.as_str().into()),
            "type" => Some(self.kind.into()),
            "ident" => Some(self.ident.as_str().into()),
            "range" => Some(self.range.as_str().into()),
            "resolution" => Some(self.resolution.as_deref().into()),
            _ => None,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.ident, self.range, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_type_round_trips_through_str() {
        for kind in DependencyType::ALL {
            assert_eq!(kind.as_str().parse::<DependencyType>().unwrap(), kind);
        }
        assert!("optionalDependencies".parse::<DependencyType>().is_err());
    }

    #[test]
    fn test_dependency_type_serde_uses_manifest_keys() {
        let json = serde_json::to_string(&DependencyType::DevDependencies).unwrap();
        assert_eq!(json, "\"devDependencies\"");
    }

    #[test]
    fn test_field_path() {
        let dep = Dependency::new(".", DependencyType::DevDependencies, "typescript", "^5.0.0");
        assert_eq!(dep.field_path(), FieldPath::from(["devDependencies", "typescript"]));
    }

    #[test]
    fn test_indexed_fields() {
        let peer = Dependency::new("pkg-a", DependencyType::PeerDependencies, "react", "*");
        assert_eq!(peer.field("type"), Some(FieldValue::from("peerDependencies")));
        assert_eq!(peer.field("resolution"), Some(FieldValue::Null));
        assert_eq!(peer.field("version"), None);

        let dep = Dependency::new("pkg-a", DependencyType::Dependencies, "foo", "^1.0.0")
            .with_resolution(Some("foo@npm:1.0.0".to_string()));
        assert_eq!(dep.field("resolution"), Some(FieldValue::from("foo@npm:1.0.0")));
    }
}
