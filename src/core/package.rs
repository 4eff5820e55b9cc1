//! Package - a resolved package from the install graph.
//!
//! Every workspace owns exactly one package; packages fetched from a
//! registry (or anywhere else) have no owning workspace.

use std::fmt;

use crate::core::index::{FieldValue, Indexable};

/// A package in the resolved dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Unique locator (e.g. `react@npm:18.2.0`)
    locator: String,

    /// Package ident
    ident: String,

    /// Owning workspace cwd, for workspace packages
    workspace: Option<String>,

    /// Resolved version
    version: Option<String>,

    /// Dependency ident -> resolved package locator
    dependencies: Vec<(String, String)>,

    /// Peer dependency ident -> declared range
    peer_dependencies: Vec<(String, String)>,

    /// Optional peer dependency ident -> declared range
    optional_peer_dependencies: Vec<(String, String)>,
}

impl Package {
    /// Create a new package.
    pub fn new(locator: impl Into<String>, ident: impl Into<String>) -> Self {
        Package {
            locator: locator.into(),
            ident: ident.into(),
            workspace: None,
            version: None,
            dependencies: Vec::new(),
            peer_dependencies: Vec::new(),
            optional_peer_dependencies: Vec::new(),
        }
    }

    /// Set the owning workspace.
    pub fn with_workspace(mut self, cwd: Option<String>) -> Self {
        self.workspace = cwd;
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Set the resolved dependencies.
    pub fn with_dependencies(mut self, dependencies: Vec<(String, String)>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Set the peer dependency ranges.
    pub fn with_peer_dependencies(
        mut self,
        peers: Vec<(String, String)>,
        optional_peers: Vec<(String, String)>,
    ) -> Self {
        self.peer_dependencies = peers;
        self.optional_peer_dependencies = optional_peers;
        self
    }

    /// Get the locator.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Get the ident.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Get the owning workspace cwd.
    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    /// Get the version.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Iterate over (ident, locator) pairs of resolved dependencies.
    pub fn dependencies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dependencies
            .iter()
            .map(|(ident, locator)| (ident.as_str(), locator.as_str()))
    }

    /// Get the resolved locator of a dependency.
    pub fn dependency(&self, ident: &str) -> Option<&str> {
        self.dependencies()
            .find(|(i, _)| *i == ident)
            .map(|(_, locator)| locator)
    }

    /// Get the declared peer range for an ident.
    pub fn peer_dependency(&self, ident: &str) -> Option<&str> {
        lookup(&self.peer_dependencies, ident)
    }

    /// Get the declared optional peer range for an ident.
    pub fn optional_peer_dependency(&self, ident: &str) -> Option<&str> {
        lookup(&self.optional_peer_dependencies, ident)
    }

    /// Iterate over (ident, range) peer dependencies.
    pub fn peer_dependencies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.peer_dependencies
            .iter()
            .map(|(i, r)| (i.as_str(), r.as_str()))
    }

    /// Iterate over (ident, range) optional peer dependencies.
    pub fn optional_peer_dependencies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.optional_peer_dependencies
            .iter()
            .map(|(i, r)| (i.as_str(), r.as_str()))
    }
}

fn lookup<'a>(entries: &'a [(String, String)], ident: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|(i, _)| i == ident)
        .map(|(_, range)| range.as_str())
}

impl Indexable for Package {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "locator" => Some(self.locator.as_str().into()),
            "ident" => Some(self.ident.as_str().into()),
            "workspace" => Some(self.workspace.as_deref().into()),
            "version" => Some(self.version.as_deref().into()),
            _ => None,
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_package_has_null_workspace() {
        let pkg = Package::new("foo@npm:1.0.0", "foo").with_version(Some("1.0.0".into()));
        assert_eq!(pkg.field("workspace"), Some(FieldValue::Null));
        assert_eq!(pkg.field("version"), Some(FieldValue::from("1.0.0")));
        assert!(pkg.workspace().is_none());
    }

    #[test]
    fn test_dependency_lookups() {
        let pkg = Package::new("app@workspace:.", "app")
            .with_workspace(Some(".".into()))
            .with_dependencies(vec![("foo".into(), "foo@npm:1.0.0".into())])
            .with_peer_dependencies(
                vec![("react".into(), "^18".into())],
                vec![("react-dom".into(), "^18".into())],
            );

        assert_eq!(pkg.dependency("foo"), Some("foo@npm:1.0.0"));
        assert_eq!(pkg.dependency("bar"), None);
        assert_eq!(pkg.peer_dependency("react"), Some("^18"));
        assert_eq!(pkg.optional_peer_dependency("react-dom"), Some("^18"));
        assert_eq!(pkg.optional_peer_dependency("react"), None);
    }
}
