//! Workspace - one member of the repository.
//!
//! A Workspace is identified by its cwd (relative to the project root) and
//! carries the manifest as it was on disk when the snapshot was hydrated.

use std::fmt;

use serde_json::Value;

use crate::core::index::{FieldValue, Indexable};
use crate::core::{FieldPath, Manifest};

/// A workspace of the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    /// Workspace directory, unique within the project
    cwd: String,

    /// Package ident declared by the workspace
    ident: String,

    /// Manifest as read during hydration
    manifest: Manifest,

    /// Locator of the package this workspace owns
    package: String,
}

impl Workspace {
    /// Create a new workspace.
    pub fn new(
        cwd: impl Into<String>,
        ident: impl Into<String>,
        manifest: Manifest,
        package: impl Into<String>,
    ) -> Self {
        Workspace {
            cwd: cwd.into(),
            ident: ident.into(),
            manifest,
            package: package.into(),
        }
    }

    /// Get the workspace cwd.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Get the ident.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Get the manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Read a manifest field.
    pub fn get(&self, path: impl Into<FieldPath>) -> Option<&Value> {
        self.manifest.get(&path.into())
    }

    /// Get the locator of the owned package.
    pub fn package_locator(&self) -> &str {
        &self.package
    }

    /// Check if this is the project root workspace.
    pub fn is_root(&self) -> bool {
        self.cwd == "." || self.cwd.is_empty()
    }
}

impl Indexable for Workspace {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "cwd" => Some(self.cwd.as_str().into()),
            "ident" => Some(self.ident.as_str().into()),
            _ => None,
        }
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ident, self.cwd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workspace_accessors() {
        let ws = Workspace::new(
            "packages/pkg-a",
            "pkg-a",
            Manifest::from_value(json!({ "name": "pkg-a", "scripts": { "build": "tsc" } })),
            "pkg-a@workspace:packages/pkg-a",
        );

        assert_eq!(ws.get("scripts.build"), Some(&json!("tsc")));
        assert_eq!(ws.get("license"), None);
        assert!(!ws.is_root());
        assert_eq!(ws.field("cwd"), Some(FieldValue::from("packages/pkg-a")));
        assert_eq!(ws.field("manifest"), None);
    }
}
