//! Test utilities for Quay unit tests.
//!
//! [`SnapshotBuilder`] assembles a snapshot and its manifests in memory and
//! hydrates them into a [`Project`]; [`ProjectFixture`] writes the same kind
//! of layout to disk for the code paths that read files.
//!
//! # Example
//!
//! ```rust,ignore
//! use quay::test_support::SnapshotBuilder;
//!
//! let project = SnapshotBuilder::new()
//!     .workspace(".", "root", json!({ "private": true }))
//!     .workspace("packages/a", "a", json!({ "name": "a" }))
//!     .build();
//! ```

pub mod fixtures;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::snapshot::{DependencyEntry, PackageEntry, WorkspaceEntry};
use crate::core::{DependencyType, MemoryManifestLoader, Project, Snapshot};

pub use fixtures::*;

/// Locator given to the package a workspace owns.
pub fn workspace_locator(ident: &str, cwd: &str) -> String {
    format!("{}@workspace:{}", ident, cwd)
}

/// Builds snapshots (and their manifests) for tests.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
    manifests: BTreeMap<String, Value>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a workspace, its manifest, and the package it owns.
    pub fn workspace(mut self, cwd: &str, ident: &str, manifest: Value) -> Self {
        self.snapshot.workspaces.push(WorkspaceEntry {
            cwd: cwd.into(),
            ident: ident.into(),
            dependencies: Vec::new(),
            peer_dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
        });
        self.snapshot.packages.push(PackageEntry {
            locator: workspace_locator(ident, cwd),
            workspace: Some(cwd.into()),
            ident: ident.into(),
            version: manifest
                .get("version")
                .and_then(Value::as_str)
                .map(String::from),
            dependencies: Vec::new(),
            peer_dependencies: Vec::new(),
            optional_peer_dependencies: Vec::new(),
        });
        self.manifests.insert(cwd.into(), manifest);
        self
    }

    /// Add a package that no workspace owns.
    pub fn external_package(mut self, locator: &str, ident: &str, version: &str) -> Self {
        self.snapshot.packages.push(PackageEntry {
            locator: locator.into(),
            workspace: None,
            ident: ident.into(),
            version: Some(version.into()),
            dependencies: Vec::new(),
            peer_dependencies: Vec::new(),
            optional_peer_dependencies: Vec::new(),
        });
        self
    }

    /// Declare a dependency of workspace `cwd`.
    ///
    /// A resolved non-peer dependency is also added to the workspace
    /// package's resolved dependencies.
    ///
    /// # Panics
    ///
    /// If `cwd` was not added first.
    pub fn dependency(
        mut self,
        cwd: &str,
        kind: DependencyType,
        ident: &str,
        range: &str,
        resolution: Option<&str>,
    ) -> Self {
        let entry = DependencyEntry {
            ident: ident.into(),
            range: range.into(),
            dependency_type: kind,
            resolution: resolution.map(String::from),
        };

        let workspace = self
            .snapshot
            .workspaces
            .iter_mut()
            .find(|ws| ws.cwd == cwd)
            .unwrap_or_else(|| panic!("unknown workspace `{}`", cwd));
        let ws_ident = workspace.ident.clone();
        match kind {
            DependencyType::Dependencies => workspace.dependencies.push(entry),
            DependencyType::DevDependencies => workspace.dev_dependencies.push(entry),
            DependencyType::PeerDependencies => workspace.peer_dependencies.push(entry),
        }

        if let (Some(locator), false) = (resolution, kind.is_peer()) {
            let own = workspace_locator(&ws_ident, cwd);
            if let Some(package) = self.snapshot.packages.iter_mut().find(|p| p.locator == own) {
                package.dependencies.push((ident.into(), locator.into()));
            }
        }

        self
    }

    /// Get the snapshot built so far.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    /// Get the manifest added for a workspace.
    pub fn manifest(&self, cwd: &str) -> Option<&Value> {
        self.manifests.get(cwd)
    }

    /// Get an in-memory loader serving the manifests added so far.
    pub fn loader(&self) -> MemoryManifestLoader {
        let mut loader = MemoryManifestLoader::new();
        for (cwd, manifest) in &self.manifests {
            loader.insert(cwd.clone(), manifest.clone());
        }
        loader
    }

    /// Hydrate into a project.
    ///
    /// # Panics
    ///
    /// If the snapshot is inconsistent.
    pub fn build(self) -> Project {
        let loader = self.loader();
        Project::hydrate(self.snapshot, &loader).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_registers_workspace_packages() {
        let builder = SnapshotBuilder::new()
            .workspace(".", "root", json!({ "version": "0.0.0" }))
            .dependency(".", DependencyType::DevDependencies, "jest", "^29", Some("jest@npm:29.0.0"))
            .dependency(".", DependencyType::PeerDependencies, "react", "*", Some("react@npm:18.0.0"));

        let snapshot = builder.snapshot();
        assert_eq!(snapshot.workspaces[0].dev_dependencies.len(), 1);
        assert_eq!(snapshot.workspaces[0].peer_dependencies.len(), 1);
        assert_eq!(snapshot.packages[0].locator, "root@workspace:.");
        assert_eq!(snapshot.packages[0].version.as_deref(), Some("0.0.0"));
        assert_eq!(
            snapshot.packages[0].dependencies,
            [("jest".to_string(), "jest@npm:29.0.0".to_string())]
        );
    }
}
