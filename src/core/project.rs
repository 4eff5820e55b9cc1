//! Project - the hydrated, queryable view of a snapshot.
//!
//! Hydration turns the flat snapshot into Workspace, Package and Dependency
//! entities, checks every cross reference, and inserts the entities into
//! one index per kind.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::core::error::HydrateError;
use crate::core::index::{Filter, Index};
use crate::core::snapshot::Snapshot;
use crate::core::{Dependency, ManifestLoader, Package, Workspace};

/// Fields the workspace index is keyed on.
pub const WORKSPACE_INDEX_FIELDS: &[&str] = &["cwd", "ident"];

/// Fields the dependency index is keyed on.
pub const DEPENDENCY_INDEX_FIELDS: &[&str] = &["workspace", "type", "ident"];

/// Fields the package index is keyed on.
pub const PACKAGE_INDEX_FIELDS: &[&str] = &["locator", "workspace", "ident"];

/// All entities of one snapshot.
#[derive(Debug, Clone)]
pub struct Project {
    workspaces: Index<Workspace>,
    packages: Index<Package>,
    dependencies: Index<Dependency>,
}

impl Project {
    /// Hydrate a snapshot, reading each workspace manifest through `loader`.
    pub fn hydrate(snapshot: Snapshot, loader: &dyn ManifestLoader) -> Result<Self, HydrateError> {
        let mut cwds = HashSet::new();
        for ws in &snapshot.workspaces {
            if !cwds.insert(ws.cwd.as_str()) {
                return Err(HydrateError::DuplicateWorkspace {
                    cwd: ws.cwd.clone(),
                });
            }
        }

        let mut locators = HashSet::new();
        let mut owned_by: HashMap<&str, &str> = HashMap::new();
        for pkg in &snapshot.packages {
            if !locators.insert(pkg.locator.as_str()) {
                return Err(HydrateError::DuplicatePackage {
                    locator: pkg.locator.clone(),
                });
            }
            if let Some(cwd) = pkg.workspace.as_deref() {
                if !cwds.contains(cwd) {
                    return Err(HydrateError::UnknownWorkspace {
                        cwd: cwd.to_string(),
                        referenced_by: format!("package `{}`", pkg.locator),
                    });
                }
                if let Some(first) = owned_by.insert(cwd, pkg.locator.as_str()) {
                    return Err(HydrateError::DuplicateWorkspacePackage {
                        cwd: cwd.to_string(),
                        locators: vec![first.to_string(), pkg.locator.clone()],
                    });
                }
            }
        }

        let mut packages = Index::new(PACKAGE_INDEX_FIELDS);
        for pkg in &snapshot.packages {
            for (ident, locator) in &pkg.dependencies {
                if !locators.contains(locator.as_str()) {
                    return Err(HydrateError::UnknownPackage {
                        locator: locator.clone(),
                        referenced_by: format!("dependency `{}` of package `{}`", ident, pkg.locator),
                    });
                }
            }

            packages.insert(
                Package::new(&pkg.locator, &pkg.ident)
                    .with_workspace(pkg.workspace.clone())
                    .with_version(pkg.version.clone())
                    .with_dependencies(pkg.dependencies.clone())
                    .with_peer_dependencies(
                        pkg.peer_dependencies.clone(),
                        pkg.optional_peer_dependencies.clone(),
                    ),
            );
        }

        let mut workspaces = Index::new(WORKSPACE_INDEX_FIELDS);
        let mut dependencies = Index::new(DEPENDENCY_INDEX_FIELDS);
        let mut seen = HashSet::new();

        for ws in &snapshot.workspaces {
            let package = owned_by
                .get(ws.cwd.as_str())
                .ok_or_else(|| HydrateError::MissingWorkspacePackage {
                    cwd: ws.cwd.clone(),
                })?;

            let manifest = loader.load(&ws.cwd)?;
            workspaces.insert(Workspace::new(&ws.cwd, &ws.ident, manifest, *package));

            for dep in ws.all_dependencies() {
                if let Some(locator) = dep.resolution.as_deref() {
                    if !locators.contains(locator) {
                        return Err(HydrateError::UnknownPackage {
                            locator: locator.to_string(),
                            referenced_by: format!(
                                "{} entry `{}` of workspace `{}`",
                                dep.dependency_type, dep.ident, ws.cwd
                            ),
                        });
                    }
                }

                if !seen.insert((ws.cwd.as_str(), dep.dependency_type, dep.ident.as_str())) {
                    return Err(HydrateError::DuplicateDependency {
                        workspace: ws.cwd.clone(),
                        kind: dep.dependency_type,
                        ident: dep.ident.clone(),
                    });
                }

                dependencies.insert(
                    Dependency::new(&ws.cwd, dep.dependency_type, &dep.ident, &dep.range)
                        .with_resolution(dep.resolution.clone()),
                );
            }
        }

        debug!(
            "hydrated {} workspaces, {} packages, {} dependencies",
            workspaces.len(),
            packages.len(),
            dependencies.len()
        );

        Ok(Project {
            workspaces,
            packages,
            dependencies,
        })
    }

    /// Get the workspace index.
    pub fn workspaces(&self) -> &Index<Workspace> {
        &self.workspaces
    }

    /// Get the package index.
    pub fn packages(&self) -> &Index<Package> {
        &self.packages
    }

    /// Get the dependency index.
    pub fn dependencies(&self) -> &Index<Dependency> {
        &self.dependencies
    }

    /// Look up a workspace by cwd.
    pub fn workspace(&self, cwd: &str) -> Option<&Workspace> {
        self.workspaces.find_first(&Filter::new().eq("cwd", cwd))
    }

    /// Look up a package by locator.
    pub fn package(&self, locator: &str) -> Option<&Package> {
        self.packages.find_first(&Filter::new().eq("locator", locator))
    }

    /// Current manifest documents, keyed by workspace cwd.
    pub fn manifests(&self) -> HashMap<&str, &Value> {
        self.workspaces
            .iter()
            .map(|ws| (ws.cwd(), ws.manifest().raw()))
            .collect()
    }
}
