//! Repository snapshot input format.
//!
//! The snapshot is produced by whatever tool owns the install graph and is
//! consumed verbatim here. It lists every workspace with its declared
//! dependencies and every package of the resolved graph.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::DependencyType;

/// The full snapshot document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub workspaces: Vec<WorkspaceEntry>,

    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

/// A workspace with its declared dependencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceEntry {
    pub cwd: String,

    pub ident: String,

    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,

    #[serde(default)]
    pub peer_dependencies: Vec<DependencyEntry>,

    #[serde(default)]
    pub dev_dependencies: Vec<DependencyEntry>,
}

impl WorkspaceEntry {
    /// Iterate over the entries of all three dependency tables.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &DependencyEntry> {
        self.dependencies
            .iter()
            .chain(&self.dev_dependencies)
            .chain(&self.peer_dependencies)
    }
}

/// A declared dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEntry {
    pub ident: String,

    pub range: String,

    pub dependency_type: DependencyType,

    #[serde(default)]
    pub resolution: Option<String>,
}

/// A package of the resolved graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEntry {
    pub locator: String,

    #[serde(default)]
    pub workspace: Option<String>,

    pub ident: String,

    #[serde(default)]
    pub version: Option<String>,

    /// (ident, locator) pairs
    #[serde(default)]
    pub dependencies: Vec<(String, String)>,

    /// (ident, range) pairs
    #[serde(default)]
    pub peer_dependencies: Vec<(String, String)>,

    /// (ident, range) pairs
    #[serde(default)]
    pub optional_peer_dependencies: Vec<(String, String)>,
}

impl Snapshot {
    /// Parse a snapshot from JSON text.
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("failed to parse snapshot")
    }

    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse snapshot: {}", path.display()))
    }
}
