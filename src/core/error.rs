//! Snapshot integrity errors.
//!
//! These abort a run. They mean the snapshot handed to the engine is
//! malformed, not that a rule found a problem in the repository.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::DependencyType;

/// Error while hydrating a snapshot into entities.
#[derive(Debug, Error)]
pub enum HydrateError {
    #[error("workspace `{cwd}` appears more than once in the snapshot")]
    DuplicateWorkspace { cwd: String },

    #[error("package `{locator}` appears more than once in the snapshot")]
    DuplicatePackage { locator: String },

    #[error("unknown workspace `{cwd}` referenced by {referenced_by}")]
    UnknownWorkspace { cwd: String, referenced_by: String },

    #[error("unknown package `{locator}` referenced by {referenced_by}")]
    UnknownPackage {
        locator: String,
        referenced_by: String,
    },

    #[error("workspace `{cwd}` is owned by more than one package: {}", locators.join(", "))]
    DuplicateWorkspacePackage { cwd: String, locators: Vec<String> },

    #[error("workspace `{cwd}` has no package in the snapshot")]
    MissingWorkspacePackage { cwd: String },

    #[error("duplicate {kind} entry `{ident}` in workspace `{workspace}`")]
    DuplicateDependency {
        workspace: String,
        kind: DependencyType,
        ident: String,
    },

    #[error("failed to read manifest: {}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest: {}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no manifest available for workspace `{cwd}`")]
    ManifestMissing { cwd: String },
}
