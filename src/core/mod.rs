//! Core data structures for Quay.
//!
//! This module contains the entity model the engine works on:
//! - Snapshot input and hydration into a Project
//! - Workspaces, packages and dependencies
//! - The multi-field Index used to query them
//! - Manifests and field paths

pub mod dependency;
pub mod error;
pub mod field_path;
pub mod index;
pub mod manifest;
pub mod package;
pub mod project;
pub mod snapshot;
pub mod workspace;

pub use dependency::{Dependency, DependencyType};
pub use error::HydrateError;
pub use field_path::FieldPath;
pub use index::{FieldValue, Filter, Index, Indexable};
pub use manifest::{
    same_optional_value, same_value, FsManifestLoader, Manifest, ManifestLoader,
    MemoryManifestLoader, MANIFEST_NAME,
};
pub use package::Package;
pub use project::Project;
pub use snapshot::Snapshot;
pub use workspace::Workspace;
