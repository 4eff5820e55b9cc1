//! Workspace manifest documents.
//!
//! Manifests are kept as raw JSON. The engine only ever reads them; every
//! proposed change travels through the recorder and comes back out as an
//! operation for the caller to apply.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::core::error::HydrateError;
use crate::core::FieldPath;

/// Default manifest file name inside each workspace.
pub const MANIFEST_NAME: &str = "package.json";

/// A parsed workspace manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Where the manifest was read from (if it came from disk)
    path: Option<PathBuf>,

    /// The raw document
    raw: Value,
}

impl Manifest {
    /// Wrap an in-memory document.
    pub fn from_value(raw: Value) -> Self {
        Manifest { path: None, raw }
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, HydrateError> {
        let contents = std::fs::read_to_string(path).map_err(|source| HydrateError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

        let raw = serde_json::from_str(&contents).map_err(|source| HydrateError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Manifest {
            path: Some(path.to_path_buf()),
            raw,
        })
    }

    /// Get the file this manifest was read from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the raw document.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Read the current value at a field path.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.lookup(&self.raw)
    }

    /// Check whether a field path is present.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.get(path).is_some()
    }
}

/// Compare two manifest values as JSON documents.
///
/// Numbers compare by value, so `1` and `1.0` are the same value. Object key
/// order never matters.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}

/// Compare two optional values, where `None` is an absent field.
pub fn same_optional_value(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_value(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Source of workspace manifests during hydration.
pub trait ManifestLoader {
    /// Load the manifest of the workspace at `cwd`.
    fn load(&self, cwd: &str) -> Result<Manifest, HydrateError>;
}

/// Reads `<root>/<cwd>/<file name>` from disk.
#[derive(Debug, Clone)]
pub struct FsManifestLoader {
    root: PathBuf,
    file_name: String,
}

impl FsManifestLoader {
    /// Create a loader rooted at the project directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsManifestLoader {
            root: root.into(),
            file_name: MANIFEST_NAME.to_string(),
        }
    }

    /// Use a different manifest file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Path of the manifest for a workspace cwd.
    pub fn manifest_path(&self, cwd: &str) -> PathBuf {
        self.root.join(cwd).join(&self.file_name)
    }
}

impl ManifestLoader for FsManifestLoader {
    fn load(&self, cwd: &str) -> Result<Manifest, HydrateError> {
        Manifest::load(&self.manifest_path(cwd))
    }
}

/// Serves manifests from memory, keyed by workspace cwd.
#[derive(Debug, Clone, Default)]
pub struct MemoryManifestLoader {
    manifests: HashMap<String, Value>,
}

impl MemoryManifestLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the manifest for a workspace.
    pub fn insert(&mut self, cwd: impl Into<String>, manifest: Value) {
        self.manifests.insert(cwd.into(), manifest);
    }
}

impl ManifestLoader for MemoryManifestLoader {
    fn load(&self, cwd: &str) -> Result<Manifest, HydrateError> {
        self.manifests
            .get(cwd)
            .cloned()
            .map(Manifest::from_value)
            .ok_or_else(|| HydrateError::ManifestMissing {
                cwd: cwd.to_string(),
            })
    }
}
