//! On-disk project fixtures.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::constraints::RULES_FILE_NAME;
use crate::core::MANIFEST_NAME;

use super::SnapshotBuilder;

/// Fixture for a complete project directory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Snapshot and manifests
    pub builder: SnapshotBuilder,
    /// Rules file content
    pub rules: String,
    /// Snapshot location relative to the project root
    pub snapshot_path: PathBuf,
}

impl ProjectFixture {
    /// Create a fixture from a snapshot builder, with no rules.
    pub fn new(builder: SnapshotBuilder) -> Self {
        ProjectFixture {
            builder,
            rules: String::new(),
            snapshot_path: PathBuf::from(".quay/snapshot.json"),
        }
    }

    /// Set the rules file content.
    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = rules.into();
        self
    }

    /// Write the project under `base_path`: manifests, snapshot, and rules
    /// file. Returns the project root.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        let root = base_path.to_path_buf();

        let snapshot = self.builder.snapshot();
        for workspace in &snapshot.workspaces {
            let manifest = self
                .builder
                .manifest(&workspace.cwd)
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default()));
            let dir = root.join(&workspace.cwd);
            std::fs::create_dir_all(&dir)?;
            std::fs::write(dir.join(MANIFEST_NAME), to_json(&manifest)?)?;
        }

        let snapshot_path = root.join(&self.snapshot_path);
        if let Some(parent) = snapshot_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&snapshot_path, to_json(&snapshot)?)?;

        std::fs::write(root.join(RULES_FILE_NAME), &self.rules)?;

        Ok(root)
    }
}

fn to_json(value: &impl serde::Serialize) -> std::io::Result<String> {
    serde_json::to_string_pretty(value).map_err(std::io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = ProjectFixture::new(
            SnapshotBuilder::new()
                .workspace(".", "root", json!({ "private": true }))
                .workspace("packages/a", "a", json!({ "name": "a" })),
        )
        .with_rules("[[rule]]\nkind = \"field\"\nfield = \"license\"\nvalue = \"MIT\"\n")
        .write_to(dir.path())
        .unwrap();

        assert!(root.join("package.json").is_file());
        assert!(root.join("packages/a/package.json").is_file());
        assert!(root.join(".quay/snapshot.json").is_file());
        let rules = std::fs::read_to_string(root.join("constraints.toml")).unwrap();
        assert!(rules.contains("license"));
    }
}
