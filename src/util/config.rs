//! Configuration file support for Quay.
//!
//! Quay reads two configuration files:
//! - Global: `<config dir>/quay/config.toml` - User-wide defaults
//! - Project: `.quay/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Every setting is
//! optional; accessors fall back to the built-in defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constraints::RULES_FILE_NAME;
use crate::core::MANIFEST_NAME;

/// Directory holding project-local Quay files.
pub const PROJECT_DIR: &str = ".quay";

/// Default snapshot location, relative to the project root.
pub const DEFAULT_SNAPSHOT_PATH: &str = ".quay/snapshot.json";

/// Quay configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout settings
    pub project: ProjectConfig,

    /// Constraints run settings
    pub constraints: ConstraintsConfig,
}

/// Where project files live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Manifest file name inside each workspace (e.g., package.json)
    pub manifest: Option<String>,

    /// Snapshot path, relative to the project root
    pub snapshot: Option<PathBuf>,

    /// Rules file name at the project root
    pub rules: Option<String>,
}

/// How constraints runs behave.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintsConfig {
    /// Record which rule proposed each value
    pub provenance: Option<bool>,

    /// Default report format
    pub format: Option<OutputFormat>,
}

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.project.manifest.is_some() {
            self.project.manifest = other.project.manifest;
        }
        if other.project.snapshot.is_some() {
            self.project.snapshot = other.project.snapshot;
        }
        if other.project.rules.is_some() {
            self.project.rules = other.project.rules;
        }

        if other.constraints.provenance.is_some() {
            self.constraints.provenance = other.constraints.provenance;
        }
        if other.constraints.format.is_some() {
            self.constraints.format = other.constraints.format;
        }
    }

    /// Get the manifest file name.
    pub fn manifest_name(&self) -> &str {
        self.project.manifest.as_deref().unwrap_or(MANIFEST_NAME)
    }

    /// Get the snapshot path, relative to the project root.
    pub fn snapshot_path(&self) -> &Path {
        self.project
            .snapshot
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_SNAPSHOT_PATH))
    }

    /// Get the rules file name.
    pub fn rules_name(&self) -> &str {
        self.project.rules.as_deref().unwrap_or(RULES_FILE_NAME)
    }

    /// Check whether provenance is recorded.
    pub fn provenance(&self) -> bool {
        self.constraints.provenance.unwrap_or(true)
    }

    /// Get the default output format.
    pub fn format(&self) -> OutputFormat {
        self.constraints.format.unwrap_or_default()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.quay/config.toml)
/// 2. Global config (<config dir>/quay/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the project config path (.quay/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.manifest_name(), "package.json");
        assert_eq!(config.snapshot_path(), Path::new(".quay/snapshot.json"));
        assert_eq!(config.rules_name(), "constraints.toml");
        assert!(config.provenance());
        assert_eq!(config.format(), OutputFormat::Human);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[project]
manifest = "manifest.json"
snapshot = "build/snapshot.json"

[constraints]
provenance = false
format = "json"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.manifest_name(), "manifest.json");
        assert_eq!(config.snapshot_path(), Path::new("build/snapshot.json"));
        assert_eq!(config.rules_name(), "constraints.toml");
        assert!(!config.provenance());
        assert_eq!(config.format(), OutputFormat::Json);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.project.rules = Some("rules.toml".to_string());
        base.constraints.provenance = Some(false);

        let mut override_cfg = Config::default();
        override_cfg.constraints.provenance = Some(true);

        base.merge(override_cfg);

        assert_eq!(base.rules_name(), "rules.toml"); // Not overridden
        assert!(base.provenance());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            "[project]\nrules = \"global.toml\"\n\n[constraints]\nformat = \"json\"\n",
        )
        .unwrap();
        std::fs::write(&project_path, "[project]\nrules = \"project.toml\"\n").unwrap();

        let config = load_config(Some(&global_path), &project_path);
        assert_eq!(config.rules_name(), "project.toml");
        assert_eq!(config.format(), OutputFormat::Json);
    }

    #[test]
    fn test_unparsable_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[constraints]\nformat = \"yaml\"\n").unwrap();

        assert!(Config::load(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Human.to_string(), "human");
    }
}
