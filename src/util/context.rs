//! Global context for Quay operations.
//!
//! Provides centralized access to configuration, paths, and output settings.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::constraints::RULES_FILE_NAME;
use crate::util::config::{load_config, project_config_path, Config, PROJECT_DIR};

/// Project directories for Quay
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "quay", "quay"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Directory holding the global config, if the platform has one
    config_home: Option<PathBuf>,

    /// Project root, if one was found above cwd
    project_root: Option<PathBuf>,

    /// Merged configuration
    config: Config,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext for the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let config_home = PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.config_dir().to_path_buf());
        Self::with_paths(cwd, config_home)
    }

    /// Create a GlobalContext with explicit working and global config
    /// directories.
    pub fn with_paths(cwd: PathBuf, config_home: Option<PathBuf>) -> Self {
        let project_root = find_project_root(&cwd);
        let global = config_home.as_ref().map(|dir| dir.join("config.toml"));
        let project = project_config_path(project_root.as_deref().unwrap_or(&cwd));
        let config = load_config(global.as_deref(), &project);

        GlobalContext {
            cwd,
            config_home,
            project_root,
            config,
            verbose: false,
            color: true,
        }
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the global configuration file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.config_home.as_ref().map(|dir| dir.join("config.toml"))
    }

    /// Get the project root: the nearest directory at or above cwd holding
    /// a rules file or a `.quay` directory, or cwd itself.
    pub fn project_root(&self) -> &Path {
        self.project_root.as_deref().unwrap_or(&self.cwd)
    }

    /// Check if a project root was found.
    pub fn in_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Get the rules file path.
    pub fn rules_path(&self) -> PathBuf {
        self.project_root().join(self.config.rules_name())
    }

    /// Get the snapshot path.
    pub fn snapshot_path(&self) -> PathBuf {
        self.project_root().join(self.config.snapshot_path())
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }
}

/// Search upward from `start` for a project root.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(RULES_FILE_NAME).is_file() || dir.join(PROJECT_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_project_root_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("constraints.toml"), "").unwrap();
        let nested = tmp.path().join("packages/a/src");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_paths(nested.clone(), None);
        assert!(ctx.in_project());
        assert_eq!(ctx.project_root(), tmp.path());
        assert_eq!(ctx.rules_path(), tmp.path().join("constraints.toml"));
        assert_eq!(ctx.snapshot_path(), tmp.path().join(".quay/snapshot.json"));
        assert_eq!(ctx.cwd(), nested);
    }

    #[test]
    fn test_project_config_is_applied() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".quay")).unwrap();
        std::fs::write(
            tmp.path().join(".quay/config.toml"),
            "[project]\nrules = \"rules.toml\"\nsnapshot = \"graph.json\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_paths(tmp.path().to_path_buf(), None);
        assert_eq!(ctx.rules_path(), tmp.path().join("rules.toml"));
        assert_eq!(ctx.snapshot_path(), tmp.path().join("graph.json"));
    }

    #[test]
    fn test_global_config_is_overridden_by_project() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let project = tmp.path().join("project");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(project.join(".quay")).unwrap();
        std::fs::write(
            home.join("config.toml"),
            "[constraints]\nprovenance = false\nformat = \"json\"\n",
        )
        .unwrap();
        std::fs::write(
            project.join(".quay/config.toml"),
            "[constraints]\nprovenance = true\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_paths(project, Some(home.clone()));
        assert_eq!(ctx.global_config_path(), Some(home.join("config.toml")));
        assert!(ctx.config().provenance());
        assert_eq!(
            ctx.config().format(),
            crate::util::config::OutputFormat::Json
        );
    }

    #[test]
    fn test_no_project_falls_back_to_cwd() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_paths(tmp.path().to_path_buf(), None);
        assert!(!ctx.in_project());
        assert_eq!(ctx.project_root(), tmp.path());
    }
}
