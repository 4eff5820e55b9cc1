//! Implementation of `quay constraints`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::constraints::{
    load_rules, reconcile, Constraints, ProvenanceTracker, Recorder, Report, RuleSet,
};
use crate::core::{FsManifestLoader, Project, Snapshot};
use crate::util::GlobalContext;

/// Options for a constraints run.
#[derive(Debug, Clone)]
pub struct ConstraintsOptions {
    /// Produce operations instead of missing/extraneous/invalid errors
    pub fix: bool,

    /// Record which rule proposed each value
    pub provenance: bool,
}

impl Default for ConstraintsOptions {
    fn default() -> Self {
        ConstraintsOptions {
            fix: false,
            provenance: true,
        }
    }
}

/// Files a constraints run reads.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Directory workspace cwds are relative to
    pub root: PathBuf,

    /// Snapshot file
    pub snapshot: PathBuf,

    /// Rules file
    pub rules: PathBuf,

    /// Manifest file name inside each workspace
    pub manifest_name: String,
}

impl ProjectPaths {
    /// Resolve the paths configured for a context.
    pub fn from_context(ctx: &GlobalContext) -> Self {
        ProjectPaths {
            root: ctx.project_root().to_path_buf(),
            snapshot: ctx.snapshot_path(),
            rules: ctx.rules_path(),
            manifest_name: ctx.config().manifest_name().to_string(),
        }
    }

    /// Override the snapshot path.
    pub fn with_snapshot(mut self, snapshot: Option<PathBuf>) -> Self {
        if let Some(snapshot) = snapshot {
            self.snapshot = snapshot;
        }
        self
    }

    /// Override the rules path.
    pub fn with_rules(mut self, rules: Option<PathBuf>) -> Self {
        if let Some(rules) = rules {
            self.rules = rules;
        }
        self
    }
}

/// Load the snapshot and hydrate it against the manifests on disk.
pub fn load_project(root: &Path, snapshot: &Path, manifest_name: &str) -> Result<Project> {
    let snapshot = Snapshot::load(snapshot)?;
    let loader = FsManifestLoader::new(root).with_file_name(manifest_name);

    Project::hydrate(snapshot, &loader)
        .with_context(|| format!("failed to load project at {}", root.display()))
}

/// Run `rules` against `project` and reconcile the result.
pub fn evaluate(project: &Project, rules: &RuleSet, opts: &ConstraintsOptions) -> Result<Report> {
    let recorder = Recorder::new(ProvenanceTracker::new(opts.provenance));

    {
        let cx = Constraints::new(project, &recorder);
        rules.evaluate(&cx)?;
    }

    let state = recorder.into_state();
    debug!("evaluated {} rules", rules.len());

    let report = reconcile(state, &project.manifests(), opts.fix);
    info!(
        "{} workspaces checked: {} operations, {} errors",
        project.workspaces().len(),
        report.operation_count(),
        report.error_count()
    );

    Ok(report)
}

/// Load everything from disk and run the rules file.
pub fn run(paths: &ProjectPaths, opts: &ConstraintsOptions) -> Result<Report> {
    let project = load_project(&paths.root, &paths.snapshot, &paths.manifest_name)?;
    let rules = load_rules(&paths.rules)?;
    debug!("loaded {} rules from {}", rules.len(), paths.rules.display());

    evaluate(&project, &rules, opts)
}
