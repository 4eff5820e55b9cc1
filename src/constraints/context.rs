//! The API rules are written against.
//!
//! [`Constraints`] answers queries from the project indexes and hands out
//! entity handles whose write methods feed the [`Recorder`]. Handles deref to
//! the underlying entity, so `workspace.ident()` and `dependency.range()`
//! work as usual.

use std::ops::Deref;
use std::panic::Location;

use serde_json::Value;

use crate::constraints::provenance::{Caller, Provenance};
use crate::constraints::recorder::Recorder;
use crate::core::{Dependency, FieldPath, Filter, Package, Project, Workspace};

/// Read and write access to a project for the duration of one rule.
#[derive(Clone)]
pub struct Constraints<'a> {
    project: &'a Project,
    recorder: &'a Recorder,
    caller: Option<Caller>,
}

impl<'a> Constraints<'a> {
    /// Create a context over a hydrated project.
    pub fn new(project: &'a Project, recorder: &'a Recorder) -> Self {
        Constraints {
            project,
            recorder,
            caller: None,
        }
    }

    /// Attribute every write made through the returned context to `caller`.
    pub fn with_caller(&self, caller: Caller) -> Constraints<'a> {
        Constraints {
            caller: Some(caller),
            ..self.clone()
        }
    }

    /// Get the underlying project.
    pub fn project(&self) -> &'a Project {
        self.project
    }

    /// Get the recorder.
    pub fn recorder(&self) -> &'a Recorder {
        self.recorder
    }

    /// First workspace matching the filter.
    pub fn workspace(&self, filter: &Filter) -> Option<WorkspaceRef<'_>> {
        self.workspaces(filter).into_iter().next()
    }

    /// All workspaces matching the filter.
    pub fn workspaces(&self, filter: &Filter) -> Vec<WorkspaceRef<'_>> {
        self.project
            .workspaces()
            .find(filter)
            .into_iter()
            .map(|workspace| WorkspaceRef { workspace, cx: self })
            .collect()
    }

    /// First dependency matching the filter.
    pub fn dependency(&self, filter: &Filter) -> Option<DependencyRef<'_>> {
        self.dependencies(filter).into_iter().next()
    }

    /// All dependencies matching the filter.
    pub fn dependencies(&self, filter: &Filter) -> Vec<DependencyRef<'_>> {
        self.project
            .dependencies()
            .find(filter)
            .into_iter()
            .map(|dependency| DependencyRef {
                dependency,
                cx: self,
            })
            .collect()
    }

    /// First package matching the filter.
    pub fn package(&self, filter: &Filter) -> Option<PackageRef<'_>> {
        self.packages(filter).into_iter().next()
    }

    /// All packages matching the filter.
    pub fn packages(&self, filter: &Filter) -> Vec<PackageRef<'_>> {
        self.project
            .packages()
            .find(filter)
            .into_iter()
            .map(|package| PackageRef { package, cx: self })
            .collect()
    }

    fn provenance(&self, location: &'static Location<'static>) -> Provenance {
        match &self.caller {
            Some(caller) => Provenance::Override(caller.clone()),
            None => Provenance::Tracked(location),
        }
    }

    fn workspace_ref(&self, cwd: &str) -> Option<WorkspaceRef<'_>> {
        self.project
            .workspace(cwd)
            .map(|workspace| WorkspaceRef { workspace, cx: self })
    }

    fn package_ref(&self, locator: &str) -> Option<PackageRef<'_>> {
        self.project
            .package(locator)
            .map(|package| PackageRef { package, cx: self })
    }
}

/// A workspace, with write access to its manifest.
#[derive(Clone, Copy)]
pub struct WorkspaceRef<'c> {
    workspace: &'c Workspace,
    cx: &'c Constraints<'c>,
}

impl<'c> WorkspaceRef<'c> {
    /// Require `path` to hold `value`.
    #[track_caller]
    pub fn set(&self, path: impl Into<FieldPath>, value: impl Into<Value>) {
        let provenance = self.cx.provenance(Location::caller());
        self.cx
            .recorder
            .set(self.workspace.cwd(), path, Some(value.into()), provenance);
    }

    /// Require `path` to be absent.
    #[track_caller]
    pub fn unset(&self, path: impl Into<FieldPath>) {
        let provenance = self.cx.provenance(Location::caller());
        self.cx
            .recorder
            .unset(self.workspace.cwd(), path, provenance);
    }

    /// Report an error against this workspace.
    pub fn error(&self, message: impl Into<String>) {
        self.cx.recorder.error(self.workspace.cwd(), message);
    }

    /// The package this workspace owns.
    pub fn package(&self) -> Option<PackageRef<'c>> {
        self.cx.package_ref(self.workspace.package_locator())
    }

    /// Dependencies declared by this workspace.
    pub fn dependencies(&self) -> Vec<DependencyRef<'c>> {
        self.cx
            .dependencies(&Filter::new().eq("workspace", self.workspace.cwd()))
    }

    /// Get the underlying workspace.
    pub fn entity(&self) -> &'c Workspace {
        self.workspace
    }
}

impl Deref for WorkspaceRef<'_> {
    type Target = Workspace;

    fn deref(&self) -> &Workspace {
        self.workspace
    }
}

/// A dependency, with write access to its range.
#[derive(Clone, Copy)]
pub struct DependencyRef<'c> {
    dependency: &'c Dependency,
    cx: &'c Constraints<'c>,
}

impl<'c> DependencyRef<'c> {
    /// Require the dependency to use `range`.
    #[track_caller]
    pub fn update(&self, range: impl Into<String>) {
        let provenance = self.cx.provenance(Location::caller());
        self.cx.recorder.set(
            self.dependency.workspace(),
            self.dependency.field_path(),
            Some(Value::String(range.into())),
            provenance,
        );
    }

    /// Require the dependency to be removed.
    #[track_caller]
    pub fn delete(&self) {
        let provenance = self.cx.provenance(Location::caller());
        self.cx.recorder.unset(
            self.dependency.workspace(),
            self.dependency.field_path(),
            provenance,
        );
    }

    /// Report an error against the declaring workspace.
    pub fn error(&self, message: impl Into<String>) {
        self.cx.recorder.error(self.dependency.workspace(), message);
    }

    /// The declaring workspace.
    pub fn workspace(&self) -> Option<WorkspaceRef<'c>> {
        self.cx.workspace_ref(self.dependency.workspace())
    }

    /// The package this dependency resolved to.
    pub fn resolution(&self) -> Option<PackageRef<'c>> {
        self.dependency
            .resolution()
            .and_then(|locator| self.cx.package_ref(locator))
    }

    /// Get the underlying dependency.
    pub fn entity(&self) -> &'c Dependency {
        self.dependency
    }
}

impl Deref for DependencyRef<'_> {
    type Target = Dependency;

    fn deref(&self) -> &Dependency {
        self.dependency
    }
}

/// A package of the resolved graph.
#[derive(Clone, Copy)]
pub struct PackageRef<'c> {
    package: &'c Package,
    cx: &'c Constraints<'c>,
}

impl<'c> PackageRef<'c> {
    /// The workspace owning this package, if any.
    pub fn workspace(&self) -> Option<WorkspaceRef<'c>> {
        self.package
            .workspace()
            .and_then(|cwd| self.cx.workspace_ref(cwd))
    }

    /// Resolved dependencies as (ident, package) pairs.
    pub fn dependencies(&self) -> Vec<(&'c str, PackageRef<'c>)> {
        let cx = self.cx;
        self.package
            .dependencies()
            .filter_map(|(ident, locator)| Some((ident, cx.package_ref(locator)?)))
            .collect()
    }

    /// Get the underlying package.
    pub fn entity(&self) -> &'c Package {
        self.package
    }
}

impl Deref for PackageRef<'_> {
    type Target = Package;

    fn deref(&self) -> &Package {
        self.package
    }
}
