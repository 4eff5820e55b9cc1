//! Mutation recording.
//!
//! Rules never touch manifests. Every write they request is recorded here,
//! grouped by workspace and field path, with identical proposals folded into
//! a single entry that accumulates callers. Because nothing is applied until
//! reconciliation, rules can run in any order and produce the same result.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::trace;

use crate::constraints::provenance::{Caller, Provenance, ProvenanceTracker};
use crate::constraints::report::AnnotatedError;
use crate::core::{same_optional_value, FieldPath};

/// One proposed target value for a path, and who proposed it.
///
/// `value` is `None` for an unset proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct PerValueInfo {
    pub value: Option<Value>,
    pub callers: Vec<Caller>,
}

/// Every distinct value proposed for one field path, in first-proposed order.
#[derive(Debug, Clone, PartialEq)]
pub struct PerPathInfo {
    field_path: FieldPath,
    values: Vec<PerValueInfo>,
}

impl PerPathInfo {
    fn new(field_path: FieldPath) -> Self {
        PerPathInfo {
            field_path,
            values: Vec::new(),
        }
    }

    /// Get the field path.
    pub fn field_path(&self) -> &FieldPath {
        &self.field_path
    }

    /// Get the distinct proposed values.
    pub fn values(&self) -> &[PerValueInfo] {
        &self.values
    }

    /// Check if more than one distinct value was proposed.
    pub fn is_conflicting(&self) -> bool {
        self.values.len() > 1
    }

    /// Find or create the entry for a value (structural equality).
    fn entry(&mut self, value: Option<Value>) -> &mut PerValueInfo {
        let position = self
            .values
            .iter()
            .position(|v| same_optional_value(v.value.as_ref(), value.as_ref()));
        let position = match position {
            Some(position) => position,
            None => {
                self.values.push(PerValueInfo {
                    value,
                    callers: Vec::new(),
                });
                self.values.len() - 1
            }
        };
        &mut self.values[position]
    }
}

/// Recorded path updates of one workspace, in first-written order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceUpdates {
    paths: Vec<PerPathInfo>,
    by_path: HashMap<FieldPath, usize>,
}

impl WorkspaceUpdates {
    /// Iterate over the recorded paths.
    pub fn iter(&self) -> impl Iterator<Item = &PerPathInfo> {
        self.paths.iter()
    }

    /// Get the info recorded for a path.
    pub fn get(&self, path: &FieldPath) -> Option<&PerPathInfo> {
        self.by_path.get(path).map(|&i| &self.paths[i])
    }

    /// Number of recorded paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn path_mut(&mut self, path: FieldPath) -> &mut PerPathInfo {
        let position = match self.by_path.get(&path).copied() {
            Some(position) => position,
            None => {
                self.paths.push(PerPathInfo::new(path.clone()));
                self.by_path.insert(path, self.paths.len() - 1);
                self.paths.len() - 1
            }
        };
        &mut self.paths[position]
    }
}

impl IntoIterator for WorkspaceUpdates {
    type Item = PerPathInfo;
    type IntoIter = std::vec::IntoIter<PerPathInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// Everything recorded during one evaluation pass.
///
/// This is plain data: the reconciler consumes it, and tests can build one
/// directly without running any rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationState {
    updates: BTreeMap<String, WorkspaceUpdates>,
    errors: BTreeMap<String, Vec<AnnotatedError>>,
}

impl ReconciliationState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a proposal for `path` of workspace `cwd`.
    pub fn record(
        &mut self,
        cwd: &str,
        path: FieldPath,
        value: Option<Value>,
        caller: Option<Caller>,
    ) {
        let info = self
            .updates
            .entry(cwd.to_string())
            .or_default()
            .path_mut(path)
            .entry(value);

        if let Some(caller) = caller {
            info.callers.push(caller);
        }
    }

    /// Record a user error for workspace `cwd`.
    pub fn record_error(&mut self, cwd: &str, message: impl Into<String>) {
        self.errors
            .entry(cwd.to_string())
            .or_default()
            .push(AnnotatedError::UserError {
                message: message.into(),
            });
    }

    /// Get the updates recorded for a workspace.
    pub fn updates(&self, cwd: &str) -> Option<&WorkspaceUpdates> {
        self.updates.get(cwd)
    }

    /// Get the user errors recorded for a workspace.
    pub fn user_errors(&self, cwd: &str) -> &[AnnotatedError] {
        self.errors.get(cwd).map(Vec::as_slice).unwrap_or_default()
    }

    /// Check if nothing at all was recorded.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.errors.is_empty()
    }

    /// Split into per-workspace updates and per-workspace user errors.
    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<String, WorkspaceUpdates>,
        BTreeMap<String, Vec<AnnotatedError>>,
    ) {
        (self.updates, self.errors)
    }
}

/// The write API handed to rules.
///
/// Rules only hold shared references while they run, so the state sits
/// behind a `RefCell`.
#[derive(Debug, Default)]
pub struct Recorder {
    state: RefCell<ReconciliationState>,
    provenance: ProvenanceTracker,
}

impl Recorder {
    /// Create a recorder using the given provenance tracker.
    pub fn new(provenance: ProvenanceTracker) -> Self {
        Recorder {
            state: RefCell::new(ReconciliationState::new()),
            provenance,
        }
    }

    /// Get the provenance tracker.
    pub fn provenance(&self) -> &ProvenanceTracker {
        &self.provenance
    }

    /// Propose `value` for `path` (`None` proposes removing the field).
    pub fn set(
        &self,
        cwd: &str,
        path: impl Into<FieldPath>,
        value: Option<Value>,
        provenance: Provenance,
    ) {
        let path = path.into();
        let caller = self.provenance.resolve(provenance);

        let shown = match &value {
            Some(value) => value.to_string(),
            None => "<unset>".to_string(),
        };
        trace!("{}: {} {}", cwd, path, shown);

        self.state.borrow_mut().record(cwd, path, value, caller);
    }

    /// Propose removing `path`.
    pub fn unset(&self, cwd: &str, path: impl Into<FieldPath>, provenance: Provenance) {
        self.set(cwd, path, None, provenance);
    }

    /// Report a user error against a workspace.
    pub fn error(&self, cwd: &str, message: impl Into<String>) {
        let message = message.into();
        trace!("{}: error: {}", cwd, message);
        self.state.borrow_mut().record_error(cwd, message);
    }

    /// Take a copy of the state recorded so far.
    pub fn snapshot(&self) -> ReconciliationState {
        self.state.borrow().clone()
    }

    /// Finish recording.
    pub fn into_state(self) -> ReconciliationState {
        self.state.into_inner()
    }
}
