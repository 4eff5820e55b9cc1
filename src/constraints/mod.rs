//! The constraints engine.
//!
//! Rules read the project through [`Constraints`] and record the manifest
//! state they want with the [`Recorder`]. Once every rule has run,
//! [`reconcile`] diffs the recorded intents against the manifests and
//! produces a [`Report`] of operations and errors.

pub mod context;
pub mod declarative;
pub mod provenance;
pub mod reconcile;
pub mod recorder;
pub mod report;
pub mod rules;

pub use context::{Constraints, DependencyRef, PackageRef, WorkspaceRef};
pub use declarative::{load_rules, parse_rules, DeclarativeRule, RuleSpec, RULES_FILE_NAME};
pub use provenance::{Caller, Provenance, ProvenanceTracker};
pub use reconcile::{reconcile, reconcile_workspace};
pub use recorder::{PerPathInfo, PerValueInfo, ReconciliationState, Recorder, WorkspaceUpdates};
pub use report::{AnnotatedError, Operation, Report};
pub use rules::{rule_fn, FnRule, Rule, RuleSet};
