//! Reconciliation of recorded intents against current manifests.
//!
//! For every recorded path, a single proposed value is diffed against the
//! manifest and becomes either an operation (fix mode) or an error (check
//! mode). Several distinct proposals for the same path are a conflict and are
//! always reported, whatever the mode. Workspaces share nothing here, so they
//! are reconciled in parallel and reassembled in cwd order.

use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;
use serde_json::Value;
use tracing::debug;

use crate::constraints::recorder::{PerPathInfo, ReconciliationState, WorkspaceUpdates};
use crate::constraints::report::{AnnotatedError, Operation, Report};
use crate::core::same_optional_value;

/// Turn a recorded state into a report.
///
/// `manifests` maps workspace cwds to their current manifest. A workspace
/// missing from the map is treated as having an empty manifest.
pub fn reconcile(
    state: ReconciliationState,
    manifests: &HashMap<&str, &Value>,
    fix: bool,
) -> Report {
    let (mut updates, mut errors) = state.into_parts();

    let cwds: BTreeSet<String> = updates.keys().chain(errors.keys()).cloned().collect();
    let work: Vec<_> = cwds
        .into_iter()
        .map(|cwd| {
            let ws_updates = updates.remove(&cwd).unwrap_or_default();
            let ws_errors = errors.remove(&cwd).unwrap_or_default();
            (cwd, ws_updates, ws_errors)
        })
        .collect();

    let results: Vec<_> = work
        .into_par_iter()
        .map(|(cwd, ws_updates, ws_errors)| {
            let manifest = manifests.get(cwd.as_str()).copied();
            let (operations, errors) = reconcile_workspace(ws_updates, ws_errors, manifest, fix);
            (cwd, operations, errors)
        })
        .collect();

    let mut report = Report::default();
    for (cwd, operations, errors) in results {
        if !operations.is_empty() {
            report.all_workspace_operations.push((cwd.clone(), operations));
        }
        if !errors.is_empty() {
            report.all_workspace_errors.push((cwd, errors));
        }
    }

    debug!(
        "reconciled: {} operations, {} errors",
        report.operation_count(),
        report.error_count()
    );

    report
}

/// Reconcile one workspace. User errors come first, then path errors.
pub fn reconcile_workspace(
    updates: WorkspaceUpdates,
    user_errors: Vec<AnnotatedError>,
    manifest: Option<&Value>,
    fix: bool,
) -> (Vec<Operation>, Vec<AnnotatedError>) {
    let mut operations = Vec::new();
    let mut errors = user_errors;

    for info in updates {
        match reconcile_path(info, manifest, fix) {
            Some(Outcome::Operation(op)) => operations.push(op),
            Some(Outcome::Error(err)) => errors.push(err),
            None => {}
        }
    }

    (operations, errors)
}

enum Outcome {
    Operation(Operation),
    Error(AnnotatedError),
}

fn reconcile_path(info: PerPathInfo, manifest: Option<&Value>, fix: bool) -> Option<Outcome> {
    if info.is_conflicting() {
        return Some(Outcome::Error(conflict(info)));
    }

    let field_path = info.field_path().clone();
    let proposed = info.values().first()?.value.clone();
    let current = manifest.and_then(|m| field_path.lookup(m)).cloned();

    if same_optional_value(current.as_ref(), proposed.as_ref()) {
        return None;
    }

    let outcome = match (fix, current, proposed) {
        (true, _, None) => Outcome::Operation(Operation::Unset { path: field_path }),
        (true, _, Some(value)) => Outcome::Operation(Operation::Set {
            path: field_path,
            value,
        }),
        (false, None, Some(expected)) => Outcome::Error(AnnotatedError::MissingField {
            field_path,
            expected,
        }),
        (false, Some(current_value), None) => Outcome::Error(AnnotatedError::ExtraneousField {
            field_path,
            current_value,
        }),
        (false, Some(current_value), Some(expected)) => {
            Outcome::Error(AnnotatedError::InvalidField {
                field_path,
                expected,
                current_value,
            })
        }
        // equal values were handled above
        (false, None, None) => return None,
    };

    Some(outcome)
}

fn conflict(info: PerPathInfo) -> AnnotatedError {
    let field_path = info.field_path().clone();
    let mut set_values = Vec::new();
    let mut unset_values = None;

    for entry in info.values() {
        match &entry.value {
            Some(value) => set_values.push((value.clone(), entry.callers.clone())),
            None => {
                unset_values.get_or_insert_with(|| entry.callers.clone());
            }
        }
    }

    AnnotatedError::ConflictingValues {
        field_path,
        set_values,
        unset_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::provenance::Caller;
    use crate::core::FieldPath;
    use serde_json::json;

    fn caller(name: &str) -> Option<Caller> {
        Some(Caller::new("rules.rs", name, 1, 1))
    }

    fn run(state: ReconciliationState, manifests: &[(&str, Value)], fix: bool) -> Report {
        let manifests: HashMap<&str, &Value> = manifests.iter().map(|(c, m)| (*c, m)).collect();
        reconcile(state, &manifests, fix)
    }

    #[test]
    fn test_missing_field() {
        let mut state = ReconciliationState::new();
        state.record("pkg-a", "license".into(), Some(json!("MIT")), caller("license"));
        let manifests = [("pkg-a", json!({ "name": "pkg-a" }))];

        let check = run(state.clone(), &manifests, false);
        assert!(check.all_workspace_operations.is_empty());
        assert_eq!(
            check.errors_for("pkg-a"),
            [AnnotatedError::MissingField {
                field_path: "license".into(),
                expected: json!("MIT"),
            }]
        );

        let fix = run(state, &manifests, true);
        assert!(fix.all_workspace_errors.is_empty());
        assert_eq!(
            fix.operations_for("pkg-a"),
            [Operation::Set {
                path: "license".into(),
                value: json!("MIT"),
            }]
        );
    }

    #[test]
    fn test_conflict_is_reported_in_both_modes() {
        let mut state = ReconciliationState::new();
        state.record("pkg-a", "license".into(), Some(json!("MIT")), caller("a"));
        state.record("pkg-a", "license".into(), Some(json!("Apache-2.0")), caller("b"));
        let manifests = [("pkg-a", json!({}))];

        for fix in [false, true] {
            let report = run(state.clone(), &manifests, fix);
            assert!(report.all_workspace_operations.is_empty());
            assert_eq!(
                report.errors_for("pkg-a"),
                [AnnotatedError::ConflictingValues {
                    field_path: "license".into(),
                    set_values: vec![
                        (json!("MIT"), vec![caller("a").unwrap()]),
                        (json!("Apache-2.0"), vec![caller("b").unwrap()]),
                    ],
                    unset_values: None,
                }]
            );
        }
    }

    #[test]
    fn test_conflict_between_set_and_unset() {
        let mut state = ReconciliationState::new();
        state.record("ws", "private".into(), Some(json!(true)), caller("a"));
        state.record("ws", "private".into(), None, caller("b"));
        state.record("ws", "private".into(), None, caller("c"));

        let report = run(state, &[("ws", json!({ "private": true }))], true);
        let [AnnotatedError::ConflictingValues {
            set_values,
            unset_values,
            ..
        }] = report.errors_for("ws")
        else {
            panic!("expected a single conflict, got {:?}", report);
        };
        assert_eq!(set_values.len(), 1);
        assert_eq!(unset_values.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_matching_value_is_a_no_op() {
        let mut state = ReconciliationState::new();
        state.record("pkg-a", "license".into(), Some(json!("MIT")), caller("a"));
        state.record("pkg-a", "license".into(), Some(json!("MIT")), caller("b"));
        state.record("pkg-a", "nope".into(), None, caller("c"));
        let manifests = [("pkg-a", json!({ "license": "MIT" }))];

        for fix in [false, true] {
            assert_eq!(run(state.clone(), &manifests, fix), Report::default());
        }
    }

    #[test]
    fn test_structural_comparison_against_manifest() {
        let mut state = ReconciliationState::new();
        state.record(
            "ws",
            "publishConfig".into(),
            Some(json!({ "registry": "https://r", "access": "public" })),
            None,
        );
        let manifests = [(
            "ws",
            json!({ "publishConfig": { "access": "public", "registry": "https://r" } }),
        )];

        assert_eq!(run(state, &manifests, false), Report::default());
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let mut state = ReconciliationState::new();
        state.record("ws", "engines.rank".into(), Some(json!(1)), None);
        let manifests = [("ws", json!({ "engines": { "rank": 1.0 } }))];

        for fix in [false, true] {
            assert_eq!(run(state.clone(), &manifests, fix), Report::default());
        }
    }

    #[test]
    fn test_extraneous_and_invalid_fields() {
        let mut state = ReconciliationState::new();
        let dep: FieldPath = ["dependencies", "foo"].into();
        state.record("ws", dep.clone(), None, caller("a"));
        state.record("ws", "license".into(), Some(json!("MIT")), caller("b"));
        let manifests = [(
            "ws",
            json!({ "license": "ISC", "dependencies": { "foo": "^1.0.0" } }),
        )];

        let check = run(state.clone(), &manifests, false);
        assert_eq!(
            check.errors_for("ws"),
            [
                AnnotatedError::ExtraneousField {
                    field_path: dep.clone(),
                    current_value: json!("^1.0.0"),
                },
                AnnotatedError::InvalidField {
                    field_path: "license".into(),
                    expected: json!("MIT"),
                    current_value: json!("ISC"),
                },
            ]
        );

        let fix = run(state, &manifests, true);
        assert_eq!(
            fix.operations_for("ws"),
            [
                Operation::Unset { path: dep },
                Operation::Set {
                    path: "license".into(),
                    value: json!("MIT"),
                },
            ]
        );
    }

    #[test]
    fn test_user_errors_survive_fix_mode() {
        let mut state = ReconciliationState::new();
        state.record_error("ws", "custom problem");
        state.record("ws", "license".into(), Some(json!("MIT")), None);

        let report = run(state, &[("ws", json!({}))], true);
        assert_eq!(
            report.errors_for("ws"),
            [AnnotatedError::UserError {
                message: "custom problem".into()
            }]
        );
        assert_eq!(report.operations_for("ws").len(), 1);
    }

    #[test]
    fn test_unknown_workspace_manifest_is_empty() {
        let mut state = ReconciliationState::new();
        state.record("elsewhere", "license".into(), Some(json!("MIT")), None);

        let report = run(state, &[], false);
        assert!(matches!(
            report.errors_for("elsewhere"),
            [AnnotatedError::MissingField { .. }]
        ));
    }

    #[test]
    fn test_workspaces_are_ordered_by_cwd() {
        let mut state = ReconciliationState::new();
        for cwd in ["packages/c", "packages/a", ".", "packages/b"] {
            state.record(cwd, "license".into(), Some(json!("MIT")), None);
        }

        let report = run(state, &[], true);
        let cwds: Vec<_> = report
            .all_workspace_operations
            .iter()
            .map(|(cwd, _)| cwd.as_str())
            .collect();
        assert_eq!(cwds, [".", "packages/a", "packages/b", "packages/c"]);
    }

    #[test]
    fn test_reconciling_fixed_manifest_is_idempotent() {
        let mut state = ReconciliationState::new();
        state.record("ws", "license".into(), Some(json!("MIT")), None);
        state.record("ws", "scripts.test".into(), None, None);
        let manifests = [("ws", json!({ "scripts": { "test": "jest" } }))];

        let fix = run(state.clone(), &manifests, true);
        let mut patched = manifests[0].1.clone();
        for op in fix.operations_for("ws") {
            match op {
                Operation::Set { path, value } => {
                    patched[&path.segments()[0]] = value.clone();
                }
                Operation::Unset { path } => {
                    patched["scripts"]
                        .as_object_mut()
                        .unwrap()
                        .remove(&path.segments()[1]);
                }
            }
        }

        assert_eq!(run(state, &[("ws", patched)], false), Report::default());
    }
}
