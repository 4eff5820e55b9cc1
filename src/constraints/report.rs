//! Reconciliation output.
//!
//! The JSON shape is consumed by other tools, so field names follow the
//! camelCase wire format rather than Rust naming.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constraints::provenance::Caller;
use crate::core::FieldPath;

/// A minimal instruction to bring a manifest in line with the rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    Set { path: FieldPath, value: Value },
    Unset { path: FieldPath },
}

impl Operation {
    /// The path this operation touches.
    pub fn path(&self) -> &FieldPath {
        match self {
            Operation::Set { path, .. } | Operation::Unset { path } => path,
        }
    }
}

/// A problem found in a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnnotatedError {
    /// The manifest lacks a field a rule wants set.
    #[serde(rename_all = "camelCase")]
    MissingField { field_path: FieldPath, expected: Value },

    /// The manifest has a field a rule wants removed.
    #[serde(rename_all = "camelCase")]
    ExtraneousField {
        field_path: FieldPath,
        current_value: Value,
    },

    /// The manifest has a different value than the one a rule wants.
    #[serde(rename_all = "camelCase")]
    InvalidField {
        field_path: FieldPath,
        expected: Value,
        current_value: Value,
    },

    /// Rules disagree about a field.
    #[serde(rename_all = "camelCase")]
    ConflictingValues {
        field_path: FieldPath,
        set_values: Vec<(Value, Vec<Caller>)>,
        unset_values: Option<Vec<Caller>>,
    },

    /// Explicit error raised by a rule.
    #[serde(rename_all = "camelCase")]
    UserError { message: String },
}

impl AnnotatedError {
    /// The field path this error is about, if any.
    pub fn field_path(&self) -> Option<&FieldPath> {
        match self {
            AnnotatedError::MissingField { field_path, .. }
            | AnnotatedError::ExtraneousField { field_path, .. }
            | AnnotatedError::InvalidField { field_path, .. }
            | AnnotatedError::ConflictingValues { field_path, .. } => Some(field_path),
            AnnotatedError::UserError { .. } => None,
        }
    }

    /// Check if this error is a disagreement between rules.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AnnotatedError::ConflictingValues { .. })
    }
}

/// Result of one constraints run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// (workspace cwd, operations), only workspaces with operations
    pub all_workspace_operations: Vec<(String, Vec<Operation>)>,

    /// (workspace cwd, errors), only workspaces with errors
    pub all_workspace_errors: Vec<(String, Vec<AnnotatedError>)>,
}

impl Report {
    /// Check if any error was reported.
    pub fn has_errors(&self) -> bool {
        !self.all_workspace_errors.is_empty()
    }

    /// Total number of errors across workspaces.
    pub fn error_count(&self) -> usize {
        self.all_workspace_errors.iter().map(|(_, e)| e.len()).sum()
    }

    /// Total number of operations across workspaces.
    pub fn operation_count(&self) -> usize {
        self.all_workspace_operations
            .iter()
            .map(|(_, o)| o.len())
            .sum()
    }

    /// Get the operations for a workspace.
    pub fn operations_for(&self, cwd: &str) -> &[Operation] {
        self.all_workspace_operations
            .iter()
            .find(|(c, _)| c == cwd)
            .map(|(_, ops)| ops.as_slice())
            .unwrap_or_default()
    }

    /// Get the errors for a workspace.
    pub fn errors_for(&self, cwd: &str) -> &[AnnotatedError] {
        self.all_workspace_errors
            .iter()
            .find(|(c, _)| c == cwd)
            .map(|(_, errors)| errors.as_slice())
            .unwrap_or_default()
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
