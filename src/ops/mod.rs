//! High-level operations.
//!
//! This module contains the implementation of Quay commands.

pub mod constraints;
pub mod format;
pub mod query;

pub use constraints::{evaluate, load_project, run, ConstraintsOptions, ProjectPaths};
pub use format::{diagnostic_for, empty_rules_warning, format_operation, format_report};
pub use query::{format_row, parse_filter, query, EntityKind};
