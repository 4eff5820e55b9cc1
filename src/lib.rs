//! Quay - cross-workspace manifest constraints for multi-package repositories
//!
//! This crate provides the constraints engine: it hydrates a repository
//! snapshot into queryable indexes, runs rules that record the manifest
//! state they want, and reconciles those intents into a report of fixes
//! and errors.

pub mod constraints;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for Quay unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides snapshot builders and on-disk project
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use constraints::{
    AnnotatedError, Caller, Constraints, Operation, Report, Rule, RuleSet,
};
pub use core::{Dependency, DependencyType, Filter, Package, Project, Snapshot, Workspace};
pub use util::context::GlobalContext;
