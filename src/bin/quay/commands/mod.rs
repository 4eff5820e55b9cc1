//! Command implementations

pub mod completions;
pub mod constraints;
pub mod query;
