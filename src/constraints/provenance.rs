//! Provenance of recorded mutations.
//!
//! Every value a rule proposes remembers who proposed it, so a conflict can
//! be reported as "this rule wants X, that rule wants Y". The call site comes
//! from `#[track_caller]` on the rule-facing write methods; the function name
//! is the rule currently being evaluated, which the orchestrator publishes
//! through [`ProvenanceTracker::enter_rule`]. Rules that don't live in Rust
//! source (declarative rules) pass an explicit [`Caller`] instead.

use std::cell::RefCell;
use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Method name used when a mutation is recorded outside of any rule.
pub const ANONYMOUS: &str = "<anonymous>";

/// Where a mutation was requested from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    /// Source file; `None` for callers without a file (built-in logic)
    pub file: Option<String>,

    /// Rule or function name
    pub method_name: String,

    /// 1-based line
    pub line: u32,

    /// 1-based column
    pub column: u32,
}

impl Caller {
    /// Create a caller with a file location.
    pub fn new(file: impl Into<String>, method_name: impl Into<String>, line: u32, column: u32) -> Self {
        Caller {
            file: Some(file.into()),
            method_name: method_name.into(),
            line,
            column,
        }
    }

    /// Create a caller that has no source file.
    pub fn native(method_name: impl Into<String>) -> Self {
        Caller {
            file: None,
            method_name: method_name.into(),
            line: 0,
            column: 0,
        }
    }

    /// Create a caller from a Rust call site.
    pub fn from_location(location: &Location<'_>, method_name: impl Into<String>) -> Self {
        Caller::new(location.file(), method_name, location.line(), location.column())
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(
                f,
                "{}:{}:{} ({})",
                file, self.line, self.column, self.method_name
            ),
            None => write!(f, "<native> ({})", self.method_name),
        }
    }
}

/// How the caller of a single mutation should be determined.
#[derive(Debug, Clone)]
pub enum Provenance {
    /// Rust call site of the write, attributed to the current rule
    Tracked(&'static Location<'static>),

    /// Explicitly supplied caller
    Override(Caller),

    /// Record the mutation without any caller
    Suppressed,
}

impl Provenance {
    /// Capture the call site of the caller of the current function.
    #[track_caller]
    pub fn here() -> Self {
        Provenance::Tracked(Location::caller())
    }
}

/// Resolves [`Provenance`] into [`Caller`]s.
#[derive(Debug)]
pub struct ProvenanceTracker {
    enabled: bool,
    current_rule: RefCell<Option<String>>,
}

impl ProvenanceTracker {
    /// Create a tracker. A disabled tracker never resolves a caller.
    pub fn new(enabled: bool) -> Self {
        ProvenanceTracker {
            enabled,
            current_rule: RefCell::new(None),
        }
    }

    /// Check if callers are being recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Mark `name` as the rule being evaluated until the guard is dropped.
    pub fn enter_rule(&self, name: impl Into<String>) -> RuleScope<'_> {
        let previous = self.current_rule.replace(Some(name.into()));
        RuleScope {
            tracker: self,
            previous,
        }
    }

    /// Get the name of the rule being evaluated.
    pub fn current_rule(&self) -> Option<String> {
        self.current_rule.borrow().clone()
    }

    /// Resolve the caller of a mutation.
    pub fn resolve(&self, provenance: Provenance) -> Option<Caller> {
        if !self.enabled {
            return None;
        }

        match provenance {
            Provenance::Tracked(location) => {
                let rule = self.current_rule();
                Some(Caller::from_location(
                    location,
                    rule.as_deref().unwrap_or(ANONYMOUS),
                ))
            }
            Provenance::Override(caller) => Some(caller),
            Provenance::Suppressed => None,
        }
    }
}

impl Default for ProvenanceTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Restores the previously active rule name on drop.
#[must_use]
pub struct RuleScope<'a> {
    tracker: &'a ProvenanceTracker,
    previous: Option<String>,
}

impl Drop for RuleScope<'_> {
    fn drop(&mut self) {
        *self.tracker.current_rule.borrow_mut() = self.previous.take();
    }
}
