//! Rules and rule sets.
//!
//! A rule inspects the project through [`Constraints`] and records what it
//! wants the manifests to look like. Rules run one after the other; while a
//! rule runs, its name is the method name attached to every call site it
//! records.

use anyhow::{Context, Result};
use tracing::debug;

use crate::constraints::context::Constraints;

/// A consistency rule.
pub trait Rule {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Record this rule's intents. An `Err` aborts the whole run.
    fn check(&self, cx: &Constraints<'_>) -> Result<()>;
}

/// A rule backed by a closure.
pub struct FnRule<F> {
    name: String,
    f: F,
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&Constraints<'_>) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, cx: &Constraints<'_>) -> Result<()> {
        (self.f)(cx)
    }
}

/// Build a rule from a closure.
pub fn rule_fn<F>(name: impl Into<String>, f: F) -> FnRule<F>
where
    F: Fn(&Constraints<'_>) -> Result<()>,
{
    FnRule {
        name: name.into(),
        f,
    }
}

/// An ordered collection of rules.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, returning the extended set.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.push(rule);
        self
    }

    /// Add a rule.
    pub fn push(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Append all rules of another set.
    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over rule names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }

    /// Run every rule against the context, in order.
    pub fn evaluate(&self, cx: &Constraints<'_>) -> Result<()> {
        let provenance = cx.recorder().provenance();

        for rule in &self.rules {
            let _scope = provenance.enter_rule(rule.name());
            debug!("evaluating rule `{}`", rule.name());
            rule.check(cx)
                .with_context(|| format!("rule `{}` failed", rule.name()))?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
