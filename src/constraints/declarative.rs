//! Rules written as TOML instead of Rust.
//!
//! A rules file is a list of `[[rule]]` tables:
//!
//! ```toml
//! [[rule]]
//! kind = "field"
//! field = "license"
//! value = "MIT"
//! workspaces = "packages/*"
//!
//! [[rule]]
//! kind = "forbid-dependency"
//! ident = "left-pad"
//! ```
//!
//! Every mutation a declarative rule records is attributed to the position
//! of the rule's `[[rule]]` header in the file.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use glob::Pattern;
use miette::NamedSource;
use serde::Deserialize;
use serde_json::Value;

use crate::constraints::context::{Constraints, DependencyRef, WorkspaceRef};
use crate::constraints::provenance::Caller;
use crate::constraints::rules::{Rule, RuleSet};
use crate::core::{DependencyType, FieldPath, Filter};
use crate::util::diagnostic::RulesFileError;

/// Default rules file name.
pub const RULES_FILE_NAME: &str = "constraints.toml";

/// Default range required by `workspace-protocol`.
pub const DEFAULT_WORKSPACE_RANGE: &str = "workspace:^";

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default, rename = "rule")]
    rules: Vec<RuleSpec>,
}

/// One `[[rule]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuleSpec {
    /// Set `field` to `value`, or unset it when `value` is omitted
    Field {
        field: String,
        #[serde(default)]
        value: Option<Value>,
        #[serde(default)]
        workspaces: Option<String>,
    },

    /// Report an error when `field` is missing
    RequireField {
        field: String,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        workspaces: Option<String>,
    },

    /// Pin dependencies on `ident` to `range`
    DependencyRange {
        ident: String,
        range: String,
        #[serde(default)]
        types: Option<Vec<DependencyType>>,
        #[serde(default)]
        workspaces: Option<String>,
    },

    /// Require one range per dependency ident across the repository
    ConsistentDependencies {
        #[serde(default = "match_all")]
        ident: String,
        #[serde(default)]
        workspaces: Option<String>,
    },

    /// Remove dependencies on `ident`, or report `message` instead
    ForbidDependency {
        ident: String,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        types: Option<Vec<DependencyType>>,
        #[serde(default)]
        workspaces: Option<String>,
    },

    /// Require dependencies on workspace packages to use `range`
    WorkspaceProtocol {
        #[serde(default = "default_workspace_range")]
        range: String,
        #[serde(default)]
        types: Option<Vec<DependencyType>>,
        #[serde(default)]
        workspaces: Option<String>,
    },
}

fn match_all() -> String {
    "*".to_string()
}

fn default_workspace_range() -> String {
    DEFAULT_WORKSPACE_RANGE.to_string()
}

impl RuleSpec {
    /// The `kind` this entry was declared with.
    pub fn kind(&self) -> &'static str {
        match self {
            RuleSpec::Field { .. } => "field",
            RuleSpec::RequireField { .. } => "require-field",
            RuleSpec::DependencyRange { .. } => "dependency-range",
            RuleSpec::ConsistentDependencies { .. } => "consistent-dependencies",
            RuleSpec::ForbidDependency { .. } => "forbid-dependency",
            RuleSpec::WorkspaceProtocol { .. } => "workspace-protocol",
        }
    }

    fn workspaces(&self) -> Option<&str> {
        match self {
            RuleSpec::Field { workspaces, .. }
            | RuleSpec::RequireField { workspaces, .. }
            | RuleSpec::DependencyRange { workspaces, .. }
            | RuleSpec::ConsistentDependencies { workspaces, .. }
            | RuleSpec::ForbidDependency { workspaces, .. }
            | RuleSpec::WorkspaceProtocol { workspaces, .. } => workspaces.as_deref(),
        }
    }

    /// Ident pattern, for the kinds that match idents with a glob.
    fn ident_pattern(&self) -> Option<&str> {
        match self {
            RuleSpec::ConsistentDependencies { ident, .. }
            | RuleSpec::ForbidDependency { ident, .. } => Some(ident),
            _ => None,
        }
    }

    fn types(&self) -> Option<&[DependencyType]> {
        match self {
            RuleSpec::DependencyRange { types, .. }
            | RuleSpec::ForbidDependency { types, .. }
            | RuleSpec::WorkspaceProtocol { types, .. } => types.as_deref(),
            _ => None,
        }
    }
}

/// A rule loaded from a rules file.
#[derive(Debug, Clone)]
pub struct DeclarativeRule {
    spec: RuleSpec,
    scope: Option<Pattern>,
    ident: Option<Pattern>,
    caller: Caller,
}

impl DeclarativeRule {
    /// Get the parsed entry.
    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    /// Get the position this rule was declared at.
    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    fn in_scope(&self, cwd: &str) -> bool {
        self.scope.as_ref().map_or(true, |p| p.matches(cwd))
    }

    fn matches_ident(&self, ident: &str) -> bool {
        self.ident.as_ref().map_or(true, |p| p.matches(ident))
    }

    fn types(&self, default: &[DependencyType]) -> Vec<DependencyType> {
        self.spec
            .types()
            .map(<[DependencyType]>::to_vec)
            .unwrap_or_else(|| default.to_vec())
    }

    fn scoped_workspaces<'c>(&self, cx: &'c Constraints<'c>) -> Vec<WorkspaceRef<'c>> {
        cx.workspaces(&Filter::new())
            .into_iter()
            .filter(|ws| self.in_scope(ws.cwd()))
            .collect()
    }

    fn scoped_dependencies<'c>(
        &self,
        cx: &'c Constraints<'c>,
        types: &[DependencyType],
    ) -> Vec<DependencyRef<'c>> {
        types
            .iter()
            .flat_map(|kind| cx.dependencies(&Filter::new().eq("type", *kind)))
            .filter(|dep| self.in_scope(dep.entity().workspace()))
            .collect()
    }
}

impl Rule for DeclarativeRule {
    fn name(&self) -> &str {
        self.spec.kind()
    }

    fn check(&self, cx: &Constraints<'_>) -> Result<()> {
        let cx = cx.with_caller(self.caller.clone());
        let cx = &cx;

        match &self.spec {
            RuleSpec::Field { field, value, .. } => {
                let path = FieldPath::parse(field);
                for ws in self.scoped_workspaces(cx) {
                    match value {
                        Some(value) => ws.set(path.clone(), value.clone()),
                        None => ws.unset(path.clone()),
                    }
                }
            }

            RuleSpec::RequireField { field, message, .. } => {
                let path = FieldPath::parse(field);
                for ws in self.scoped_workspaces(cx) {
                    if ws.get(path.clone()).is_none() {
                        ws.error(
                            message
                                .clone()
                                .unwrap_or_else(|| format!("missing required field `{}`", path)),
                        );
                    }
                }
            }

            RuleSpec::DependencyRange { ident, range, .. } => {
                for dep in self.scoped_dependencies(cx, &self.types(&DependencyType::REGULAR)) {
                    if dep.ident() == ident.as_str() {
                        dep.update(range.as_str());
                    }
                }
            }

            RuleSpec::ConsistentDependencies { .. } => {
                let mut by_ident: BTreeMap<&str, Vec<DependencyRef<'_>>> = BTreeMap::new();
                for dep in self.scoped_dependencies(cx, &DependencyType::REGULAR) {
                    if self.matches_ident(dep.ident()) {
                        by_ident.entry(dep.entity().ident()).or_default().push(dep);
                    }
                }

                for deps in by_ident.values() {
                    let mut ranges: Vec<&str> = Vec::new();
                    for dep in deps {
                        let range = dep.entity().range();
                        if !ranges.contains(&range) {
                            ranges.push(range);
                        }
                    }
                    for dep in deps {
                        for range in &ranges {
                            dep.update(*range);
                        }
                    }
                }
            }

            RuleSpec::ForbidDependency { message, .. } => {
                for dep in self.scoped_dependencies(cx, &self.types(&DependencyType::ALL)) {
                    if !self.matches_ident(dep.ident()) {
                        continue;
                    }
                    match message {
                        Some(message) => dep.error(message.clone()),
                        None => dep.delete(),
                    }
                }
            }

            RuleSpec::WorkspaceProtocol { range, .. } => {
                for dep in self.scoped_dependencies(cx, &self.types(&DependencyType::REGULAR)) {
                    let is_workspace = dep
                        .resolution()
                        .is_some_and(|pkg| pkg.entity().workspace().is_some());
                    if is_workspace {
                        dep.update(range.as_str());
                    }
                }
            }
        }

        Ok(())
    }
}

/// Parse a rules file into a rule set.
///
/// `file_name` is used both in error reports and as the file of every
/// recorded caller.
pub fn parse_rules(source: &str, file_name: &str) -> Result<RuleSet, RulesFileError> {
    let named = || NamedSource::new(file_name, source.to_string());

    let file: RulesFile = toml::from_str(source).map_err(|e| RulesFileError::Parse {
        message: e.message().to_string(),
        src: named(),
        span: e.span().map(Into::into),
    })?;

    let mut headers = rule_headers(source);
    if headers.len() != file.rules.len() {
        // mixed inline arrays and headers; positions cannot be matched up
        headers.clear();
    }
    let mut rules = RuleSet::new();
    for (i, spec) in file.rules.into_iter().enumerate() {
        // inline `rule = [...]` arrays have no header; attribute them to the file start
        let span = headers.get(i).cloned().unwrap_or(0..0);

        let compile = |pattern: Option<&str>| -> Result<Option<Pattern>, RulesFileError> {
            pattern
                .map(|p| {
                    Pattern::new(p).map_err(|e| RulesFileError::InvalidPattern {
                        pattern: p.to_string(),
                        reason: e.msg.to_string(),
                        src: named(),
                        span: Some(span.clone().into()),
                    })
                })
                .transpose()
        };
        let scope = compile(spec.workspaces())?;
        let ident = compile(spec.ident_pattern())?;

        let (line, column) = line_column(source, span.start);
        let caller = Caller::new(file_name, spec.kind(), line, column);

        rules.push(DeclarativeRule {
            spec,
            scope,
            ident,
            caller,
        });
    }

    Ok(rules)
}

/// Load and parse a rules file.
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file: {}", path.display()))?;
    let rules = parse_rules(&source, &path.display().to_string())?;
    Ok(rules)
}

/// Byte ranges of the `[[rule]]` headers, in file order.
///
/// Lines inside multi-line strings are skipped.
fn rule_headers(source: &str) -> Vec<Range<usize>> {
    let mut headers = Vec::new();
    let mut offset = 0;
    let mut open: Option<&str> = None;

    for line in source.split_inclusive('\n') {
        if open.is_none() {
            let content = line.split('#').next().unwrap_or_default();
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            if compact == "[[rule]]" {
                let indent = content.len() - content.trim_start().len();
                let start = offset + indent;
                headers.push(start..start + content.trim().len());
            }
        }
        open = multiline_state(line, open);
        offset += line.len();
    }

    headers
}

/// Multi-line string delimiter still open after `line`.
fn multiline_state<'d>(line: &str, mut open: Option<&'d str>) -> Option<&'d str> {
    let mut rest = line;
    loop {
        match open {
            Some(delim) => match rest.find(delim) {
                Some(at) => {
                    rest = &rest[at + delim.len()..];
                    open = None;
                }
                None => return open,
            },
            None => {
                let next = ["\"\"\"", "'''"]
                    .into_iter()
                    .filter_map(|delim| rest.find(delim).map(|at| (at, delim)))
                    .min_by_key(|(at, _)| *at);
                match next {
                    Some((at, delim)) if !rest[..at].contains('#') => {
                        rest = &rest[at + delim.len()..];
                        open = Some(delim);
                    }
                    _ => return None,
                }
            }
        }
    }
}

/// 1-based line and column of a byte offset.
fn line_column(source: &str, offset: usize) -> (u32, u32) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
        + 1;
    (line as u32, column as u32)
}
