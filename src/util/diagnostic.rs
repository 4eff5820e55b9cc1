//! User-facing diagnostic messages.
//!
//! Constraint errors are reported, not raised: each one becomes a
//! [`Diagnostic`] naming the workspace, what is wrong, and which rules are
//! involved. Problems in the rules file itself are `miette` diagnostics that
//! point into the file.

use std::fmt;
use std::path::PathBuf;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when check mode finds fixable errors.
    pub const RUN_FIX: &str = "help: Run `quay constraints --fix` to see the required changes";

    /// Suggestion when two rules disagree.
    pub const CONFLICT: &str =
        "help: Make the rules agree, or narrow one of them with a `workspaces` pattern";

    /// Suggestion when no rules file is found.
    pub const NO_RULES: &str = "help: Create a `constraints.toml` at the project root";

    /// Suggestion when the rules file defines no rules.
    pub const EMPTY_RULES: &str = "help: Add a `[[rule]]` entry with a `kind` to the rules file";

    /// Suggestion when no snapshot is found.
    pub const NO_SNAPSHOT: &str =
        "help: Export the project snapshot to `.quay/snapshot.json` or pass `--snapshot`";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (workspace directory or file)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    /// Create a new note.
    pub fn note(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Note, message)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  → {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Problems with the rules file.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RulesFileError {
    #[error("failed to parse rules file: {message}")]
    #[diagnostic(
        code(quay::rules::parse),
        help("Each rule is a `[[rule]]` table with a `kind` key")
    )]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("invalid pattern `{pattern}`: {reason}")]
    #[diagnostic(
        code(quay::rules::pattern),
        help("Patterns use glob syntax, e.g. `packages/*` or `@scope/*`")
    )]
    InvalidPattern {
        pattern: String,
        reason: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("in this rule")]
        span: Option<SourceSpan>,
    },
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("packages/pkg-a: conflicting values for `license`")
            .with_context("\"MIT\" from constraints.toml:1:1 (field)")
            .with_context("\"ISC\" from constraints.toml:5:1 (field)")
            .with_suggestion(suggestions::CONFLICT)
            .with_location("packages/pkg-a");

        let output = diag.format(false);
        assert!(output.starts_with("error: packages/pkg-a: conflicting values"));
        assert!(output.contains("  --> packages/pkg-a\n"));
        assert!(output.contains("  → \"ISC\" from constraints.toml:5:1 (field)"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. help: Make the rules agree"));
    }

    #[test]
    fn test_colored_severity() {
        let output = Diagnostic::warning("careful").format(true);
        assert!(output.starts_with("\x1b[1;33mwarning\x1b[0m: careful"));
        assert_eq!(Diagnostic::note("fyi").to_string(), "note: fyi\n");
    }
}
