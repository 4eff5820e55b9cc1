//! Human-readable rendering of constraint reports.

use std::path::Path;

use serde_json::Value;

use crate::constraints::{AnnotatedError, Caller, Operation, Report};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Build the diagnostic for one reported error.
pub fn diagnostic_for(cwd: &str, error: &AnnotatedError) -> Diagnostic {
    match error {
        AnnotatedError::MissingField {
            field_path,
            expected,
        } => Diagnostic::error(format!("{}: missing field `{}`", cwd, field_path))
            .with_context(format!("expected {}", expected)),

        AnnotatedError::ExtraneousField {
            field_path,
            current_value,
        } => Diagnostic::error(format!("{}: extraneous field `{}`", cwd, field_path))
            .with_context(format!("currently {}", current_value)),

        AnnotatedError::InvalidField {
            field_path,
            expected,
            current_value,
        } => Diagnostic::error(format!("{}: invalid field `{}`", cwd, field_path))
            .with_context(format!("expected {}", expected))
            .with_context(format!("found {}", current_value)),

        AnnotatedError::ConflictingValues {
            field_path,
            set_values,
            unset_values,
        } => {
            let mut diag =
                Diagnostic::error(format!("{}: conflicting values for `{}`", cwd, field_path));
            for (value, callers) in set_values {
                diag = diag.with_context(proposal(&value.to_string(), callers));
            }
            if let Some(callers) = unset_values {
                diag = diag.with_context(proposal("unset", callers));
            }
            diag.with_suggestion(suggestions::CONFLICT)
        }

        AnnotatedError::UserError { message } => {
            Diagnostic::error(format!("{}: {}", cwd, message))
        }
    }
}

fn proposal(what: &str, callers: &[Caller]) -> String {
    if callers.is_empty() {
        return what.to_string();
    }
    let callers: Vec<String> = callers.iter().map(Caller::to_string).collect();
    format!("{} from {}", what, callers.join(", "))
}

/// Warning for a rules file that defines nothing, so every run passes.
pub fn empty_rules_warning(rules_path: &Path) -> Diagnostic {
    Diagnostic::warning("no rules defined; nothing was checked")
        .with_location(rules_path.to_path_buf())
        .with_suggestion(suggestions::EMPTY_RULES)
}

/// Render one operation.
pub fn format_operation(op: &Operation) -> String {
    match op {
        Operation::Set { path, value } => format!("set {} = {}", path, compact(value)),
        Operation::Unset { path } => format!("unset {}", path),
    }
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Render a whole report for the terminal.
pub fn format_report(report: &Report, fix: bool, color: bool) -> String {
    let mut output = String::new();

    for (cwd, operations) in &report.all_workspace_operations {
        output.push_str(&format!("{}:\n", cwd));
        for op in operations {
            output.push_str(&format!("  {}\n", format_operation(op)));
        }
    }
    if !report.all_workspace_operations.is_empty() && report.has_errors() {
        output.push('\n');
    }

    for (cwd, errors) in &report.all_workspace_errors {
        for error in errors {
            output.push_str(&diagnostic_for(cwd, error).format(color));
        }
    }

    let fixable = report
        .all_workspace_errors
        .iter()
        .flat_map(|(_, errors)| errors)
        .any(|e| e.field_path().is_some() && !e.is_conflict());
    if !fix && fixable {
        output.push('\n');
        output.push_str(
            &Diagnostic::note("some errors can be fixed automatically")
                .with_suggestion(suggestions::RUN_FIX)
                .format(color),
        );
    }

    output.push_str(&summary(report, fix));
    output
}

fn summary(report: &Report, fix: bool) -> String {
    let errors = report.error_count();
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{} {}", n, word)
        } else {
            format!("{} {}s", n, word)
        }
    };

    if fix {
        format!(
            "{}, {}\n",
            plural(report.operation_count(), "operation"),
            plural(errors, "error")
        )
    } else if errors == 0 {
        "all constraints satisfied\n".to_string()
    } else {
        format!("{}\n", plural(errors, "error"))
    }
}
