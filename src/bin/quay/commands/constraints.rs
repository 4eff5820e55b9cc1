//! `quay constraints` command

use anyhow::{Context, Result};

use crate::cli::ConstraintsArgs;
use quay::constraints::load_rules;
use quay::ops::{empty_rules_warning, evaluate, format_report, load_project, ConstraintsOptions, ProjectPaths};
use quay::util::diagnostic::{emit, suggestions, Diagnostic};
use quay::util::{GlobalContext, OutputFormat};

pub fn execute(args: ConstraintsArgs, ctx: &GlobalContext) -> Result<()> {
    let paths = ProjectPaths::from_context(ctx)
        .with_snapshot(args.snapshot)
        .with_rules(args.rules);

    if !paths.rules.exists() {
        emit(
            &Diagnostic::error(format!("no rules file at {}", paths.rules.display()))
                .with_suggestion(suggestions::NO_RULES),
            ctx.color(),
        );
        std::process::exit(1);
    }
    if !paths.snapshot.exists() {
        emit(
            &Diagnostic::error(format!("no snapshot at {}", paths.snapshot.display()))
                .with_suggestion(suggestions::NO_SNAPSHOT),
            ctx.color(),
        );
        std::process::exit(1);
    }

    let opts = ConstraintsOptions {
        fix: args.fix,
        provenance: ctx.config().provenance(),
    };
    let project = load_project(&paths.root, &paths.snapshot, &paths.manifest_name)?;
    let rules = load_rules(&paths.rules)?;
    if rules.is_empty() {
        emit(&empty_rules_warning(&paths.rules), ctx.color());
    }
    let report = evaluate(&project, &rules, &opts)?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        ctx.config().format()
    };
    match format {
        OutputFormat::Json => {
            let json = report.to_json_pretty().context("failed to serialize report")?;
            println!("{}", json);
        }
        OutputFormat::Human => print!("{}", format_report(&report, args.fix, ctx.color())),
    }

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
