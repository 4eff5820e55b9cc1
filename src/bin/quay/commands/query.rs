//! `quay query` command

use anyhow::{Context, Result};

use crate::cli::QueryArgs;
use quay::ops::{format_row, load_project, parse_filter, query, EntityKind};
use quay::util::GlobalContext;

pub fn execute(args: QueryArgs, ctx: &GlobalContext) -> Result<()> {
    let filter = parse_filter(&args.filters)?;
    let snapshot = args.snapshot.unwrap_or_else(|| ctx.snapshot_path());
    let project = load_project(ctx.project_root(), &snapshot, ctx.config().manifest_name())?;

    let kind = EntityKind::from(args.kind);
    let rows = query(&project, kind, &filter);
    tracing::debug!("{} {} matched", rows.len(), kind);

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("failed to serialize results")?;
        println!("{}", json);
    } else {
        for row in &rows {
            println!("{}", format_row(kind, row));
        }
    }

    Ok(())
}
