//! Implementation of `quay query`.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde_json::{json, Value};

use crate::core::{FieldValue, Filter, Project};

/// Which index a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Workspaces,
    Packages,
    Dependencies,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Workspaces => write!(f, "workspaces"),
            EntityKind::Packages => write!(f, "packages"),
            EntityKind::Dependencies => write!(f, "dependencies"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "workspaces" | "workspace" => Ok(EntityKind::Workspaces),
            "packages" | "package" => Ok(EntityKind::Packages),
            "dependencies" | "dependency" => Ok(EntityKind::Dependencies),
            _ => Err(format!("unknown entity kind: {}", s)),
        }
    }
}

/// Parse `FIELD=VALUE` arguments into a filter.
///
/// `FIELD=` (empty value) matches entities where the field is null, such as
/// an unresolved dependency's `resolution`.
pub fn parse_filter(args: &[String]) -> Result<Filter> {
    let mut filter = Filter::new();
    for arg in args {
        let Some((field, value)) = arg.split_once('=') else {
            bail!("invalid filter `{}`: expected FIELD=VALUE", arg);
        };
        if field.is_empty() {
            bail!("invalid filter `{}`: missing field name", arg);
        }
        filter = if value.is_empty() {
            filter.eq(field, FieldValue::Null)
        } else {
            filter.eq(field, value)
        };
    }
    Ok(filter)
}

/// Find the entities of `kind` matching `filter`, as JSON objects.
pub fn query(project: &Project, kind: EntityKind, filter: &Filter) -> Vec<Value> {
    match kind {
        EntityKind::Workspaces => project
            .workspaces()
            .find(filter)
            .into_iter()
            .map(|ws| json!({ "cwd": ws.cwd(), "ident": ws.ident() }))
            .collect(),
        EntityKind::Packages => project
            .packages()
            .find(filter)
            .into_iter()
            .map(|pkg| {
                json!({
                    "locator": pkg.locator(),
                    "ident": pkg.ident(),
                    "workspace": pkg.workspace(),
                    "version": pkg.version(),
                })
            })
            .collect(),
        EntityKind::Dependencies => project
            .dependencies()
            .find(filter)
            .into_iter()
            .map(|dep| {
                json!({
                    "workspace": dep.workspace(),
                    "type": dep.kind().as_str(),
                    "ident": dep.ident(),
                    "range": dep.range(),
                    "resolution": dep.resolution(),
                })
            })
            .collect(),
    }
}

/// Render one query result as a terminal line.
pub fn format_row(kind: EntityKind, row: &Value) -> String {
    let field = |name: &str| row.get(name).and_then(Value::as_str).unwrap_or("-");

    match kind {
        EntityKind::Workspaces => format!("{}  {}", field("cwd"), field("ident")),
        EntityKind::Packages => format!("{}  {}", field("locator"), field("version")),
        EntityKind::Dependencies => format!(
            "{}  {}  {}@{} -> {}",
            field("workspace"),
            field("type"),
            field("ident"),
            field("range"),
            field("resolution")
        ),
    }
}
