//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use quay::ops::EntityKind;

/// Quay - Cross-workspace manifest constraints for multi-package repositories
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check workspace manifests against the rules file
    Constraints(ConstraintsArgs),

    /// List workspaces, packages or dependencies of the snapshot
    Query(QueryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ConstraintsArgs {
    /// Print the operations that would fix the manifests
    #[arg(long)]
    pub fix: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Snapshot file (defaults to .quay/snapshot.json)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Rules file (defaults to constraints.toml)
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// What to list
    #[arg(value_enum)]
    pub kind: QueryKind,

    /// Only list entities where FIELD equals VALUE (an empty VALUE matches null)
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Snapshot file (defaults to .quay/snapshot.json)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum QueryKind {
    Workspaces,
    Packages,
    Dependencies,
}

impl From<QueryKind> for EntityKind {
    fn from(kind: QueryKind) -> Self {
        match kind {
            QueryKind::Workspaces => EntityKind::Workspaces,
            QueryKind::Packages => EntityKind::Packages,
            QueryKind::Dependencies => EntityKind::Dependencies,
        }
    }
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
