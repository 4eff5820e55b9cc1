//! Quay CLI - Cross-workspace manifest constraints

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quay::util::{GlobalContext, RulesFileError};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        match e.downcast::<RulesFileError>() {
            Ok(rules_error) => eprintln!("{:?}", miette::Report::new(rules_error)),
            Err(e) => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    let context = || -> Result<GlobalContext> {
        let mut ctx = GlobalContext::new().context("failed to create global context")?;
        ctx.set_verbose(cli.verbose);
        ctx.set_color(!cli.no_color);
        Ok(ctx)
    };

    match cli.command {
        Commands::Constraints(args) => commands::constraints::execute(args, &context()?),
        Commands::Query(args) => commands::query::execute(args, &context()?),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
