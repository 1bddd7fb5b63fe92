//! toolchain-future CLI - test builds against future Kotlin toolchains

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("toolchain_future=debug")
    } else {
        EnvFilter::new("toolchain_future=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color;

    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, color),
        Commands::Run(args) => commands::run::execute(args, color),
        Commands::Classify(args) => commands::classify::execute(args),
        Commands::Workflow(args) => commands::workflow::execute(args, color),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
