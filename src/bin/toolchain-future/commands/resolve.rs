//! `toolchain-future resolve` command

use anyhow::{Context, Result};

use super::{load_build, resolve_or_report};
use crate::cli::{OutputFormat, ResolveArgs};

pub fn execute(args: ResolveArgs, color: bool) -> Result<()> {
    let (_ctx, resolver) = load_build(&args.build)?;
    tracing::debug!("Requested: {}", resolver.request());

    let version = resolve_or_report(&resolver, color)?;

    match args.format {
        OutputFormat::Properties => print!("{}", version.to_properties()),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&version)
                .context("failed to serialize resolved version")?;
            println!("{}", json);
        }
    }

    Ok(())
}
