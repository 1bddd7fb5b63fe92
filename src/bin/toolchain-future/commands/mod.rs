//! Command implementations

pub mod classify;
pub mod completions;
pub mod resolve;
pub mod run;
pub mod workflow;

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::cli::BuildArgs;
use toolchain_future::core::ResolvedVersion;
use toolchain_future::resolver::{ResolveError, VersionResolver};
use toolchain_future::sources::HttpVersionFeed;
use toolchain_future::util::diagnostic::emit;
use toolchain_future::BuildContext;

/// Load the build context and its resolver, seeding the original version.
pub fn load_build(args: &BuildArgs) -> Result<(BuildContext, Arc<VersionResolver>)> {
    let ctx = BuildContext::load(&args.root, &args.properties)?;
    let feed = Arc::new(HttpVersionFeed::new()?);
    let resolver = ctx.resolver(feed)?;

    if let Some(original) = &args.original {
        resolver.observe_original_version(original);
    }

    Ok((ctx, resolver))
}

/// Resolve, printing a full diagnostic on failure.
pub fn resolve_or_report(resolver: &VersionResolver, color: bool) -> Result<ResolvedVersion> {
    match resolver.resolve() {
        Ok(version) => Ok(version),
        Err(e) => {
            emit(&e.to_diagnostic(), color);
            match e {
                ResolveError::NoOriginalVersionFound => bail!("no Kotlin version to start from"),
                _ => bail!("could not resolve the Kotlin version"),
            }
        }
    }
}
