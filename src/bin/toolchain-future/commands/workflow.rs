//! `toolchain-future workflow` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::{WorkflowArgs, WorkflowKind};
use toolchain_future::ops::workflow::parse_schedule;
use toolchain_future::util::diagnostic::{emit, Diagnostic};
use toolchain_future::util::fs::read_to_string;
use toolchain_future::BuildContext;

pub fn execute(args: WorkflowArgs, color: bool) -> Result<()> {
    let ctx = BuildContext::load(&args.root, &[])?;

    // CLI flags override [workflow] config
    let mut generator = ctx.workflow_generator()?.with_force(args.force);
    if let Some(jdk) = args.jdk {
        generator = generator.with_jdk(jdk);
    }
    if !args.runners.is_empty() {
        generator = generator.with_runners(args.runners)?;
    }
    if args.branch.is_some() {
        generator = generator.with_branch(args.branch);
    }
    if let Some(schedule) = &args.schedule {
        generator = generator.with_scheduling(parse_schedule(schedule)?);
    }
    if args.no_report {
        generator = generator.with_report_ices(false);
    }

    if !args.common.is_empty() {
        let commands: Vec<&str> = args.common.iter().map(String::as_str).collect();
        generator.common_commands(&commands, None, None);
    }

    let suffix = Some(args.suffix.as_str());
    let written: Vec<PathBuf> = if let Some(path) = &args.steps {
        let steps = read_to_string(path)?;
        match args.kind {
            WorkflowKind::Bootstrap => generator.bootstrap_custom(&steps, suffix)?.into_iter().collect(),
            WorkflowKind::Eap => generator.eap_custom(&steps, suffix)?.into_iter().collect(),
            WorkflowKind::Both => generator.both_custom(&steps, suffix)?,
        }
    } else if !args.run.is_empty() {
        let commands: Vec<&str> = args.run.iter().map(String::as_str).collect();
        match args.kind {
            WorkflowKind::Bootstrap => generator.bootstrap_commands(&commands, suffix)?.into_iter().collect(),
            WorkflowKind::Eap => generator.eap_commands(&commands, suffix)?.into_iter().collect(),
            WorkflowKind::Both => generator.both_commands(&commands, suffix)?,
        }
    } else {
        let gradle = Some(args.gradle.as_str());
        match args.kind {
            WorkflowKind::Bootstrap => generator.bootstrap(gradle, suffix)?.into_iter().collect(),
            WorkflowKind::Eap => generator.eap(gradle, suffix)?.into_iter().collect(),
            WorkflowKind::Both => generator.both(gradle, suffix)?,
        }
    };

    if written.is_empty() {
        let warning = Diagnostic::warning("workflow files already exist, nothing written")
            .with_suggestion("Pass `--force` to overwrite them");
        emit(&warning, color);
    }
    for path in &written {
        println!("{}", path.display());
    }

    Ok(())
}
