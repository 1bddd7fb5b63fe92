//! `toolchain-future run` command
//!
//! Runs an external command as one unit of work. Its stderr is echoed and
//! captured; a toolchain crash produces an ICE report.

use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

use super::{load_build, resolve_or_report};
use crate::cli::RunArgs;
use toolchain_future::core::{UnitFailure, UnitListener, UnitOutcome, WorkUnit};
use toolchain_future::util::diagnostic::{suggestions, IceDetected};
use toolchain_future::util::properties::Properties;

pub fn execute(args: RunArgs, color: bool) -> Result<()> {
    let (ctx, resolver) = load_build(&args.build)?;

    let (program, program_args) = match args.command.split_first() {
        Some(split) => split,
        None => bail!("no command given"),
    };

    let mut unit = WorkUnit::new(
        unit_name(&args.task),
        args.task.as_str(),
        args.project_name
            .as_deref()
            .unwrap_or(ctx.root_project_name()),
        ctx.root_dir(),
    );
    for input in &args.inputs {
        let (name, value) = Properties::parse_assignment(input)?;
        unit = unit.with_input(name, value);
    }

    // Surface resolution failures before running anything.
    if resolver.is_future() {
        let version = resolve_or_report(&resolver, color)?;
        tracing::info!("Running {} with Kotlin {}", unit.path(), version);
    }

    let listener = ctx.ice_listener(resolver.clone());
    if listener.is_none() {
        tracing::debug!("Not in future mode, ICE detection is off");
    }

    if let Some(listener) = &listener {
        listener.on_unit_start(&unit);
    }

    let mut child = Command::new(program)
        .args(program_args)
        .current_dir(ctx.root_dir())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to run `{}`", program))?;

    if let Some(stderr) = child.stderr.take() {
        let forwarded = forward_lines(BufReader::new(stderr), |chunk| {
            eprint!("{}", chunk);
            if let Some(listener) = &listener {
                listener.on_unit_output(&unit, chunk);
            }
        });
        if let Err(e) = forwarded {
            tracing::warn!("Stopped reading output of `{}`: {}", program, e);
        }
    }

    let status = child
        .wait()
        .with_context(|| format!("failed to wait for `{}`", program))?;

    let outcome = if status.success() {
        UnitOutcome::Success
    } else {
        UnitOutcome::Failed(UnitFailure::new(format!(
            "Execution failed for task '{}': `{}` exited with {}",
            unit.path(),
            program,
            status
        )))
    };

    if let Some(listener) = &listener {
        listener.on_unit_complete(&unit, &outcome);
        for files in listener.reports() {
            let report = miette::Report::new(IceDetected {
                task: unit.path().to_string(),
                report: files.text.display().to_string(),
            });
            eprintln!("{:?}", report);
            eprintln!("help: {}", suggestions::ICE_REPORT);
        }
    }

    if let Some(failure) = outcome.failure() {
        bail!("{}", failure);
    }

    Ok(())
}

/// Pass each line of `reader` to `sink`, newline included. Bytes that are
/// not UTF-8 are replaced rather than ending the stream.
fn forward_lines(mut reader: impl BufRead, mut sink: impl FnMut(&str)) -> io::Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        sink(&String::from_utf8_lossy(&line));
    }
}

/// Last segment of a task path.
fn unit_name(task: &str) -> &str {
    task.rsplit(':').next().unwrap_or(task)
}
