//! `toolchain-future classify` command

use std::io::Read;

use anyhow::{Context, Result};

use crate::cli::ClassifyArgs;
use toolchain_future::core::UnitFailure;
use toolchain_future::ice::IceClassifier;
use toolchain_future::util::fs::read_to_string;

pub fn execute(args: ClassifyArgs) -> Result<()> {
    let stderr = match &args.stderr {
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stderr from stdin")?;
            buf
        }
        Some(path) => read_to_string(path)?,
        None => String::new(),
    };

    // Innermost cause first, then wrap outwards.
    let mut failure: Option<UnitFailure> = None;
    for message in args.causes.iter().rev() {
        let next = UnitFailure::new(message.as_str());
        failure = Some(match failure {
            Some(inner) => next.with_cause(inner),
            None => next,
        });
    }
    let failure = match failure {
        Some(cause) => UnitFailure::new(args.message.as_str()).with_cause(cause),
        None => UnitFailure::new(args.message.as_str()),
    };

    let classifier = IceClassifier::new();
    if classifier.classify(&failure, &stderr, &args.unit) {
        println!("internal compiler error");
    } else {
        println!("not an internal compiler error");
    }

    Ok(())
}
