//! User-friendly diagnostic messages.
//!
//! Errors carry their root cause, the versions involved, and suggested
//! fixes. Config parse errors point at the offending span.

use std::fmt;
use std::path::Path;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion for version feed failures.
    pub const FETCH_FAILED: &str =
        "Check your network connection, or request an exact version instead of `latest`";

    /// Suggestion when no toolchain version was declared.
    pub const NO_ORIGINAL_VERSION: &str =
        "Pass `--original <version>` or apply a Kotlin plugin with a version";

    /// Suggestion when resolution fails on configured constraints.
    pub const CHECK_CONFIG: &str =
        "Review `.toolchain-future/config.toml` or run with `--verbose`";

    /// Where ICE reports end up.
    pub const ICE_REPORT: &str =
        "Attach the report when filing the crash at https://youtrack.jetbrains.com/issues/KT";
}

/// How serious a [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, false) => "error",
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, false) => "warning",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
        }
    }
}

/// A message for the terminal: what went wrong, the versions or values
/// involved, and what to try next.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Detail lines, e.g. the candidate versions considered
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Render for the terminal, with ANSI colors when `color` is set.
    pub fn format(&self, color: bool) -> String {
        let mut out = format!("{}: {}\n", self.severity.label(color), self.message);
        for line in &self.context {
            out.push_str(&format!("  → {}\n", line));
        }
        for suggestion in &self.suggestions {
            out.push_str(&format!("  help: {}\n", suggestion));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Malformed configuration file, pointing at the offending span.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("failed to parse config file: {path}")]
#[diagnostic(code(toolchain_future::config::parse))]
pub struct ConfigParseError {
    pub path: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{message}")]
    pub span: Option<SourceSpan>,
    pub message: String,
}

impl ConfigParseError {
    pub fn new(path: &Path, contents: String, err: &toml::de::Error) -> Self {
        let path = path.display().to_string();
        ConfigParseError {
            src: NamedSource::new(&path, contents),
            span: err.span().map(SourceSpan::from),
            message: err.message().to_string(),
            path,
        }
    }
}

/// A unit of work crashed the compiler.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("internal compiler error in `{task}`")]
#[diagnostic(
    code(toolchain_future::ice::detected),
    severity(Warning),
    help("report written to {report}")
)]
pub struct IceDetected {
    pub task: String,
    pub report: String,
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("no Kotlin bootstrap versions found with the same feature version as 1.5.10 (1.5)")
            .with_context("versions: 1.6.0-dev-2047, 1.6.0-dev-1990")
            .with_suggestion(suggestions::CHECK_CONFIG);

        let output = diag.format(false);
        assert!(output.starts_with("error: no Kotlin bootstrap versions"));
        assert!(output.contains("  → versions: 1.6.0-dev-2047"));
        assert!(output.ends_with("  help: Review `.toolchain-future/config.toml` or run with `--verbose`\n"));
        assert_eq!(diag.to_string(), output);
    }

    #[test]
    fn test_warning_colors() {
        let output = Diagnostic::warning("workflows already exist").format(true);
        assert!(output.starts_with("\x1b[1;33mwarning\x1b[0m: workflows already exist"));
    }

    #[test]
    fn test_config_parse_error_span() {
        let contents = "[future]\ndisabled = maybe\n".to_string();
        let err = toml::from_str::<toml::Value>(&contents).unwrap_err();
        let parse = ConfigParseError::new(Path::new("config.toml"), contents, &err);

        assert_eq!(parse.to_string(), "failed to parse config file: config.toml");
        let span = parse.span.unwrap();
        assert!(span.offset() >= "[future]\n".len());
        assert!(!parse.message.is_empty());
    }
}
