//! Heuristics telling internal compiler errors apart from ordinary failures.

use std::error::Error;

/// Marker in failure messages thrown by the compiler itself.
pub const ICE_MESSAGE: &str = "Internal compiler error";

/// Packages whose stack frames indicate a crash inside the compiler.
pub const ICE_PACKAGES: &[&str] = &[
    "org.jetbrains.kotlin.backend",
    "org.jetbrains.kotlin.ir",
    "org.jetbrains.kotlin.cli",
    "org.jetbrains.kotlin.daemon",
];

/// Marker of the native toolchain (its dependency cache directory).
pub const NATIVE_MARKER: &str = ".konan";

/// Markers of native linker failures.
pub const LINKER_MARKERS: &[&str] = &["error: Linking", "ld: "];

/// Unit names containing these are never classified as crashes.
const EXCLUDED_UNIT_WORDS: &[&str] = &["test", "check"];

/// Decides whether a failed unit of work crashed the toolchain.
#[derive(Debug, Clone)]
pub struct IceClassifier {
    packages: Vec<String>,
}

impl Default for IceClassifier {
    fn default() -> Self {
        IceClassifier {
            packages: ICE_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl IceClassifier {
    pub fn new() -> Self {
        IceClassifier::default()
    }

    /// Also treat stack frames from `package` as compiler-internal.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.packages.push(package.into());
        self
    }

    /// Whether `cause`, with the unit's captured stderr, is a toolchain crash.
    pub fn classify(&self, cause: &(dyn Error + 'static), stderr: &str, unit_name: &str) -> bool {
        let name = unit_name.to_lowercase();
        if EXCLUDED_UNIT_WORDS.iter().any(|w| name.contains(w)) {
            return false;
        }

        if error_chain(cause).any(|msg| msg.contains(ICE_MESSAGE)) {
            return true;
        }

        if self
            .packages
            .iter()
            .any(|pkg| stderr.contains(&format!("at {}", pkg)))
        {
            return true;
        }

        if stderr.contains(NATIVE_MARKER) {
            return true;
        }

        LINKER_MARKERS.iter().any(|m| stderr.contains(m))
    }
}

/// Messages of an error and all of its sources.
fn error_chain<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = String> + 'a {
    std::iter::successors(Some(err), |&e| e.source()).map(|e| e.to_string())
}
