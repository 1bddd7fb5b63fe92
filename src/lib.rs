//! toolchain-future - early warning builds against future Kotlin toolchains
//!
//! This crate resolves which bootstrap or EAP toolchain version a build
//! should use, substitutes it into plugin and dependency resolution, and
//! writes reports for internal compiler errors hit along the way.

pub mod core;
pub mod ice;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock version feed and git and stderr
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{FutureSettings, ResolvedVersion, VersionKind, WorkUnit};
pub use ice::IceListener;
pub use resolver::VersionResolver;
pub use util::context::BuildContext;
