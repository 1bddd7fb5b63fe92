//! Internal compiler error (ICE) detection and reporting.
//!
//! The [`IceListener`] captures each unit's stderr, the [`IceClassifier`]
//! decides whether a failure crashed the toolchain, and the
//! [`IceReportStore`] writes a JSON and a text report for each crash.

pub mod classifier;
pub mod git;
pub mod listener;
pub mod report;
pub mod store;

pub use classifier::IceClassifier;
pub use git::{GitInfo, GithubEnv};
pub use listener::IceListener;
pub use report::IceReport;
pub use store::{IceReportStore, ReportFiles, ICE_REPORT_DIR};
