//! Persisting ICE reports.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::host::{UnitOutcome, WorkUnit};
use crate::ice::classifier::IceClassifier;
use crate::ice::git::{GitInfo, GithubEnv};
use crate::ice::report::IceReport;
use crate::resolver::VersionResolver;
use crate::util::fs::write_string;

/// Report directory, relative to the root project directory.
pub const ICE_REPORT_DIR: &str = "build/kotlin-future-testing-ICE-report";

/// Paths of a written report pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub json: PathBuf,
    pub text: PathBuf,
}

/// Classifies failed units and writes a report pair for each crash.
pub struct IceReportStore {
    output_dir: PathBuf,
    classifier: IceClassifier,
    resolver: Arc<VersionResolver>,
    github: GithubEnv,
}

impl IceReportStore {
    pub fn new(output_dir: impl Into<PathBuf>, resolver: Arc<VersionResolver>) -> Self {
        IceReportStore {
            output_dir: output_dir.into(),
            classifier: IceClassifier::new(),
            resolver,
            github: GithubEnv::from_env(),
        }
    }

    /// Use a custom classifier.
    pub fn with_classifier(mut self, classifier: IceClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Use a captured CI environment instead of the process environment.
    pub fn with_github_env(mut self, github: GithubEnv) -> Self {
        self.github = github;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a report if `outcome` is a toolchain crash.
    ///
    /// Failing to assemble or write the report is logged, never propagated:
    /// reporting must not abort the build.
    pub fn record_if_crash(
        &self,
        unit: &WorkUnit,
        outcome: &UnitOutcome,
        stderr: &str,
    ) -> Option<ReportFiles> {
        let failure = outcome.failure()?;
        if !self.classifier.classify(failure, stderr, unit.name()) {
            tracing::debug!("Failure of {} is not an internal compiler error", unit.path());
            return None;
        }

        tracing::warn!("Internal compiler error detected in {}", unit.path());

        let report = match self.build_report(unit, stderr) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Unable to build ICE report for {}: {:#}", unit.path(), e);
                return None;
            }
        };

        match self.write(&report) {
            Ok(files) => {
                tracing::info!("Wrote ICE report to {}", files.text.display());
                Some(files)
            }
            Err(e) => {
                tracing::warn!("Unable to write ICE report for {}: {:#}", unit.path(), e);
                None
            }
        }
    }

    fn build_report(&self, unit: &WorkUnit, stderr: &str) -> Result<IceReport> {
        let version = self
            .resolver
            .resolve()
            .context("failed to resolve the Kotlin version")?;
        let git = GitInfo::collect(unit.root_dir(), &self.github);

        Ok(IceReport {
            root_project_name: unit.root_project_name().to_string(),
            root_project_rel_path: git.root_rel_path,
            task_path: unit.path().to_string(),
            task_inputs: unit.inputs().clone(),
            kotlin_version: version.version().to_string(),
            kotlin_version_kind: version.kind().to_string(),
            compiler_stderr: stderr.to_string(),
            git_ref: git.git_ref,
            git_remotes: git.remotes,
            ci_run_url: git.ci_run_url,
        })
    }

    /// Write both files, replacing earlier reports for the same unit.
    pub fn write(&self, report: &IceReport) -> Result<ReportFiles> {
        let stem = report.file_stem();
        let files = ReportFiles {
            json: self.output_dir.join(format!("{}.json", stem)),
            text: self.output_dir.join(format!("{}.txt", stem)),
        };

        let json = report
            .to_json()
            .context("failed to serialize ICE report")?;
        write_string(&files.json, &json)?;
        write_string(&files.text, &report.human_readable())?;

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::UnitFailure;
    use crate::core::settings::FutureSettings;
    use crate::test_support::{bootstrap_props, compile_unit, MockFeed, BACKEND_CRASH_STDERR};
    use tempfile::TempDir;

    fn store(dir: &Path) -> IceReportStore {
        let feed = MockFeed::new(&["1.6.0-dev-2047"], &[]);
        let resolver = VersionResolver::new(FutureSettings::new(), &bootstrap_props("latest"), feed);
        resolver.observe_original_version("1.5.10");
        IceReportStore::new(dir.join("ice"), Arc::new(resolver))
            .with_github_env(GithubEnv::default())
    }

    #[test]
    fn test_crash_writes_report_pair() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let unit = WorkUnit::new("compileKotlin", ":compileKotlin", "demo", tmp.path());
        let outcome = UnitOutcome::Failed(UnitFailure::new("Internal compiler error in lowering"));

        let files = store
            .record_if_crash(&unit, &outcome, "e: something broke")
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(tmp.path().join("ice"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&"demo$compileKotlin.json".to_string()));
        assert!(entries.contains(&"demo$compileKotlin.txt".to_string()));

        let json = std::fs::read_to_string(&files.json).unwrap();
        let text = std::fs::read_to_string(&files.text).unwrap();
        for contents in [&json, &text] {
            assert!(contents.contains(":compileKotlin"));
            assert!(contents.contains("e: something broke"));
        }

        let report: IceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.kotlin_version, "1.6.0-dev-2047");
        assert_eq!(report.kotlin_version_kind, "Bootstrap");
    }

    #[test]
    fn test_success_and_user_errors_write_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let unit = compile_unit(tmp.path());

        assert!(store
            .record_if_crash(&unit, &UnitOutcome::Success, BACKEND_CRASH_STDERR)
            .is_none());

        let outcome = UnitOutcome::Failed(UnitFailure::new("Compilation error"));
        assert!(store
            .record_if_crash(&unit, &outcome, "e: Unresolved reference: foo")
            .is_none());

        assert!(!tmp.path().join("ice").exists());
    }

    #[test]
    fn test_repeated_runs_overwrite() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path());
        let unit = compile_unit(tmp.path());
        let outcome = UnitOutcome::Failed(UnitFailure::new("Compilation error"));

        store.record_if_crash(&unit, &outcome, BACKEND_CRASH_STDERR).unwrap();
        let files = store
            .record_if_crash(&unit, &outcome, "\tat org.jetbrains.kotlin.ir.Second")
            .unwrap();

        assert_eq!(
            files.json.file_name().unwrap().to_string_lossy(),
            "demo$app$compileKotlin.json"
        );
        let text = std::fs::read_to_string(&files.text).unwrap();
        assert!(text.contains("org.jetbrains.kotlin.ir.Second"));
        assert!(!text.contains("CodegenUtil"));
        assert!(text.contains("Task input properties: {jvmTarget=11, moduleName=app}"));
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        // A file where the report directory should be.
        std::fs::write(tmp.path().join("ice"), "not a directory").unwrap();
        let store = store(tmp.path());
        let unit = compile_unit(tmp.path());
        let outcome = UnitOutcome::Failed(UnitFailure::new("Internal compiler error"));

        assert!(store.record_if_crash(&unit, &outcome, "").is_none());
    }
}
