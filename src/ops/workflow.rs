//! GitHub Actions workflow generation.
//!
//! Each generated workflow runs the same steps twice, once normally and once
//! against the latest future toolchain, and reports a failure only when the
//! normal job passed. Generated files are templates; review them before use.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::scheduling::Scheduling;
use crate::core::version::VersionKind;
use crate::ice::store::ICE_REPORT_DIR;
use crate::util::config::WorkflowConfig;
use crate::util::fs::write_string;
use crate::util::properties::{BOOTSTRAP_PROPERTY, EAP_PROPERTY, ENV_PREFIX, REPORT_ICE_PROPERTY};

/// Default JDK for generated workflows.
pub const DEFAULT_JDK: &str = "15";

/// Default runner.
pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

/// Directory of generated workflows, relative to the base directory.
pub const WORKFLOW_DIR: &str = ".github/workflows";

const DEFAULT_COMMAND: &str = "assemble";
const DEFAULT_SUFFIX: &str = "compile";

/// Writes `kotlin-{bootstrap|eap}[-suffix].yml` workflow files.
#[derive(Debug, Clone)]
pub struct WorkflowGenerator {
    base_dir: PathBuf,
    jdk: String,
    runners: Vec<String>,
    scheduling: Option<Scheduling>,
    branch: Option<String>,
    force: bool,
    report_ices: bool,
    common_steps: Vec<String>,
}

impl WorkflowGenerator {
    /// Generator writing below `base_dir`, with default settings.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        WorkflowGenerator {
            base_dir: base_dir.into(),
            jdk: DEFAULT_JDK.to_string(),
            runners: vec![DEFAULT_RUNNER.to_string()],
            scheduling: Some(Scheduling::default()),
            branch: None,
            force: false,
            report_ices: true,
            common_steps: Vec::new(),
        }
    }

    /// Generator writing below `base_dir`, configured from `[workflow]`.
    pub fn from_config(
        base_dir: impl Into<PathBuf>,
        config: &WorkflowConfig,
        report_ices: bool,
    ) -> Result<Self> {
        let mut generator = WorkflowGenerator::new(base_dir)
            .with_branch(config.branch.clone())
            .with_force(config.force.unwrap_or(false))
            .with_report_ices(report_ices);
        if let Some(jdk) = &config.jdk {
            generator = generator.with_jdk(jdk.as_str());
        }
        if !config.runners.is_empty() {
            generator = generator.with_runners(config.runners.clone())?;
        }
        if let Some(schedule) = &config.schedule {
            generator = generator.with_scheduling(parse_schedule(schedule)?);
        }
        Ok(generator)
    }

    pub fn with_jdk(mut self, jdk: impl Into<String>) -> Self {
        self.jdk = jdk.into();
        self
    }

    /// Runner OS list; must not be empty.
    pub fn with_runners(mut self, runners: Vec<String>) -> Result<Self> {
        if runners.is_empty() {
            bail!("must specify at least one runner OS");
        }
        self.runners = runners;
        Ok(self)
    }

    /// Cron schedule, or `None` for manual runs only.
    pub fn with_scheduling(mut self, scheduling: Option<Scheduling>) -> Self {
        self.scheduling = scheduling;
        self
    }

    /// Branch checked out by scheduled runs and offered by manual runs.
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    /// Overwrite existing workflow files.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Enable ICE reporting and report upload in the future job.
    pub fn with_report_ices(mut self, report_ices: bool) -> Self {
        self.report_ices = report_ices;
        self
    }

    /// Add `run:` commands as a step to every workflow generated afterwards.
    pub fn common_commands(&mut self, commands: &[&str], name: Option<&str>, id: Option<&str>) {
        let mut step = format!("- name: {}\n", name.unwrap_or("Common Setup"));
        if let Some(id) = id {
            step.push_str(&format!("  id: {}\n", id));
        }
        step.push_str("  run: |\n");
        for command in commands {
            step.push_str(&format!("    {}\n", command));
        }
        self.common_step(&step);
    }

    /// Add raw YAML step(s) to every workflow generated afterwards.
    pub fn common_step(&mut self, steps: &str) {
        self.common_steps.push(steps.to_string());
    }

    /// Bootstrap workflow running `./gradlew <gradle_command>`.
    pub fn bootstrap(&self, gradle_command: Option<&str>, suffix: Option<&str>) -> Result<Option<PathBuf>> {
        self.bootstrap_commands(&[&gradle_line(gradle_command)], suffix)
    }

    /// Bootstrap workflow running `commands`, one per line.
    pub fn bootstrap_commands(&self, commands: &[&str], suffix: Option<&str>) -> Result<Option<PathBuf>> {
        self.bootstrap_custom(&commands_step(commands), suffix)
    }

    /// Bootstrap workflow with custom steps, after the standard setup.
    pub fn bootstrap_custom(&self, steps: &str, suffix: Option<&str>) -> Result<Option<PathBuf>> {
        self.generate(steps, VersionKind::Bootstrap, suffix.unwrap_or(DEFAULT_SUFFIX))
    }

    /// EAP workflow running `./gradlew <gradle_command>`.
    pub fn eap(&self, gradle_command: Option<&str>, suffix: Option<&str>) -> Result<Option<PathBuf>> {
        self.eap_commands(&[&gradle_line(gradle_command)], suffix)
    }

    /// EAP workflow running `commands`, one per line.
    pub fn eap_commands(&self, commands: &[&str], suffix: Option<&str>) -> Result<Option<PathBuf>> {
        self.eap_custom(&commands_step(commands), suffix)
    }

    /// EAP workflow with custom steps, after the standard setup.
    pub fn eap_custom(&self, steps: &str, suffix: Option<&str>) -> Result<Option<PathBuf>> {
        self.generate(steps, VersionKind::Eap, suffix.unwrap_or(DEFAULT_SUFFIX))
    }

    /// Bootstrap and EAP workflows running `./gradlew <gradle_command>`.
    pub fn both(&self, gradle_command: Option<&str>, suffix: Option<&str>) -> Result<Vec<PathBuf>> {
        let written = [
            self.bootstrap(gradle_command, suffix)?,
            self.eap(gradle_command, suffix)?,
        ];
        Ok(written.into_iter().flatten().collect())
    }

    pub fn both_commands(&self, commands: &[&str], suffix: Option<&str>) -> Result<Vec<PathBuf>> {
        let written = [
            self.bootstrap_commands(commands, suffix)?,
            self.eap_commands(commands, suffix)?,
        ];
        Ok(written.into_iter().flatten().collect())
    }

    pub fn both_custom(&self, steps: &str, suffix: Option<&str>) -> Result<Vec<PathBuf>> {
        let written = [
            self.bootstrap_custom(steps, suffix)?,
            self.eap_custom(steps, suffix)?,
        ];
        Ok(written.into_iter().flatten().collect())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the workflow file for `kind` and `suffix`.
    pub fn workflow_path(&self, kind: VersionKind, suffix: &str) -> PathBuf {
        let mut name = format!("kotlin-{}", kind.as_str());
        if !suffix.trim().is_empty() {
            name.push('-');
            name.push_str(suffix);
        }
        self.base_dir.join(WORKFLOW_DIR).join(format!("{}.yml", name))
    }

    fn generate(&self, steps: &str, kind: VersionKind, suffix: &str) -> Result<Option<PathBuf>> {
        let path = self.workflow_path(kind, suffix);
        if path.exists() && !self.force {
            tracing::info!("Workflow {} already exists, skipping", path.display());
            return Ok(None);
        }

        write_string(&path, &self.render(steps, kind, suffix))?;
        tracing::info!("Generated workflow {}", path.display());
        Ok(Some(path))
    }

    fn render(&self, steps: &str, kind: VersionKind, suffix: &str) -> String {
        let key = kind.as_str();
        let key_name = capitalize(key);
        let suffix_name = capitalize(suffix);
        let property = match kind {
            VersionKind::Eap => EAP_PROPERTY,
            _ => BOOTSTRAP_PROPERTY,
        };

        let mut out = String::new();
        out.push_str(&format!("name: Kotlin {} {}\n", key_name, suffix_name));
        out.push_str("on:\n");
        out.push_str("  workflow_dispatch:\n");
        out.push_str("    inputs:\n");
        out.push_str("      branch:\n");
        out.push_str("        description: \"Target branch\"\n");
        out.push_str("        required: false\n");
        out.push_str(&format!(
            "        default: '{}'\n",
            self.branch.as_deref().unwrap_or_default()
        ));
        if let Some(scheduling) = &self.scheduling {
            out.push_str("  schedule:\n");
            out.push_str(&format!("    - cron: \"{}\"\n", scheduling.cron()));
        }

        out.push_str("\njobs:\n");

        // Baseline job
        out.push_str(&format!("  try-no-{}:\n", key));
        out.push_str(&format!("    name: {} normally\n", suffix_name));
        out.push_str(&indent(&self.runner(), 4));
        out.push_str("    steps:\n");
        out.push_str(&self.setup_steps());
        out.push_str(&self.user_steps(steps));

        // Future job
        out.push_str(&format!("\n  try-kotlin-{}:\n", key));
        out.push_str(&format!("    name: {} with Kotlin {}\n", suffix_name, key));
        out.push_str(&indent(&self.runner(), 4));
        out.push_str("    env:\n");
        out.push_str(&format!("      {}{}: \"latest\"\n", ENV_PREFIX, property));
        if self.report_ices {
            out.push_str(&format!("      {}{}: \"true\"\n", ENV_PREFIX, REPORT_ICE_PROPERTY));
        }
        out.push_str("    steps:\n");
        out.push_str(&self.setup_steps());
        out.push_str(&self.user_steps(steps));
        if self.report_ices {
            out.push_str("\n      - name: Archive ICE report\n");
            out.push_str("        uses: actions/upload-artifact@v2\n");
            out.push_str("        if: ${{ failure() }}\n");
            out.push_str("        with:\n");
            out.push_str(&format!("          name: {}\n", self.artifact_name()));
            out.push_str(&format!("          path: {}\n", ICE_REPORT_DIR));
        }

        // Results
        out.push_str("\n  check-results:\n");
        out.push_str("    name: Results\n");
        out.push_str(&format!("    needs: [try-no-{0}, try-kotlin-{0}]\n", key));
        out.push_str("    runs-on: ubuntu-latest\n");
        out.push_str("    if: always()\n");
        out.push_str("    steps:\n");
        out.push_str(&format!("      - name: Original {} Failed\n", suffix_name));
        out.push_str(&format!(
            "        if: ${{{{ needs.try-no-{}.result != 'success' }}}}\n",
            key
        ));
        out.push_str(&format!(
            "        run: echo \"::warning::{} without {} failed, aborting\"\n",
            suffix_name, key
        ));
        out.push_str(&format!("\n      - name: Only {} {} failed\n", key_name, suffix_name));
        out.push_str(&format!(
            "        if: ${{{{ needs.try-no-{0}.result == 'success' && needs.try-kotlin-{0}.result != 'success' }}}}\n",
            key
        ));
        out.push_str(&format!(
            "        run: echo \"::error::{} with Kotlin {} failed\"\n",
            suffix_name, key
        ));
        out
    }

    fn runner(&self) -> String {
        if let [runner] = self.runners.as_slice() {
            return format!("runs-on: {}\n", runner);
        }
        format!(
            "strategy:\n  matrix:\n    os: [ {} ]\n  fail-fast: false\nruns-on: ${{{{ matrix.os }}}}\n",
            self.runners.join(", ")
        )
    }

    fn artifact_name(&self) -> &'static str {
        if self.runners.len() == 1 {
            "kotlin-future-ICE-report"
        } else {
            "kotlin-future-ICE-report-${{ matrix.os }}"
        }
    }

    fn setup_steps(&self) -> String {
        let mut out = String::new();
        out.push_str("      - name: Checkout default branch\n");
        out.push_str("        uses: actions/checkout@v2\n");
        out.push_str("\n      - name: Checkout target branch for manual\n");
        out.push_str(
            "        if: github.event_name == 'workflow_dispatch' && github.event.inputs.branch != ''\n",
        );
        out.push_str("        uses: actions/checkout@v2\n");
        out.push_str("        with:\n");
        out.push_str("          ref: ${{ github.event.inputs.branch }}\n");

        if let (Some(_), Some(branch)) = (&self.scheduling, &self.branch) {
            out.push_str("\n      - name: Checkout target branch for scheduled\n");
            out.push_str("        if: github.event_name == 'schedule'\n");
            out.push_str("        uses: actions/checkout@v2\n");
            out.push_str("        with:\n");
            out.push_str(&format!("          ref: {}\n", branch));
        }

        out.push_str(&format!("\n      - name: Set up JDK {}\n", self.jdk));
        out.push_str("        uses: actions/setup-java@v1\n");
        out.push_str("        with:\n");
        out.push_str(&format!("          java-version: {}\n", self.jdk));
        out.push_str("\n      - name: Grant execute permission for gradlew\n");
        out.push_str("        run: chmod +x gradlew\n");
        out
    }

    fn user_steps(&self, steps: &str) -> String {
        let mut out = String::new();
        for common in &self.common_steps {
            out.push('\n');
            out.push_str(&indent(common, 6));
        }
        out.push('\n');
        out.push_str(&indent(steps, 6));
        out
    }
}

/// Parse a schedule name; `none` disables scheduled runs.
pub fn parse_schedule(schedule: &str) -> Result<Option<Scheduling>> {
    if schedule.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let scheduling: Scheduling = schedule
        .parse()
        .with_context(|| format!("invalid workflow schedule `{}`", schedule))?;
    Ok(Some(scheduling))
}

fn gradle_line(gradle_command: Option<&str>) -> String {
    format!("./gradlew {}", gradle_command.unwrap_or(DEFAULT_COMMAND))
}

fn commands_step(commands: &[&str]) -> String {
    let mut step = String::from("- name: Compile\n  run: |\n");
    for command in commands {
        step.push_str(&format!("    {}\n", command));
    }
    step
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip the common leading indentation of `text` and indent every
/// non-blank line by `width` spaces.
fn indent(text: &str, width: usize) -> String {
    let common = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let pad = " ".repeat(width);

    let mut out = String::new();
    for line in text.trim_matches('\n').lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(&pad);
            out.push_str(&line[common..]);
            out.push('\n');
        }
    }
    out
}
