//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// toolchain-future - early warning builds against future Kotlin toolchains
#[derive(Parser)]
#[command(name = "toolchain-future")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the Kotlin version a build should use
    Resolve(ResolveArgs),

    /// Run a command as a unit of work, reporting internal compiler errors
    Run(RunArgs),

    /// Check whether a failure is an internal compiler error
    Classify(ClassifyArgs),

    /// Generate GitHub Actions workflows testing future versions
    Workflow(WorkflowArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by commands that operate on a build.
#[derive(Args)]
pub struct BuildArgs {
    /// Root project directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Set a build property (e.g. `-P kotlinBootstrap=latest`)
    #[arg(short = 'P', value_name = "NAME=VALUE")]
    pub properties: Vec<String>,

    /// Kotlin version the build declares
    #[arg(long, value_name = "VERSION")]
    pub original: Option<String>,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// `kotlinFutureVersion=...` lines
    #[default]
    Properties,
    /// Pretty-printed JSON
    Json,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Task path of the unit of work
    #[arg(long, default_value = ":compileKotlin")]
    pub task: String,

    /// Task input property reported on a crash
    #[arg(long = "input", value_name = "NAME=VALUE")]
    pub inputs: Vec<String>,

    /// Root project name (defaults to the root directory name)
    #[arg(long)]
    pub project_name: Option<String>,

    /// Command to run
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

#[derive(Args)]
pub struct ClassifyArgs {
    /// Unit of work name
    #[arg(long, default_value = "compileKotlin")]
    pub unit: String,

    /// Failure message
    #[arg(long, default_value = "Compilation error")]
    pub message: String,

    /// Underlying cause messages, outermost first
    #[arg(long = "cause")]
    pub causes: Vec<String>,

    /// File with the captured stderr (`-` for stdin)
    #[arg(long)]
    pub stderr: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum WorkflowKind {
    Bootstrap,
    Eap,
    Both,
}

#[derive(Args)]
pub struct WorkflowArgs {
    /// Root project directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Which workflows to generate
    #[arg(value_enum, default_value = "both")]
    pub kind: WorkflowKind,

    /// Gradle arguments for `./gradlew`
    #[arg(long, default_value = "assemble")]
    pub gradle: String,

    /// Commands to run instead of `./gradlew`, one per step line
    #[arg(long)]
    pub run: Vec<String>,

    /// File with custom YAML steps
    #[arg(long, conflicts_with = "run")]
    pub steps: Option<PathBuf>,

    /// Workflow name suffix
    #[arg(long, default_value = "compile")]
    pub suffix: String,

    /// Setup command added to every workflow
    #[arg(long)]
    pub common: Vec<String>,

    /// JDK version
    #[arg(long)]
    pub jdk: Option<String>,

    /// Runner OS (repeatable)
    #[arg(long = "runner")]
    pub runners: Vec<String>,

    /// Branch for scheduled runs
    #[arg(long)]
    pub branch: Option<String>,

    /// `daily`, `weekly[:day]`, `monthly[:day]` or `none`
    #[arg(long)]
    pub schedule: Option<String>,

    /// Overwrite existing workflow files
    #[arg(long)]
    pub force: bool,

    /// Don't enable ICE reports in the future job
    #[arg(long)]
    pub no_report: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
