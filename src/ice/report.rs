//! Internal compiler error reports.
//!
//! Each crashing unit produces two sibling files: `<stem>.json` for tooling
//! and `<stem>.txt` for people. Reports never contain source code beyond
//! what the compiler printed to stderr.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A toolchain crash, with enough context to reproduce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceReport {
    pub root_project_name: String,
    pub root_project_rel_path: Option<String>,
    pub task_path: String,
    pub task_inputs: BTreeMap<String, String>,
    pub kotlin_version: String,
    pub kotlin_version_kind: String,
    pub compiler_stderr: String,
    pub git_ref: Option<String>,
    pub git_remotes: Option<BTreeMap<String, String>>,
    pub ci_run_url: Option<String>,
}

impl IceReport {
    /// File stem for this report: `<root>:<task path>` with `:` replaced by
    /// `$` and path separators by `_`.
    pub fn file_stem(&self) -> String {
        report_file_stem(&self.root_project_name, &self.task_path)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text rendering, one field per line, stderr last.
    pub fn human_readable(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Root Project: {}\n", self.root_project_name));
        if let Some(path) = &self.root_project_rel_path {
            out.push_str(&format!("Root Project path from Git root: {}\n", path));
        }
        out.push_str(&format!("Task: {}\n", self.task_path));
        out.push_str(&format!("Task input properties: {}\n", render_map(&self.task_inputs)));
        out.push_str(&format!("Kotlin version: {}\n", self.kotlin_version));
        out.push_str(&format!("Kotlin version kind: {}\n", self.kotlin_version_kind));
        if let Some(git_ref) = &self.git_ref {
            out.push_str(&format!("Git ref: {}\n", git_ref));
        }
        if let Some(remotes) = &self.git_remotes {
            out.push_str(&format!("Git remotes: {}\n", render_map(remotes)));
        }
        if let Some(url) = &self.ci_run_url {
            out.push_str(&format!("CI run url: {}\n", url));
        }
        out.push_str(&format!("{}\n", self.compiler_stderr));
        out
    }
}

/// Filesystem-safe report name for a unit of work.
pub fn report_file_stem(root_project_name: &str, task_path: &str) -> String {
    format!("{}:{}", root_project_name, task_path.trim_matches(':'))
        .replace(':', "$")
        .replace(['/', '\\'], "_")
}

fn render_map(map: &BTreeMap<String, String>) -> String {
    let entries: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{{{}}}", entries.join(", "))
}
