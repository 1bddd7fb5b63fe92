//! Version-control and CI metadata for ICE reports.

use std::collections::BTreeMap;
use std::path::Path;

use git2::Repository;

use crate::util::fs::{normalize_path, relative_path};

/// GitHub Actions environment, if running under it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GithubEnv {
    workflow: Option<String>,
    run_id: Option<String>,
    repository: Option<String>,
    sha: Option<String>,
    git_ref: Option<String>,
}

impl GithubEnv {
    /// Read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through a lookup function (e.g. a captured environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        GithubEnv {
            workflow: lookup("GITHUB_WORKFLOW"),
            run_id: lookup("GITHUB_RUN_ID"),
            repository: lookup("GITHUB_REPOSITORY"),
            sha: lookup("GITHUB_SHA"),
            git_ref: lookup("GITHUB_REF"),
        }
    }

    pub fn is_github(&self) -> bool {
        self.workflow.is_some()
    }

    /// Link to the current workflow run.
    pub fn run_url(&self) -> Option<String> {
        if !self.is_github() {
            return None;
        }
        Some(format!(
            "https://github.com/{}/actions/runs/{}",
            self.repository.as_deref().unwrap_or_default(),
            self.run_id.as_deref().unwrap_or_default()
        ))
    }

    fn git_ref(&self) -> String {
        format!(
            "{} {}",
            self.sha.as_deref().unwrap_or_default(),
            self.git_ref.as_deref().unwrap_or_default()
        )
    }

    fn remotes(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(
            "origin".to_string(),
            format!(
                "https://github.com/{}.git",
                self.repository.as_deref().unwrap_or_default()
            ),
        )])
    }
}

/// Repository details for a build root. Fields are absent when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    /// Build root relative to the repository root
    pub root_rel_path: Option<String>,
    /// `"<sha> <ref name>"`, or the bare sha when detached
    pub git_ref: Option<String>,
    /// Remote name to URL
    pub remotes: Option<BTreeMap<String, String>>,
    /// CI run link
    pub ci_run_url: Option<String>,
}

impl GitInfo {
    /// Collect repository and CI details for `root_dir`.
    pub fn collect(root_dir: &Path, env: &GithubEnv) -> Self {
        let repo = match Repository::discover(root_dir) {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::debug!("No git repository at {}: {}", root_dir.display(), e);
                None
            }
        };

        let root_rel_path = repo
            .as_ref()
            .and_then(|r| r.workdir())
            .map(|workdir| {
                relative_path(&normalize_path(workdir), &normalize_path(root_dir))
                    .to_string_lossy()
                    .into_owned()
            });

        let (git_ref, remotes) = if env.is_github() {
            (Some(env.git_ref()), Some(env.remotes()))
        } else {
            match &repo {
                Some(repo) => (head_ref(repo), Some(remotes(repo))),
                None => (None, None),
            }
        };

        GitInfo {
            root_rel_path,
            git_ref,
            remotes,
            ci_run_url: env.run_url(),
        }
    }
}

fn head_ref(repo: &Repository) -> Option<String> {
    let head = repo
        .head()
        .map_err(|e| tracing::debug!("Unable to read HEAD: {}", e))
        .ok()?;
    let oid = head.target()?;

    if repo.head_detached().unwrap_or(false) {
        return Some(oid.to_string());
    }
    match head.name() {
        Some(name) => Some(format!("{} {}", oid, name)),
        None => Some(oid.to_string()),
    }
}

fn remotes(repo: &Repository) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let names = match repo.remotes() {
        Ok(names) => names,
        Err(e) => {
            tracing::debug!("Unable to list git remotes: {}", e);
            return out;
        }
    };

    for name in names.iter().flatten() {
        if let Ok(remote) = repo.find_remote(name) {
            if let Some(url) = remote.url() {
                out.insert(name.to_string(), url.to_string());
            }
        }
    }
    out
}
