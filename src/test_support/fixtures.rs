//! Test fixtures for common test scenarios.
//!
//! Canned feed payloads, compiler output, and throwaway git repositories.

use std::path::{Path, PathBuf};

use git2::{Repository, Signature};
use tempfile::TempDir;

use crate::core::host::WorkUnit;

/// A build-server response listing bootstrap builds, newest first.
pub const BOOTSTRAP_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<builds count="3"><build number="1.6.0-dev-2047"/><build number="1.6.0-dev-1980"/><build number="1.5.30-dev-3117"/></builds>"#;

/// A releases listing, newest first.
pub const EAP_FEED: &str = r#"[
  {"tag_name": "v1.6.0-RC", "prerelease": true},
  {"tag_name": "v1.5.31", "prerelease": false},
  {"tag_name": "v1.5.30", "prerelease": false}
]"#;

/// Stderr of a JVM backend crash.
pub const BACKEND_CRASH_STDERR: &str = "e: org.jetbrains.kotlin.backend.common.BackendException: Backend Internal error: Exception during IR lowering
File being compiled: file:///src/main/kotlin/Main.kt
	at org.jetbrains.kotlin.backend.common.CodegenUtil.reportBackendException(CodegenUtil.kt:239)
	at org.jetbrains.kotlin.ir.util.IrUtilsKt.run(IrUtils.kt:42)
";

/// Stderr of an ordinary compilation error.
pub const USER_ERROR_STDERR: &str =
    "e: /src/main/kotlin/Main.kt: (3, 5): Unresolved reference: foo\n";

/// Stderr of a native link failure.
pub const LINKER_STDERR: &str = "error: Linking globalOptimizations failed\nld: symbol(s) not found for architecture x86_64\n";

/// A compile unit rooted at `root`.
pub fn compile_unit(root: &Path) -> WorkUnit {
    WorkUnit::new("compileKotlin", ":app:compileKotlin", "demo", root)
        .with_input("jvmTarget", "11")
        .with_input("moduleName", "app")
}

/// A git repository with one commit on `main` and an `origin` remote.
pub struct GitFixture {
    dir: TempDir,
    head: String,
}

impl GitFixture {
    /// Create the repository. Panics on failure; tests only.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        repo.remote("origin", "https://github.com/example/demo.git")
            .unwrap();

        std::fs::write(dir.path().join("settings.gradle.kts"), "rootProject.name = \"demo\"\n")
            .unwrap();

        let mut index = repo.index().unwrap();
        index
            .add_path(Path::new("settings.gradle.kts"))
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let oid = repo
            .commit(Some("refs/heads/main"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
        repo.set_head("refs/heads/main").unwrap();

        GitFixture {
            dir,
            head: oid.to_string(),
        }
    }

    /// Repository root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a sub-directory (a nested build root) and return it.
    pub fn subdir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    /// The commit id of `main`.
    pub fn head(&self) -> &str {
        &self.head
    }
}

impl Default for GitFixture {
    fn default() -> Self {
        GitFixture::new()
    }
}
