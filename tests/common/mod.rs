//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a workspace fixture, manifest snippets, and fake
//! collaborators so the whole split pipeline can run without network access,
//! `git`, `meson` or `gh`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = SplitFixture::new().with_manifest(manifests::EMPTY);
//!     let fakes = Fakes::new(&fixture);
//!     let outcome = Splitter::with_collaborators(fixture.config(), fakes.collaborators()).run();
//!     assert!(outcome.success);
//! }
//! ```

use assert_fs::prelude::*;
use scroll_split::config::SplitConfig;
use scroll_split::error::{Error, FailureKind, Result};
use scroll_split::repository::{
    BuildOperations, Collaborators, PullRequestOperations, VcsOperations,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use walkdir::WalkDir;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    #[allow(unused_imports)]
    pub use super::should_skip_network_tests;
    #[allow(unused_imports)]
    pub use super::{CallLog, Fakes, SplitFixture};
}

/// Manifest snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// No declared files and no rewrite rules.
    pub const EMPTY: &str = r#"{
    "version": "1.0.0",
    "scene_files": {"implementation": [], "headers": []},
    "modifications": {"include_patterns": []}
}"#;

    /// Declares the files of [`super::SplitFixture::with_scene_sources`].
    pub const SCENE: &str = r##"{
    "version": "1.0.0",
    "scene_files": {
        "implementation": [
            "sway/tree/scene/scene.c",
            "sway/tree/scene/color.c",
            "sway/tree/scene/output.c"
        ],
        "headers": [
            "include/sway/tree/scene.h",
            "sway/tree/scene/color.h"
        ]
    },
    "modifications": {
        "include_patterns": [
            {"from": "#include \"sway/tree/scene\\.h\"", "to": "#include <scene-scroll/scene.h>"},
            {"from": "#include \"sway/tree/scene/(\\w+)\\.h\"", "to": "#include <scene-scroll/\\1.h>"}
        ]
    }
}"##;

    /// Not valid JSON.
    pub const INVALID: &str = "{ \"scene_files\": ";
}

/// Check if network tests should be skipped.
///
/// Returns `true` if the `SKIP_NETWORK_TESTS` environment variable is set.
#[allow(dead_code)]
pub fn should_skip_network_tests() -> bool {
    env::var("SKIP_NETWORK_TESTS").is_ok()
}

/// A temporary directory holding a manifest, a workspace, and one template
/// directory per "remote" repository that the fake VCS clones from.
pub struct SplitFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl SplitFixture {
    /// Create a fixture with three empty remotes and no manifest.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        for repo in ["scroll", "scene-scroll", "scroll-standalone"] {
            temp_dir
                .child("remotes")
                .child(repo)
                .create_dir_all()
                .expect("Failed to create remote template");
        }
        Self { temp_dir }
    }

    /// Write `split_manifest.json` with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.temp_dir
            .child("split_manifest.json")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    /// Add a file to the template of remote `repo`.
    pub fn with_remote_file(self, repo: &str, path: &str, content: &str) -> Self {
        self.temp_dir
            .child("remotes")
            .child(repo)
            .child(path)
            .write_str(content)
            .expect("Failed to write remote file");
        self
    }

    /// Create an empty scene directory in the source remote.
    pub fn with_scene_dir(self) -> Self {
        self.temp_dir
            .child("remotes/scroll/sway/tree/scene")
            .create_dir_all()
            .expect("Failed to create scene directory");
        self
    }

    /// Populate the source remote with the files [`manifests::SCENE`] declares.
    pub fn with_scene_sources(self) -> Self {
        self.with_remote_file(
            "scroll",
            "sway/tree/scene/scene.c",
            "#include \"sway/tree/scene.h\"\nvoid scene(void) {}\n",
        )
        .with_remote_file("scroll", "sway/tree/scene/color.c", "void color(void) {}\n")
        .with_remote_file("scroll", "sway/tree/scene/output.c", "void output(void) {}\n")
        .with_remote_file("scroll", "sway/tree/scene/color.h", "struct color;\n")
        .with_remote_file("scroll", "include/sway/tree/scene.h", "struct wlr_scene;\n")
    }

    /// Populate the consumer remote with a small sway tree.
    pub fn with_consumer_sources(self) -> Self {
        self.with_remote_file(
            "scroll-standalone",
            "meson.build",
            "project('sway', 'c')\n\nwlroots = subproject(\n  'wlroots',\n  default_options: ['examples=false'],\n  required: false,\n)\n",
        )
        .with_remote_file(
            "scroll-standalone",
            "sway/meson.build",
            "sway_sources = files(\n  'main.c',\n  'tree/scene/scene.c',\n  'tree/scene/color.c',\n)\n\nexecutable(\n  'sway',\n  sway_sources,\n  dependencies: [\n    wlroots,\n  ],\n)\n",
        )
        .with_remote_file(
            "scroll-standalone",
            "sway/main.c",
            "#include \"sway/tree/scene.h\"\n#include \"sway/tree/scene/color.h\"\nint main(void) { return 0; }\n",
        )
        .with_remote_file("scroll-standalone", "sway/server.c", "int server;\n")
        .with_remote_file(
            "scroll-standalone",
            "sway/tree/scene/scene.c",
            "void scene(void) {}\n",
        )
        .with_remote_file(
            "scroll-standalone",
            "include/sway/tree/scene.h",
            "struct wlr_scene;\n",
        )
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn remotes(&self) -> PathBuf {
        self.path().join("remotes")
    }

    pub fn workspace(&self) -> PathBuf {
        self.path().join("ws")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path().join("split_manifest.json")
    }

    /// Configuration for version `1.11.3` with pull requests disabled.
    pub fn config(&self) -> SplitConfig {
        let mut config = SplitConfig::new("1.11.3", &self.workspace(), &self.manifest_path());
        config.create_pull_requests = false;
        config
    }

    /// Every report written into the workspace.
    pub fn reports(&self) -> Vec<PathBuf> {
        let mut reports: Vec<PathBuf> = fs::read_dir(self.workspace())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| {
                        p.file_name()
                            .and_then(|n| n.to_str())
                            .map(|n| n.starts_with("split_report_") && n.ends_with(".md"))
                            .unwrap_or(false)
                    })
                    .collect()
            })
            .unwrap_or_default();
        reports.sort();
        reports
    }

    /// Create a command for the scroll-split binary.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("scroll-split");
        cmd.current_dir(self.path());
        cmd.env_remove("GH_TOKEN");
        cmd.env_remove("SCROLL_SPLIT_MANIFEST");
        cmd.env_remove("SCROLL_SPLIT_REMOTE_BASE");
        cmd
    }
}

impl Default for SplitFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, ordered record of every fake call.
pub type CallLog = Arc<Mutex<Vec<String>>>;

fn repo_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::Path {
                message: e.to_string(),
            })?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Clones by copying `<remotes>/<name>`; everything else is recorded.
pub struct FakeVcs {
    remotes: PathBuf,
    log: CallLog,
}

impl VcsOperations for FakeVcs {
    fn clone_repository(&self, url: &str, ref_name: Option<&str>, target_dir: &Path) -> Result<()> {
        let name = url
            .trim_end_matches(".git")
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        self.log
            .lock()
            .unwrap()
            .push(format!("clone {} {}", name, ref_name.unwrap_or("HEAD")));
        let template = self.remotes.join(&name);
        if !template.is_dir() {
            return Err(Error::GitClone {
                url: url.to_string(),
                r#ref: ref_name.unwrap_or("HEAD").to_string(),
                message: "repository not found".to_string(),
                kind: FailureKind::Permanent,
                hint: None,
            });
        }
        if target_dir.exists() {
            fs::remove_dir_all(target_dir)?;
        }
        copy_tree(&template, target_dir)
    }

    fn current_commit(&self, _repo: &Path) -> Result<String> {
        Ok("0123456789abcdef".to_string())
    }

    fn create_branch(&self, repo: &Path, branch: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("branch {} {}", repo_name(repo), branch));
        Ok(())
    }

    fn stage_all(&self, repo: &Path) -> Result<()> {
        self.log.lock().unwrap().push(format!("add {}", repo_name(repo)));
        Ok(())
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("commit {} {}", repo_name(repo), message));
        Ok(())
    }

    fn set_remote_auth(&self, repo: &Path, remote_url: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("remote {} {}", repo_name(repo), remote_url));
        Ok(())
    }

    fn push(&self, repo: &Path, branch: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("push {} {}", repo_name(repo), branch));
        Ok(())
    }
}

/// Builds succeed unless the repository is listed in `failing`.
pub struct FakeBuild {
    failing: Vec<String>,
    log: CallLog,
}

impl BuildOperations for FakeBuild {
    fn configure(&self, repo: &Path) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("configure {}", repo_name(repo)));
        Ok(())
    }

    fn compile(&self, repo: &Path) -> Result<()> {
        let name = repo_name(repo);
        self.log.lock().unwrap().push(format!("compile {}", name));
        if self.failing.contains(&name) {
            return Err(Error::BuildTool {
                tool: "ninja".to_string(),
                repo: name,
                message: "compilation failed".to_string(),
            });
        }
        Ok(())
    }
}

/// Returns a predictable PR URL per repository.
pub struct FakePullRequests {
    log: CallLog,
}

impl PullRequestOperations for FakePullRequests {
    fn create(&self, repo: &Path, title: &str, body: &str, draft: bool) -> Option<String> {
        let name = repo_name(repo);
        self.log.lock().unwrap().push(format!(
            "pr {} {} draft={} related={}",
            name,
            title,
            draft,
            body.contains("**Related PR**")
        ));
        Some(format!("https://example.invalid/{}/pull/1", name))
    }
}

/// A set of fakes sharing one call log.
pub struct Fakes {
    remotes: PathBuf,
    failing_builds: Vec<String>,
    pub log: CallLog,
}

#[allow(dead_code)]
impl Fakes {
    pub fn new(fixture: &SplitFixture) -> Self {
        Self {
            remotes: fixture.remotes(),
            failing_builds: Vec::new(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make the build of `repo` fail.
    pub fn failing_build(mut self, repo: &str) -> Self {
        self.failing_builds.push(repo.to_string());
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::with_operations(
            Box::new(FakeVcs {
                remotes: self.remotes.clone(),
                log: Arc::clone(&self.log),
            }),
            Box::new(FakeBuild {
                failing: self.failing_builds.clone(),
                log: Arc::clone(&self.log),
            }),
            Box::new(FakePullRequests {
                log: Arc::clone(&self.log),
            }),
        )
    }

    /// Recorded calls, in order.
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Recorded calls starting with `prefix`.
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_remotes() {
        let fixture = SplitFixture::new();
        assert!(fixture.remotes().join("scroll").is_dir());
        assert!(fixture.remotes().join("scene-scroll").is_dir());
        assert!(fixture.remotes().join("scroll-standalone").is_dir());
    }

    #[test]
    fn test_fake_clone_copies_template() {
        let fixture = SplitFixture::new().with_scene_sources();
        let fakes = Fakes::new(&fixture);
        let collaborators = fakes.collaborators();
        let target = fixture.workspace().join("scroll");

        collaborators
            .vcs
            .clone_repository("https://github.com/scrollwm/scroll.git", Some("1.11.3"), &target)
            .unwrap();

        assert!(target.join("sway/tree/scene/scene.c").is_file());
        assert_eq!(fakes.calls(), vec!["clone scroll 1.11.3"]);
    }

    #[test]
    fn test_manifests_parse() {
        for content in [manifests::EMPTY, manifests::SCENE] {
            scroll_split::manifest::parse_json(content, "test").unwrap();
        }
        assert!(scroll_split::manifest::parse_json(manifests::INVALID, "test").is_err());
    }
}
