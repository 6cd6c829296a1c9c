//! # Repository Handles and External Collaborators
//!
//! The pipeline talks to the outside world through three narrow traits:
//!
//! - **`VcsOperations`**: clone, current commit, branch, stage, commit,
//!   remote auth and push.
//! - **`BuildOperations`**: configure and compile, used only for optional
//!   build verification.
//! - **`PullRequestOperations`**: open a (draft) pull request.
//!
//! The default implementations shell out to `git`, `meson`/`ninja` and `gh`
//! through a shared [`CommandRunner`]. [`Collaborators`] bundles one of each
//! so tests can inject fakes and exercise the full pipeline without network
//! access or toolchains installed.

use crate::error::Result;
use crate::process::CommandRunner;
use std::path::{Path, PathBuf};

/// Trait for version-control operations - allows mocking in tests
pub trait VcsOperations: Send + Sync {
    /// Clone `url` into `target_dir`, checking out `ref_name` when given.
    fn clone_repository(&self, url: &str, ref_name: Option<&str>, target_dir: &Path)
        -> Result<()>;

    /// Commit identifier `HEAD` points at.
    fn current_commit(&self, repo: &Path) -> Result<String>;

    fn create_branch(&self, repo: &Path, branch: &str) -> Result<()>;

    fn stage_all(&self, repo: &Path) -> Result<()>;

    fn commit(&self, repo: &Path, message: &str) -> Result<()>;

    /// Point `origin` at an authenticated URL.
    fn set_remote_auth(&self, repo: &Path, remote_url: &str) -> Result<()>;

    fn push(&self, repo: &Path, branch: &str) -> Result<()>;
}

/// Trait for build-tool invocation.
pub trait BuildOperations: Send + Sync {
    fn configure(&self, repo: &Path) -> Result<()>;

    fn compile(&self, repo: &Path) -> Result<()>;
}

/// Trait for pull request creation.
pub trait PullRequestOperations: Send + Sync {
    /// Returns the PR identifier (URL), or `None` if creation failed.
    fn create(&self, repo: &Path, title: &str, body: &str, draft: bool) -> Option<String>;
}

/// `git`-backed [`VcsOperations`].
pub struct DefaultVcsOperations {
    runner: CommandRunner,
}

impl DefaultVcsOperations {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

impl VcsOperations for DefaultVcsOperations {
    fn clone_repository(
        &self,
        url: &str,
        ref_name: Option<&str>,
        target_dir: &Path,
    ) -> Result<()> {
        crate::git::clone(&self.runner, url, ref_name, target_dir)
    }

    fn current_commit(&self, repo: &Path) -> Result<String> {
        crate::git::current_commit(&self.runner, repo)
    }

    fn create_branch(&self, repo: &Path, branch: &str) -> Result<()> {
        crate::git::create_branch(&self.runner, repo, branch)
    }

    fn stage_all(&self, repo: &Path) -> Result<()> {
        crate::git::stage_all(&self.runner, repo)
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<()> {
        crate::git::commit(&self.runner, repo, message)
    }

    fn set_remote_auth(&self, repo: &Path, remote_url: &str) -> Result<()> {
        crate::git::set_remote_url(&self.runner, repo, remote_url)
    }

    fn push(&self, repo: &Path, branch: &str) -> Result<()> {
        crate::git::push(&self.runner, repo, branch)
    }
}

/// `meson`/`ninja`-backed [`BuildOperations`].
pub struct DefaultBuildOperations {
    runner: CommandRunner,
}

impl DefaultBuildOperations {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

impl BuildOperations for DefaultBuildOperations {
    fn configure(&self, repo: &Path) -> Result<()> {
        crate::build::configure(&self.runner, repo)
    }

    fn compile(&self, repo: &Path) -> Result<()> {
        crate::build::compile(&self.runner, repo)
    }
}

/// `gh`-backed [`PullRequestOperations`].
pub struct DefaultPullRequestOperations {
    runner: CommandRunner,
    token: Option<String>,
}

impl DefaultPullRequestOperations {
    pub fn new(runner: CommandRunner, token: Option<String>) -> Self {
        Self { runner, token }
    }
}

impl PullRequestOperations for DefaultPullRequestOperations {
    fn create(&self, repo: &Path, title: &str, body: &str, draft: bool) -> Option<String> {
        match crate::github::create_pull_request(
            &self.runner,
            repo,
            title,
            body,
            draft,
            self.token.as_deref(),
        ) {
            Ok(url) => Some(url),
            Err(e) => {
                log::error!("Failed to create PR: {}", e);
                None
            }
        }
    }
}

/// One implementation of each collaborator trait.
pub struct Collaborators {
    pub vcs: Box<dyn VcsOperations>,
    pub build: Box<dyn BuildOperations>,
    pub pull_requests: Box<dyn PullRequestOperations>,
}

impl Collaborators {
    /// Process-backed collaborators sharing one runner.
    pub fn new(runner: CommandRunner, token: Option<String>) -> Self {
        Self {
            vcs: Box::new(DefaultVcsOperations::new(runner.clone())),
            build: Box::new(DefaultBuildOperations::new(runner.clone())),
            pull_requests: Box::new(DefaultPullRequestOperations::new(runner, token)),
        }
    }

    /// Creates `Collaborators` with custom implementations.
    ///
    /// This is primarily used for testing to inject fake operations.
    pub fn with_operations(
        vcs: Box<dyn VcsOperations>,
        build: Box<dyn BuildOperations>,
        pull_requests: Box<dyn PullRequestOperations>,
    ) -> Self {
        Self {
            vcs,
            build,
            pull_requests,
        }
    }
}

/// A named, rooted repository checkout plus its VCS state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// Repository name, also its directory name in the workspace.
    pub name: String,
    /// Checkout root.
    pub root: PathBuf,
    /// Commit identifier, once known.
    pub commit: Option<String>,
}

impl RepositoryHandle {
    /// Handle for `name` under `workspace`; nothing is cloned yet.
    pub fn new(workspace: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            root: workspace.join(name),
            commit: None,
        }
    }

    /// Absolute path of a repository-relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}
