//! # Run Configuration
//!
//! [`SplitConfig`] holds the parameters of one split run. It is built once
//! (normally by the CLI) and never changes afterwards. The workspace root is
//! exclusively owned by the run: the three repositories are checked out
//! directly beneath it and the report is written into it.

use crate::defaults;
use crate::repository::RepositoryHandle;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the three repositories live remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    /// Organization URL, e.g. `https://github.com/scrollwm`.
    pub base: String,
    pub source: String,
    pub library: String,
    pub consumer: String,
}

impl Default for RemoteLayout {
    fn default() -> Self {
        Self::with_base(defaults::REMOTE_BASE)
    }
}

impl RemoteLayout {
    /// Default repository names under a different organization URL.
    pub fn with_base(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            source: defaults::SOURCE_REPO.to_string(),
            library: defaults::LIBRARY_REPO.to_string(),
            consumer: defaults::CONSUMER_REPO.to_string(),
        }
    }

    pub fn url(&self, repo_name: &str) -> String {
        crate::git::remote_url(&self.base, repo_name)
    }
}

/// Verbosity of the run's log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse a level name case-insensitively; `warning` is accepted for `warn`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Parameters of a single split run.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Source version to split (tag, branch or commit).
    pub version: String,
    pub workspace: PathBuf,
    pub manifest_path: PathBuf,
    /// Compute and report changes without writing target repositories or
    /// touching remotes.
    pub dry_run: bool,
    pub create_pull_requests: bool,
    pub token: Option<String>,
    pub log_level: LogLevel,
    pub skip_build_verification: bool,
    pub remotes: RemoteLayout,
    pub command_timeout: Duration,
}

impl SplitConfig {
    /// Configuration with the CLI defaults: pull requests on, build
    /// verification off, not a dry run.
    pub fn new(version: &str, workspace: &Path, manifest_path: &Path) -> Self {
        Self {
            version: version.to_string(),
            workspace: workspace.to_path_buf(),
            manifest_path: manifest_path.to_path_buf(),
            dry_run: false,
            create_pull_requests: true,
            token: None,
            log_level: LogLevel::Info,
            skip_build_verification: true,
            remotes: RemoteLayout::default(),
            command_timeout: defaults::command_timeout(),
        }
    }

    pub fn source_repo(&self) -> RepositoryHandle {
        RepositoryHandle::new(&self.workspace, &self.remotes.source)
    }

    pub fn library_repo(&self) -> RepositoryHandle {
        RepositoryHandle::new(&self.workspace, &self.remotes.library)
    }

    pub fn consumer_repo(&self) -> RepositoryHandle {
        RepositoryHandle::new(&self.workspace, &self.remotes.consumer)
    }
}
