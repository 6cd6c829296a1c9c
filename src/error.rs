//! # Error Handling
//!
//! This module defines the centralized error type for `scroll-split`. It uses
//! `thiserror` to derive a single `Error` enum covering every failure the
//! pipeline can run into, each variant carrying enough context to be copied
//! verbatim into the split report.
//!
//! ## Taxonomy
//!
//! Errors fall into three groups, which the orchestrator treats differently:
//!
//! - **Load errors** (`ManifestLoad`, `SceneDirectoryMissing`): the run has
//!   nothing to work on. These abort the run, but a report is still written.
//! - **External tool errors** (`GitClone`, `GitCommand`, `BuildTool`,
//!   `PullRequest`, `CommandTimeout`): raised by the collaborator wrappers.
//!   Each is classified as [`FailureKind::Transient`] or
//!   [`FailureKind::Permanent`] so the process runner knows whether a single
//!   retry is worthwhile.
//! - **Per-file errors** (`Descriptor`, `Filesystem`, `Path`, `Io`, ...):
//!   caught close to their source by the phases and recorded as warnings.
//!
//! The `Result` alias is used throughout the library.

use thiserror::Error;

/// Whether retrying an external operation could plausibly succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network hiccups and timeouts.
    Transient,
    /// Authentication, missing refs, logic errors.
    Permanent,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transient => write!(f, "transient"),
            FailureKind::Permanent => write!(f, "permanent"),
        }
    }
}

/// Main error type for scroll-split operations
#[derive(Error, Debug)]
pub enum Error {
    /// The split manifest could not be read or is not valid structured data.
    ///
    /// A missing file and malformed content are deliberately the same kind:
    /// both are configuration defects the run cannot recover from.
    #[error("Failed to load manifest {path}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestLoad {
        path: String,
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// The watched subtree does not exist in the source repository.
    #[error("Scene directory not found: {path}")]
    SceneDirectoryMissing { path: String },

    /// Cloning or checking out a repository failed.
    #[error("Git clone error for {url}@{r#ref}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
        kind: FailureKind,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A git command other than clone failed.
    #[error("Git command failed in {repo}: {command} - {stderr}")]
    GitCommand {
        command: String,
        repo: String,
        stderr: String,
        kind: FailureKind,
    },

    /// Configuring or compiling a repository failed.
    #[error("Build tool error for {repo}: {tool} - {message}")]
    BuildTool {
        tool: String,
        repo: String,
        message: String,
    },

    /// Creating a pull request failed.
    #[error("Pull request error for {repo}: {message}")]
    PullRequest {
        repo: String,
        message: String,
        kind: FailureKind,
    },

    /// An external command exceeded its time budget and was killed.
    #[error("Command timed out after {seconds}s: {command}")]
    CommandTimeout { command: String, seconds: u64 },

    /// A build descriptor could not be edited or generated.
    #[error("Build descriptor error in {file}: {message}")]
    Descriptor { file: String, message: String },

    /// An error occurred with a filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An error indicating that a mutex has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Classify the error for the retry policy.
    ///
    /// Only errors raised by external tools can be transient; everything
    /// else is permanent.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::GitClone { kind, .. }
            | Error::GitCommand { kind, .. }
            | Error::PullRequest { kind, .. } => *kind,
            Error::CommandTimeout { .. } => FailureKind::Transient,
            _ => FailureKind::Permanent,
        }
    }

    /// Returns true when the error means the run has nothing to work on.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Error::ManifestLoad { .. } | Error::SceneDirectoryMissing { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_manifest_load() {
        let error = Error::ManifestLoad {
            path: "split_manifest.json".to_string(),
            message: "No such file or directory".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to load manifest"));
        assert!(display.contains("split_manifest.json"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_manifest_load_with_hint() {
        let error = Error::ManifestLoad {
            path: "m.json".to_string(),
            message: "missing field `implementation`".to_string(),
            hint: Some("Add 'scene_files.implementation' to the manifest".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("hint:"));
        assert!(display.contains("scene_files.implementation"));
    }

    #[test]
    fn test_error_display_scene_directory_missing() {
        let error = Error::SceneDirectoryMissing {
            path: "/tmp/ws/scroll/sway/tree/scene".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Scene directory not found: /tmp/ws/scroll/sway/tree/scene"
        );
        assert!(error.is_load_error());
    }

    #[test]
    fn test_error_display_git_clone() {
        let error = Error::GitClone {
            url: "https://github.com/scrollwm/scroll.git".to_string(),
            r#ref: "1.11.3".to_string(),
            message: "Authentication failed".to_string(),
            kind: FailureKind::Permanent,
            hint: Some("Check your token".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git clone error"));
        assert!(display.contains("scroll.git@1.11.3"));
        assert!(display.contains("hint: Check your token"));
        assert!(!error.is_load_error());
    }

    #[test]
    fn test_failure_kind_classification() {
        let timeout = Error::CommandTimeout {
            command: "git clone".to_string(),
            seconds: 5,
        };
        assert_eq!(timeout.failure_kind(), FailureKind::Transient);

        let push = Error::GitCommand {
            command: "push".to_string(),
            repo: "scene-scroll".to_string(),
            stderr: "Could not resolve host".to_string(),
            kind: FailureKind::Transient,
        };
        assert_eq!(push.failure_kind(), FailureKind::Transient);

        let io: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(io.failure_kind(), FailureKind::Permanent);
    }

    #[test]
    fn test_error_from_regex_error() {
        let regex_error = regex::Error::Syntax("Invalid regex".to_string());
        let error: Error = regex_error.into();
        assert!(error.to_string().contains("Regex error"));
    }

    #[test]
    fn test_error_display_build_tool() {
        let error = Error::BuildTool {
            tool: "meson setup".to_string(),
            repo: "scene-scroll".to_string(),
            message: "Dependency wlroots-0.20 not found".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("Build tool error for scene-scroll"));
        assert!(display.contains("meson setup"));
    }
}
