//! Default values for scroll-split.
//!
//! This module provides centralized default values and fixed layout names
//! used across the pipeline, ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Manifest file looked up when `--manifest` is not given.
pub const MANIFEST_FILE: &str = "split_manifest.json";

/// Remote organization hosting all three repositories.
pub const REMOTE_BASE: &str = "https://github.com/scrollwm";

/// Name of the monolithic source repository.
pub const SOURCE_REPO: &str = "scroll";

/// Name of the extracted library repository.
pub const LIBRARY_REPO: &str = "scene-scroll";

/// Name of the consumer repository rewired onto the library.
pub const CONSUMER_REPO: &str = "scroll-standalone";

/// Watched subtree, relative to the source repository root.
pub const SCENE_ROOT: &str = "sway/tree/scene";

/// Where extracted `.c` files land inside the library.
pub const LIBRARY_SRC_DIR: &str = "src";

/// Where extracted headers land inside the library.
pub const LIBRARY_INCLUDE_DIR: &str = "include/scene-scroll";

/// Canonical public entry-point header of the library.
pub const PUBLIC_HEADER: &str = "scene.h";

/// Headers installed alongside the public header when present.
pub const AUXILIARY_HEADERS: &[&str] = &["color.h", "output.h"];

/// Redirect header written into the consumer.
pub const REDIRECT_HEADER: &str = "include/sway/tree/scene.h";

/// Globs selecting consumer files the rewrite rules run over.
pub const SOURCE_PATTERNS: &[&str] = &["**/*.c", "**/*.h"];

/// Directories never scanned when discovering consumer sources.
pub const SKIP_DIRS: &[&str] = &[".git", "build"];

/// Default time budget for a single external command, in seconds.
pub const COMMAND_TIMEOUT_SECS: u64 = 600;

/// Creates a fresh workspace directory for a split of `version`.
///
/// The directory lives under the platform temporary directory and is named
/// `scroll_split_<version>_<YYYYmmdd_HHMMSS>_<random>`, so concurrent runs of
/// the same version never share a workspace. It is kept after the run for
/// inspection.
pub fn default_workspace(version: &str) -> Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let prefix = format!("scroll_split_{}_{}_", version.replace('/', "-"), stamp);
    let dir = tempfile::Builder::new()
        .prefix(&prefix)
        .tempdir()
        .map_err(|e| Error::Filesystem {
            message: format!("Failed to create workspace directory: {}", e),
        })?;
    Ok(dir.keep())
}

/// Returns the default command timeout as a `Duration`.
pub fn command_timeout() -> Duration {
    Duration::from_secs(COMMAND_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workspace_names_version() {
        let workspace = default_workspace("1.11.3").unwrap();
        let name = workspace.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("scroll_split_1.11.3_"));
        assert!(workspace.starts_with(std::env::temp_dir()));
        assert!(workspace.is_dir());
        std::fs::remove_dir_all(&workspace).unwrap();
    }

    #[test]
    fn test_default_workspace_sanitizes_refs() {
        let workspace = default_workspace("release/1.11").unwrap();
        let name = workspace.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("scroll_split_release-1.11_"));
        assert_eq!(workspace.parent(), Some(std::env::temp_dir().as_path()));
        std::fs::remove_dir_all(&workspace).unwrap();
    }

    #[test]
    fn test_default_workspace_is_unique_per_call() {
        // Both calls land in the same second, so the timestamp alone would collide
        let first = default_workspace("1.11.3").unwrap();
        let second = default_workspace("1.11.3").unwrap();
        assert_ne!(first, second);
        assert!(first.is_dir());
        assert!(second.is_dir());
        std::fs::remove_dir_all(&first).unwrap();
        std::fs::remove_dir_all(&second).unwrap();
    }

    #[test]
    fn test_public_header_is_under_include_dir() {
        assert!(!AUXILIARY_HEADERS.contains(&PUBLIC_HEADER));
        assert!(LIBRARY_INCLUDE_DIR.ends_with(LIBRARY_REPO));
    }
}
