//! Phase 2: Structure Analysis
//!
//! Reconciles the manifest's declared file set against the files actually
//! present in the source checkout.
//!
//! ## Process
//!
//! 1.  **Enumeration**: every regular file under the watched subtree is
//!     collected as a repository-relative path.
//! 2.  **Classification**: each declared path (implementation files first,
//!     then headers, in declaration order) is *matched* if it was enumerated
//!     or exists directly on disk, and *missing* otherwise. The direct check
//!     covers headers declared outside the watched subtree.
//! 3.  **Unexpected files**: enumerated paths that nobody declared, sorted.
//!
//! Only a missing watched subtree is fatal. Every other discrepancy is
//! data for the caller.

use std::collections::HashSet;

use log::{debug, info};

use super::StructureReport;
use crate::error::{Error, Result};
use crate::filesystem::{DiskFileOperations, FileOperations};
use crate::manifest::SplitManifest;
use crate::path::to_repo_relative;
use crate::repository::RepositoryHandle;

/// Executes the analysis phase against the source checkout.
pub fn execute(source: &RepositoryHandle, manifest: &SplitManifest) -> Result<StructureReport> {
    let scene_dir = source.path(&manifest.scene_root);
    if !scene_dir.is_dir() {
        return Err(Error::SceneDirectoryMissing {
            path: scene_dir.display().to_string(),
        });
    }

    // The source checkout is only ever read, never written
    let present: Vec<String> = DiskFileOperations
        .list_files(&scene_dir, &[])?
        .iter()
        .map(|path| to_repo_relative(&source.root, path))
        .collect::<Result<_>>()?;
    debug!(
        "Found {} files under {}",
        present.len(),
        manifest.scene_root
    );

    let present_set: HashSet<&str> = present.iter().map(String::as_str).collect();
    let expected = manifest.expected_files();

    let mut report = StructureReport::default();
    for declared in &expected {
        if present_set.contains(declared.as_str()) || source.path(declared).is_file() {
            report.matched.push(declared.clone());
        } else {
            report.missing.push(declared.clone());
        }
    }

    let expected_set: HashSet<&str> = expected.iter().map(String::as_str).collect();
    let prefix = format!("{}/", manifest.scene_root);
    report.unexpected = present
        .iter()
        .filter(|path| path.starts_with(&prefix) && !expected_set.contains(path.as_str()))
        .cloned()
        .collect();
    report.unexpected.sort();

    info!(
        "Structure analysis: {} matched, {} missing, {} unexpected",
        report.matched.len(),
        report.missing.len(),
        report.unexpected.len()
    );
    Ok(report)
}
