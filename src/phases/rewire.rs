//! Phase 4: Rewiring
//!
//! Turns the consumer checkout into a client of the extracted library:
//!
//! 1.  Removes the consumer's own copy of the watched subtree.
//! 2.  Applies the manifest's rewrite rules to every consumer source file
//!     selected by the manifest's source patterns.
//! 3.  Declares the library dependency in the top-level `meson.build`.
//! 4.  Drops the extracted sources from the nested `meson.build` and adds
//!     the library to its dependency list.
//! 5.  Replaces the old public header with a redirect to the library's.
//!
//! Every step reports a path as modified only if its content actually
//! changed, and every write goes through the run's [`FileOperations`].
//! Re-running the phase on an already rewired consumer changes nothing.

use std::path::Path;

use log::{debug, info, warn};

use super::PhaseContribution;
use crate::defaults;
use crate::error::{Error, Result};
use crate::filesystem::FileOperations;
use crate::manifest::{CompiledRule, SplitManifest};
use crate::meson;
use crate::path::{glob_match, to_repo_relative};
use crate::repository::RepositoryHandle;

/// Variable the consumer's build uses for the library.
pub const DEPENDENCY_VARIABLE: &str = "scene_scroll_dep";

const DEPENDENCY_DECLARATION: &str =
    "\n\n# Scene-scroll dependency\nscene_scroll_dep = dependency('scene-scroll', required: true)\n";

/// Content of the consumer's redirect header.
pub const REDIRECT_CONTENT: &str = "#ifndef _SWAY_SCENE_REDIRECT_H
#define _SWAY_SCENE_REDIRECT_H

// Redirect to external scene-scroll library
#include <scene-scroll/scene.h>

#endif
";

/// Result of editing one build descriptor in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorEdit {
    pub content: String,
    pub changed: bool,
    /// Set when the edit could not be applied where expected.
    pub warning: Option<String>,
}

impl DescriptorEdit {
    fn unchanged(content: &str) -> Self {
        Self {
            content: content.to_string(),
            changed: false,
            warning: None,
        }
    }
}

/// Apply `rules` in order, each to the previous rule's output.
pub fn rewrite_content(content: &str, rules: &[CompiledRule]) -> String {
    rules.iter().fold(content.to_string(), |current, rule| {
        rule.apply(&current).into_owned()
    })
}

/// Rewrite one file in place. Returns whether its content changed.
pub fn rewrite_file(path: &Path, rules: &[CompiledRule], files: &dyn FileOperations) -> Result<bool> {
    let original = files.read_to_string(path)?;
    let rewritten = rewrite_content(&original, rules);
    if rewritten == original {
        return Ok(false);
    }
    files.write(path, &rewritten)?;
    debug!("Updated includes in {}", path.display());
    Ok(true)
}

/// Declare the library dependency right after the `wlroots` subproject.
pub fn update_top_level_descriptor(content: &str) -> DescriptorEdit {
    if content.contains(defaults::LIBRARY_REPO) || content.contains(DEPENDENCY_VARIABLE) {
        return DescriptorEdit::unchanged(content);
    }
    match meson::find_assignment_call(content, "wlroots", "subproject") {
        Some(span) => {
            let mut updated = String::with_capacity(content.len() + DEPENDENCY_DECLARATION.len());
            updated.push_str(&content[..span.end]);
            updated.push_str(DEPENDENCY_DECLARATION);
            updated.push_str(&content[span.end..]);
            DescriptorEdit {
                content: updated,
                changed: true,
                warning: None,
            }
        }
        None => DescriptorEdit {
            content: content.to_string(),
            changed: false,
            warning: Some(
                "No 'wlroots = subproject(...)' anchor in meson.build; scene-scroll dependency not declared"
                    .to_string(),
            ),
        },
    }
}

/// Remove `'<scene_subpath>/*.c'` entries and add the library to the first
/// `dependencies: [...]` list.
pub fn update_nested_descriptor(content: &str, scene_subpath: &str) -> Result<DescriptorEdit> {
    let entry = format!(r"{}/[^']+\.c", regex::escape(scene_subpath));
    let mut updated = meson::remove_string_entries(content, &entry)?;
    let mut warning = None;

    match meson::find_keyword_array(&updated, "dependencies") {
        Some(array) if !array.contains(DEPENDENCY_VARIABLE) => {
            updated = meson::append_to_array(&updated, &array, DEPENDENCY_VARIABLE);
        }
        Some(_) => {}
        None => {
            if !updated.contains(DEPENDENCY_VARIABLE) {
                warning = Some(format!(
                    "No 'dependencies: [...]' list to add {} to",
                    DEPENDENCY_VARIABLE
                ));
            }
        }
    }

    Ok(DescriptorEdit {
        changed: updated != content,
        content: updated,
        warning,
    })
}

/// Executes the rewiring phase against the consumer checkout.
pub fn execute(
    consumer: &RepositoryHandle,
    manifest: &SplitManifest,
    files: &dyn FileOperations,
) -> PhaseContribution {
    let mut contribution = PhaseContribution::default();

    let scene_dir = consumer.path(&manifest.scene_root);
    if files.exists(&scene_dir) {
        match files.remove_dir_all(&scene_dir) {
            Ok(()) => debug!("Removed {}", scene_dir.display()),
            Err(e) => {
                warn!("Failed to remove {}: {}", scene_dir.display(), e);
                contribution.warning(format!("Failed to remove {}: {}", manifest.scene_root, e));
            }
        }
    }

    rewrite_sources(consumer, manifest, files, &mut contribution);

    let top_level = consumer.path("meson.build");
    apply_descriptor_edit(&top_level, files, &mut contribution, |content| {
        Ok(update_top_level_descriptor(content))
    });

    // `sway/tree/scene` is listed in `sway/meson.build` as `tree/scene/...`
    if let Some((first, rest)) = manifest.scene_root.split_once('/') {
        let nested = consumer.path(&format!("{}/meson.build", first));
        apply_descriptor_edit(&nested, files, &mut contribution, |content| {
            update_nested_descriptor(content, rest)
        });
    }

    let redirect = consumer.path(defaults::REDIRECT_HEADER);
    let current = files.read_to_string(&redirect).ok();
    if current.as_deref() != Some(REDIRECT_CONTENT) {
        match files.write(&redirect, REDIRECT_CONTENT) {
            Ok(()) => contribution.modified(redirect),
            Err(e) => {
                warn!("Failed to write redirect header: {}", e);
                contribution.warning(format!("Failed to write redirect header: {}", e));
            }
        }
    }

    info!("Modified {} consumer files", contribution.modified.len());
    contribution
}

fn rewrite_sources(
    consumer: &RepositoryHandle,
    manifest: &SplitManifest,
    files: &dyn FileOperations,
    contribution: &mut PhaseContribution,
) {
    let candidates = match files.list_files(&consumer.root, defaults::SKIP_DIRS) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Failed to scan {}: {}", consumer.root.display(), e);
            contribution.warning(format!("Failed to scan {}: {}", consumer.name, e));
            return;
        }
    };

    for path in candidates {
        let selected = match to_repo_relative(&consumer.root, &path) {
            Ok(relative) => manifest
                .source_patterns
                .iter()
                .any(|pattern| glob_match(pattern, &relative).unwrap_or(false)),
            Err(_) => false,
        };
        if !selected {
            continue;
        }
        match rewrite_file(&path, &manifest.rewrite_rules, files) {
            Ok(true) => contribution.modified(path),
            Ok(false) => {}
            Err(e) => {
                log::error!("Failed to update {}: {}", path.display(), e);
                contribution.warning(format!("Failed to update {}: {}", path.display(), e));
            }
        }
    }
}

fn apply_descriptor_edit<F>(
    path: &Path,
    files: &dyn FileOperations,
    contribution: &mut PhaseContribution,
    edit: F,
) where
    F: FnOnce(&str) -> Result<DescriptorEdit>,
{
    if !files.exists(path) {
        warn!("{} not found, skipping", path.display());
        contribution.warning(format!("Build descriptor not found: {}", path.display()));
        return;
    }

    let result = files.read_to_string(path).and_then(|content| {
        edit(&content).map_err(|e| Error::Descriptor {
            file: path.display().to_string(),
            message: e.to_string(),
        })
    });
    let outcome = result.and_then(|edit| {
        if edit.changed {
            files.write(path, &edit.content)?;
        }
        Ok(edit)
    });

    match outcome {
        Ok(edit) => {
            if let Some(warning) = edit.warning {
                warn!("{}", warning);
                contribution.warning(warning);
            }
            if edit.changed {
                debug!("Updated {}", path.display());
                contribution.modified(path.to_path_buf());
            }
        }
        Err(e) => {
            log::error!("Failed to update {}: {}", path.display(), e);
            contribution.warning(format!("Failed to update {}: {}", path.display(), e));
        }
    }
}
