//! Markdown report of a split run.
//!
//! The report is written into the workspace root at the end of every run,
//! including runs that aborted early. It is never routed through the
//! dry-run preview: the workspace belongs to the run, and a dry run exists
//! precisely to produce this document.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{Error, Result};
use crate::path::to_repo_relative;
use crate::phases::SplitOutcome;

/// Run facts the outcome itself does not carry.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub version: &'a str,
    /// Consumer root; modified paths are shown relative to it.
    pub consumer_root: &'a Path,
    pub dry_run: bool,
    pub generated_at: DateTime<Local>,
}

/// File name of the report generated at `at`.
pub fn file_name(at: &DateTime<Local>) -> String {
    format!("split_report_{}.md", at.format("%Y%m%d_%H%M%S"))
}

/// Render the report text.
pub fn render(outcome: &SplitOutcome, context: &ReportContext<'_>) -> String {
    let mut out = String::new();
    out.push_str("# Scroll Split Operation Report\n\n");
    out.push_str(&format!(
        "**Date**: {}\n",
        context.generated_at.format("%Y-%m-%dT%H:%M:%S")
    ));
    out.push_str(&format!("**Scroll Version**: {}\n", context.version));
    out.push_str(&format!("**Scroll Commit**: {}\n", outcome.source_commit));
    out.push_str(&format!(
        "**Status**: {}\n",
        if outcome.success { "SUCCESS" } else { "FAILED" }
    ));
    out.push_str(&format!("**Last Phase**: {}\n", outcome.last_phase));
    if context.dry_run {
        out.push_str("**Mode**: DRY RUN (no repository was modified)\n");
    }
    out.push('\n');

    out.push_str("## Summary\n\n");
    out.push_str(&format!(
        "- Scene files extracted: {}\n",
        outcome.extracted_files.len()
    ));
    out.push_str(&format!(
        "- Standalone files modified: {}\n",
        outcome.modified_files.len()
    ));
    out.push_str(&format!("- Missing files: {}\n", outcome.missing_files.len()));
    out.push_str(&format!(
        "- Unexpected files: {}\n",
        outcome.unexpected_files.len()
    ));
    out.push_str(&format!("- Build verification: {}\n", outcome.verification));
    out.push_str(&format!("- Errors: {}\n", outcome.errors.len()));
    out.push_str(&format!("- Warnings: {}\n\n", outcome.warnings.len()));

    bullet_section(&mut out, "Errors", outcome.errors.iter().cloned());
    bullet_section(&mut out, "Warnings", outcome.warnings.iter().cloned());
    bullet_section(&mut out, "Pull Requests", outcome.pull_requests.iter().cloned());

    let mut extracted: Vec<String> = outcome
        .extracted_files
        .iter()
        .map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        })
        .collect();
    extracted.sort();
    out.push_str("## Scene Files Extracted\n\n");
    for name in extracted {
        out.push_str(&format!("- `{}`\n", name));
    }

    let mut modified: Vec<String> = outcome
        .modified_files
        .iter()
        .map(|path| {
            to_repo_relative(context.consumer_root, path)
                .unwrap_or_else(|_| path.display().to_string())
        })
        .collect();
    modified.sort();
    out.push_str("\n## Standalone Files Modified\n\n");
    for path in modified {
        out.push_str(&format!("- `{}`\n", path));
    }

    if !outcome.missing_files.is_empty() {
        out.push('\n');
        bullet_section(
            &mut out,
            "Missing Files",
            outcome.missing_files.iter().map(|p| format!("`{}`", p)),
        );
    }
    if !outcome.unexpected_files.is_empty() {
        if outcome.missing_files.is_empty() {
            out.push('\n');
        }
        bullet_section(
            &mut out,
            "Unexpected Files",
            outcome.unexpected_files.iter().map(|p| format!("`{}`", p)),
        );
    }

    out
}

fn bullet_section<I>(out: &mut String, heading: &str, items: I)
where
    I: IntoIterator<Item = String>,
{
    let mut items = items.into_iter().peekable();
    if items.peek().is_none() {
        return;
    }
    out.push_str(&format!("## {}\n\n", heading));
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
    out.push('\n');
}

/// Render and write the report into `workspace`, returning its path.
pub fn write(workspace: &Path, outcome: &SplitOutcome, context: &ReportContext<'_>) -> Result<PathBuf> {
    fs::create_dir_all(workspace).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to create workspace '{}': {}",
            workspace.display(),
            e
        ),
    })?;
    let path = workspace.join(file_name(&context.generated_at));
    fs::write(&path, render(outcome, context)).map_err(|e| Error::Filesystem {
        message: format!("Failed to write report '{}': {}", path.display(), e),
    })?;
    log::info!("Report generated: {}", path.display());
    Ok(path)
}
