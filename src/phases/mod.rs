//! Implementation of the six phases of a split run.
//!
//! ## Overview
//!
//! A run moves through these phases strictly in order:
//! 1. Setup - Clone the source at the target version and both target repos
//! 2. Analysis - Reconcile the manifest against the source tree
//! 3. Extraction - Copy matched files into the library and generate its build files
//! 4. Rewiring - Point the consumer at the external library
//! 5. Verification - Optionally configure and compile both targets
//! 6. Publishing - Branch, commit, push and open pull requests
//!
//! Each phase returns its own [`PhaseContribution`] (or a typed result that
//! converts into one); the orchestrator merges contributions into the single
//! [`SplitOutcome`] it owns. No phase sees or mutates the outcome directly.

use std::path::PathBuf;

pub mod analyze;
pub mod extract;
pub mod orchestrator;
pub mod publish;
pub mod rewire;
pub mod setup;
pub mod verify;

/// States of a run, in order. A fatal error ends the run where it stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SplitState {
    Init,
    Cloned,
    Analyzed,
    Extracted,
    Rewired,
    Verified,
    Published,
    Done,
}

impl std::fmt::Display for SplitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SplitState::Init => "init",
            SplitState::Cloned => "cloned",
            SplitState::Analyzed => "analyzed",
            SplitState::Extracted => "extracted",
            SplitState::Rewired => "rewired",
            SplitState::Verified => "verified",
            SplitState::Published => "published",
            SplitState::Done => "done",
        };
        f.write_str(name)
    }
}

/// How build verification went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Verification disabled by configuration.
    Skipped,
    /// Verification enabled but suppressed by dry run.
    SkippedDryRun,
    Passed,
    Failed,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VerificationStatus::Skipped => "SKIPPED",
            VerificationStatus::SkippedDryRun => "SKIPPED (dry run)",
            VerificationStatus::Passed => "PASSED",
            VerificationStatus::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// What a single phase adds to the outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseContribution {
    /// Destination paths written into the library.
    pub extracted: Vec<PathBuf>,
    /// Consumer paths whose content changed.
    pub modified: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Pull request identifiers that were created.
    pub pull_requests: Vec<String>,
}

impl PhaseContribution {
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record a modified consumer path once.
    pub fn modified(&mut self, path: PathBuf) {
        if !self.modified.contains(&path) {
            self.modified.push(path);
        }
    }

    /// Append `other` after the entries already recorded.
    pub fn absorb(&mut self, other: PhaseContribution) {
        self.extracted.extend(other.extracted);
        for path in other.modified {
            self.modified(path);
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.pull_requests.extend(other.pull_requests);
    }
}

/// Three-way classification of declared vs observed files.
///
/// Every entry is a repository-relative, forward-slash path, whether it was
/// declared in the manifest or enumerated from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReport {
    /// Declared and present, in declaration order.
    pub matched: Vec<String>,
    /// Declared and absent, in declaration order.
    pub missing: Vec<String>,
    /// Present under the watched subtree but undeclared, sorted.
    pub unexpected: Vec<String>,
}

impl StructureReport {
    /// Missing files are errors; unexpected files are warnings.
    pub fn contribution(&self) -> PhaseContribution {
        let mut contribution = PhaseContribution::default();
        if !self.missing.is_empty() {
            contribution.error(format!(
                "Missing {} expected files: {}",
                self.missing.len(),
                self.missing.join(", ")
            ));
        }
        if !self.unexpected.is_empty() {
            contribution.warning(format!(
                "Found {} unexpected files: {}",
                self.unexpected.len(),
                self.unexpected.join(", ")
            ));
        }
        contribution
    }
}

/// The accumulated result of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    pub success: bool,
    /// Source commit the split was taken from; empty until cloned.
    pub source_commit: String,
    pub extracted_files: Vec<PathBuf>,
    pub modified_files: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub missing_files: Vec<String>,
    pub unexpected_files: Vec<String>,
    pub pull_requests: Vec<String>,
    /// Current state; every run ends in `Done`, successful or not.
    pub state: SplitState,
    /// Last phase that completed before the run reached `Done`.
    pub last_phase: SplitState,
    pub verification: VerificationStatus,
    /// Where the report was written, once it has been.
    pub report_path: Option<PathBuf>,
}

impl Default for SplitOutcome {
    fn default() -> Self {
        Self {
            success: false,
            source_commit: String::new(),
            extracted_files: Vec::new(),
            modified_files: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            missing_files: Vec::new(),
            unexpected_files: Vec::new(),
            pull_requests: Vec::new(),
            state: SplitState::Init,
            last_phase: SplitState::Init,
            verification: VerificationStatus::Skipped,
            report_path: None,
        }
    }
}

impl SplitOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a phase's contribution, preserving order.
    pub fn merge(&mut self, contribution: PhaseContribution) {
        self.extracted_files.extend(contribution.extracted);
        for path in contribution.modified {
            if !self.modified_files.contains(&path) {
                self.modified_files.push(path);
            }
        }
        self.errors.extend(contribution.errors);
        self.warnings.extend(contribution.warnings);
        self.pull_requests.extend(contribution.pull_requests);
    }

    /// Record the structure analysis, including its diagnostics.
    pub fn merge_structure(&mut self, report: &StructureReport) {
        self.missing_files = report.missing.clone();
        self.unexpected_files = report.unexpected.clone();
        self.merge(report.contribution());
    }

    pub fn advance(&mut self, state: SplitState) {
        log::debug!("Split state: {} -> {}", self.state, state);
        if state != SplitState::Done {
            self.last_phase = state;
        }
        self.state = state;
    }
}
