//! Orchestrator for a complete split run
//!
//! [`Splitter`] drives the six phases strictly in order and owns the single
//! [`SplitOutcome`] of the run. Phases hand back their contributions and the
//! orchestrator merges them; a fatal error stops the pipeline, is recorded
//! as an error, and the report is written regardless of where the run
//! stopped. Every run ends in `Done`; `last_phase` tells how far it got.

use log::{error, info, warn};

use super::{analyze, extract, publish, rewire, setup, verify};
use super::{SplitOutcome, SplitState};
use crate::config::SplitConfig;
use crate::error::Result;
use crate::filesystem::{self, FileOperations};
use crate::manifest;
use crate::process::CommandRunner;
use crate::report::{self, ReportContext};
use crate::repository::Collaborators;

/// Runs one split.
pub struct Splitter {
    config: SplitConfig,
    collaborators: Collaborators,
    files: Box<dyn FileOperations>,
}

impl Splitter {
    /// Splitter backed by the real `git`, `meson`/`ninja` and `gh`.
    pub fn new(config: SplitConfig) -> Self {
        let runner = CommandRunner::new(config.command_timeout);
        let collaborators = Collaborators::new(runner, config.token.clone());
        Self::with_collaborators(config, collaborators)
    }

    /// Splitter with injected collaborators.
    ///
    /// This is primarily used for testing to run the pipeline without
    /// network access or build toolchains.
    pub fn with_collaborators(config: SplitConfig, collaborators: Collaborators) -> Self {
        let files = filesystem::for_mode(config.dry_run);
        Self {
            config,
            collaborators,
            files,
        }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// The file operations every phase writes through.
    pub fn files(&self) -> &dyn FileOperations {
        self.files.as_ref()
    }

    /// Execute the run. Never fails: every problem ends up in the outcome,
    /// and the report is always written.
    pub fn run(&self) -> SplitOutcome {
        let mut outcome = SplitOutcome::new();

        match self.run_phases(&mut outcome) {
            Ok(()) => {
                outcome.success = true;
                info!("=== Split Operation Completed Successfully ===");
            }
            Err(e) => {
                if e.is_load_error() {
                    error!("Nothing to split: {}", e);
                } else {
                    error!("Split operation failed after {}: {}", outcome.last_phase, e);
                }
                outcome.success = false;
                outcome.errors.push(e.to_string());
            }
        }
        outcome.advance(SplitState::Done);

        let consumer = self.config.consumer_repo();
        let context = ReportContext {
            version: &self.config.version,
            consumer_root: &consumer.root,
            dry_run: self.config.dry_run,
            generated_at: chrono::Local::now(),
        };
        match report::write(&self.config.workspace, &outcome, &context) {
            Ok(path) => outcome.report_path = Some(path),
            Err(e) => warn!("Failed to write report: {}", e),
        }

        outcome
    }

    fn run_phases(&self, outcome: &mut SplitOutcome) -> Result<()> {
        if self.config.dry_run {
            info!("Dry run: target repositories and remotes will not be modified");
        }
        let manifest = manifest::load(&self.config.manifest_path)?;

        info!("=== Phase 1: Repository Setup ===");
        let vcs = self.collaborators.vcs.as_ref();
        let source = setup::clone_source(&self.config, vcs)?;
        outcome.source_commit = source.commit.clone().unwrap_or_default();
        let checkouts = setup::clone_targets(&self.config, vcs, source)?;
        outcome.advance(SplitState::Cloned);

        info!("=== Phase 2: Structure Analysis ===");
        let structure = analyze::execute(&checkouts.source, &manifest)?;
        outcome.merge_structure(&structure);
        outcome.advance(SplitState::Analyzed);

        info!("=== Phase 3: Scene Extraction ===");
        outcome.merge(extract::execute(
            &checkouts.source,
            &checkouts.library,
            &structure.matched,
            &self.config.version,
            self.files(),
        ));
        outcome.advance(SplitState::Extracted);

        info!("=== Phase 4: Standalone Update ===");
        outcome.merge(rewire::execute(
            &checkouts.consumer,
            &manifest,
            self.files(),
        ));
        outcome.advance(SplitState::Rewired);

        info!("=== Phase 5: Build Verification ===");
        let verification = verify::execute(
            &[&checkouts.library, &checkouts.consumer],
            self.collaborators.build.as_ref(),
            self.config.skip_build_verification,
            self.config.dry_run,
        );
        outcome.verification = verification.status;
        outcome.merge(verification.contribution);
        outcome.advance(SplitState::Verified);

        if self.config.create_pull_requests {
            info!("=== Phase 6: Creating Pull Requests ===");
            let published = publish::execute(
                &self.config,
                &checkouts.library,
                &checkouts.consumer,
                &outcome.source_commit,
                outcome.verification,
                self.collaborators.vcs.as_ref(),
                self.collaborators.pull_requests.as_ref(),
            );
            outcome.merge(published);
            outcome.advance(SplitState::Published);
        } else {
            info!("Skipping pull request creation");
        }

        Ok(())
    }
}
