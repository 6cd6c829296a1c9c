//! Phase 5: Build Verification
//!
//! Optionally configures and compiles the library and then the consumer.
//! A failing build is recorded (an error plus a warning) and the run moves on
//! to publishing: verification never flips the run's success flag.

use log::{error, info, warn};

use super::{PhaseContribution, VerificationStatus};
use crate::error::Result;
use crate::repository::{BuildOperations, RepositoryHandle};

/// Status plus the diagnostics it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub status: VerificationStatus,
    pub contribution: PhaseContribution,
}

/// Executes the verification phase.
///
/// `skip` disables verification; a dry run suppresses it because the
/// targets on disk do not contain the previewed changes.
pub fn execute(
    targets: &[&RepositoryHandle],
    build: &dyn BuildOperations,
    skip: bool,
    dry_run: bool,
) -> Verification {
    let mut contribution = PhaseContribution::default();

    if skip {
        info!("Skipping build verification");
        return Verification {
            status: VerificationStatus::Skipped,
            contribution,
        };
    }
    if dry_run {
        info!("Skipping build verification in dry run");
        return Verification {
            status: VerificationStatus::SkippedDryRun,
            contribution,
        };
    }

    let mut status = VerificationStatus::Passed;
    for repo in targets {
        info!("Verifying build for {}...", repo.name);
        match verify_one(repo, build) {
            Ok(()) => info!("Build verification passed for {}", repo.name),
            Err(e) => {
                error!("Build failed for {}: {}", repo.name, e);
                contribution.error(format!("{} build failed: {}", repo.name, e));
                warn!("Build verification failed for {} but continuing anyway", repo.name);
                contribution.warning(format!(
                    "Build verification failed for {} but continuing anyway",
                    repo.name
                ));
                status = VerificationStatus::Failed;
            }
        }
    }

    Verification {
        status,
        contribution,
    }
}

fn verify_one(repo: &RepositoryHandle, build: &dyn BuildOperations) -> Result<()> {
    build.configure(&repo.root)?;
    build.compile(&repo.root)
}
