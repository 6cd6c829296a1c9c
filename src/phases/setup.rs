//! Phase 1: Setup
//!
//! Clones the source repository at the requested version and both target
//! repositories at their default branch into the workspace. Each clone is a
//! fresh, full checkout; an existing directory at the target path is replaced.
//!
//! Any clone or checkout failure is fatal: without all three checkouts the
//! later phases have nothing to work on. The source is cloned first so its
//! commit can be reported even when a target clone fails.

use log::info;

use crate::config::SplitConfig;
use crate::error::Result;
use crate::repository::{RepositoryHandle, VcsOperations};

/// The three checkouts a run works on.
#[derive(Debug, Clone)]
pub struct Checkouts {
    /// Source repository; its `commit` is always set.
    pub source: RepositoryHandle,
    pub library: RepositoryHandle,
    pub consumer: RepositoryHandle,
}

/// Clones the source at the requested version and records its commit.
///
/// Runs before the targets are cloned so the commit is known even when a
/// target clone fails.
pub fn clone_source(config: &SplitConfig, vcs: &dyn VcsOperations) -> Result<RepositoryHandle> {
    let mut source = config.source_repo();

    info!("Cloning {} at {}", source.name, config.version);
    vcs.clone_repository(
        &config.remotes.url(&source.name),
        Some(&config.version),
        &source.root,
    )?;
    let commit = vcs.current_commit(&source.root)?;
    info!("Source commit: {}", commit);
    source.commit = Some(commit);
    Ok(source)
}

/// Clones both targets at their default branch.
pub fn clone_targets(
    config: &SplitConfig,
    vcs: &dyn VcsOperations,
    source: RepositoryHandle,
) -> Result<Checkouts> {
    let library = config.library_repo();
    let consumer = config.consumer_repo();

    for target in [&library, &consumer] {
        info!("Cloning {}", target.name);
        vcs.clone_repository(&config.remotes.url(&target.name), None, &target.root)?;
    }

    Ok(Checkouts {
        source,
        library,
        consumer,
    })
}
