//! Phase 6: Publishing
//!
//! For the library and then the consumer: create an update branch, commit
//! everything, push it through a token-authenticated remote and open a draft
//! pull request. The consumer's PR links the library's.
//!
//! A dry run mutates nothing here: each repository gets the placeholder
//! identifier [`DRY_RUN_PR`]. Failures in one repository do not stop the
//! other; they are summarised as a single warning.

use chrono::{Local, NaiveDate};
use log::{error, info, warn};

use super::{PhaseContribution, VerificationStatus};
use crate::config::SplitConfig;
use crate::git::authenticated_remote;
use crate::repository::{PullRequestOperations, RepositoryHandle, VcsOperations};

/// Identifier reported for a pull request that a dry run would have opened.
pub const DRY_RUN_PR: &str = "dry-run-pr";

/// Branch name for an update to `version` made on `date`.
pub fn branch_name(version: &str, date: NaiveDate) -> String {
    format!("update-{}-{}", version, date.format("%Y%m%d"))
}

pub fn pr_title(version: &str) -> String {
    format!("Update to Scroll {}", version)
}

/// Body shared by both pull requests.
pub fn pr_body(
    version: &str,
    source_commit: &str,
    generated_at: &str,
    verification: VerificationStatus,
) -> String {
    format!(
        "## Automated Split from Scroll {version}

This PR was automatically generated by the scroll-split-tools automation.

**Source**: Scroll commit `{source_commit}`
**Date**: {generated_at}

### Changes
- Updated from upstream Scroll version {version}
- All modifications were applied automatically
- Build verification: {verification}

### Files Modified
- See commit diff for detailed changes

---
*Generated by [scroll-split-tools](https://github.com/scrollwm/scroll-split-tools)*
"
    )
}

/// Executes the publishing phase.
pub fn execute(
    config: &SplitConfig,
    library: &RepositoryHandle,
    consumer: &RepositoryHandle,
    source_commit: &str,
    verification: VerificationStatus,
    vcs: &dyn VcsOperations,
    pull_requests: &dyn PullRequestOperations,
) -> PhaseContribution {
    let mut contribution = PhaseContribution::default();

    let now = Local::now();
    let branch = branch_name(&config.version, now.date_naive());
    let title = pr_title(&config.version);
    let body = pr_body(
        &config.version,
        source_commit,
        &now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        verification,
    );

    let publisher = Publisher {
        config,
        vcs,
        pull_requests,
        branch: &branch,
        title: &title,
    };

    let library_pr = publisher.publish(library, &body);
    let consumer_body = format!(
        "{}\n\n**Related PR**: {}",
        body,
        library_pr.as_deref().unwrap_or("None")
    );
    let consumer_pr = publisher.publish(consumer, &consumer_body);

    match (&library_pr, &consumer_pr) {
        (Some(_), Some(_)) => info!("Successfully created both PRs"),
        _ => contribution.warning("Failed to create one or more PRs"),
    }
    contribution
        .pull_requests
        .extend(library_pr.into_iter().chain(consumer_pr));
    contribution
}

struct Publisher<'a> {
    config: &'a SplitConfig,
    vcs: &'a dyn VcsOperations,
    pull_requests: &'a dyn PullRequestOperations,
    branch: &'a str,
    title: &'a str,
}

impl Publisher<'_> {
    /// Returns the PR identifier, or `None` on any failure.
    fn publish(&self, repo: &RepositoryHandle, body: &str) -> Option<String> {
        if self.config.dry_run {
            info!("[DRY RUN] Would create PR for {}", repo.name);
            return Some(DRY_RUN_PR.to_string());
        }

        info!("Creating PR for {}...", repo.name);
        let root = repo.root.as_path();

        if let Err(e) = self.vcs.create_branch(root, self.branch) {
            error!("Failed to create branch {} in {}: {}", self.branch, repo.name, e);
            return None;
        }
        if let Err(e) = self.vcs.stage_all(root) {
            error!("Failed to stage changes in {}: {}", repo.name, e);
            return None;
        }
        if let Err(e) = self.vcs.commit(root, self.title) {
            error!("Failed to commit changes in {}: {}", repo.name, e);
            return None;
        }

        match self.config.token.as_deref() {
            Some(token) => {
                info!("Setting authenticated remote URL for {}", repo.name);
                let set = authenticated_remote(&self.config.remotes.base, &repo.name, token)
                    .and_then(|url| self.vcs.set_remote_auth(root, &url));
                if let Err(e) = set {
                    // A push may still succeed with ambient credentials
                    error!("Failed to set remote URL for {}: {}", repo.name, e);
                }
            }
            None => warn!("No GitHub token available!"),
        }

        if let Err(e) = self.vcs.push(root, self.branch) {
            error!("Failed to push branch {} for {}: {}", self.branch, repo.name, e);
            return None;
        }
        info!("Successfully pushed branch {}", self.branch);

        self.pull_requests.create(root, self.title, body, true)
    }
}
