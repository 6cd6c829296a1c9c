//! Pull request creation through the GitHub CLI (`gh`).

use std::path::Path;

use crate::error::{Error, Result};
use crate::process::{classify_stderr, with_retry, CommandRunner};
use log::info;

/// Open a pull request for the current branch of `repo`.
///
/// Returns the PR URL printed by `gh`. The token, when given, is passed as
/// `GH_TOKEN` so `gh` does not need a prior login.
pub fn create_pull_request(
    runner: &CommandRunner,
    repo: &Path,
    title: &str,
    body: &str,
    draft: bool,
    token: Option<&str>,
) -> Result<String> {
    let mut args = vec!["pr", "create", "--title", title, "--body", body];
    if draft {
        args.push("--draft");
    }
    let envs: Vec<(&str, &str)> = token.map(|t| vec![("GH_TOKEN", t)]).unwrap_or_default();
    let label = repo
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    with_retry("gh pr create", || {
        let output = runner.run("gh", &args, Some(repo), &envs)?;
        if output.success {
            let url = output.stdout.trim().to_string();
            info!("Created PR: {}", url);
            Ok(url)
        } else {
            Err(Error::PullRequest {
                repo: label.clone(),
                message: output.stderr.trim().to_string(),
                kind: classify_stderr(&output.stderr),
            })
        }
    })
}
