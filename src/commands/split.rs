//! Split command implementation
//!
//! Runs the full six-phase split of one Scroll version:
//! 1. Clone the source and both target repositories
//! 2. Analyze the source against the manifest
//! 3. Extract the scene files into scene-scroll
//! 4. Rewire scroll-standalone onto scene-scroll
//! 5. Optionally verify both builds
//! 6. Open pull requests

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use scroll_split::config::{LogLevel, RemoteLayout, SplitConfig};
use scroll_split::defaults;
use scroll_split::logging;
use scroll_split::output::{emoji, status_label, OutputConfig};
use scroll_split::phases::orchestrator::Splitter;
use scroll_split::phases::SplitOutcome;

/// Arguments for a split run
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Scroll version to split (tag, branch or commit, e.g. 1.11.3)
    #[arg(id = "target_version", value_name = "VERSION")]
    pub version: String,

    /// Path to the split manifest (JSON, or YAML by extension)
    #[arg(
        short,
        long,
        value_name = "PATH",
        env = "SCROLL_SPLIT_MANIFEST",
        default_value = defaults::MANIFEST_FILE
    )]
    pub manifest: PathBuf,

    /// Workspace directory (defaults to a fresh temporary directory)
    #[arg(short, long, value_name = "PATH")]
    pub workspace: Option<PathBuf>,

    /// Show what would be done without modifying any repository
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip creating pull requests
    #[arg(long)]
    pub no_prs: bool,

    /// Configure and compile both repositories before publishing
    #[arg(long, conflicts_with = "skip_build_verification")]
    pub verify_builds: bool,

    /// Skip build verification (the default)
    #[arg(long)]
    pub skip_build_verification: bool,

    /// GitHub token used for pushing and opening pull requests
    #[arg(long, value_name = "TOKEN", env = "GH_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Organization URL hosting the three repositories
    #[arg(long, value_name = "URL", env = "SCROLL_SPLIT_REMOTE_BASE")]
    pub remote_base: Option<String>,

    /// Time budget for each external command, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = defaults::COMMAND_TIMEOUT_SECS)]
    pub command_timeout: u64,
}

impl SplitArgs {
    /// Build the run configuration for `workspace`.
    pub fn to_config(&self, workspace: PathBuf, log_level: LogLevel) -> SplitConfig {
        let mut config = SplitConfig::new(&self.version, &workspace, &self.manifest);
        config.dry_run = self.dry_run;
        config.create_pull_requests = !self.no_prs;
        config.token = self.github_token.clone().filter(|t| !t.is_empty());
        config.log_level = log_level;
        config.skip_build_verification = !self.verify_builds;
        if let Some(base) = &self.remote_base {
            config.remotes = RemoteLayout::with_base(base);
        }
        config.command_timeout = Duration::from_secs(self.command_timeout);
        config
    }
}

/// Execute a split run
pub fn execute(args: SplitArgs, log_level: LogLevel, output: &OutputConfig) -> Result<()> {
    let workspace = match &args.workspace {
        Some(workspace) => workspace.clone(),
        None => defaults::default_workspace(&args.version)?,
    };
    let log_file = logging::init(&workspace, log_level)
        .with_context(|| format!("Failed to set up logging in {}", workspace.display()))?;

    println!(
        "{} Scroll Split {}",
        emoji(output, "🔍", "[SPLIT]"),
        args.version
    );
    if args.dry_run {
        println!(
            "{} DRY RUN MODE - No repository will be modified",
            emoji(output, "🔎", "[DRY RUN]")
        );
    }
    println!("   Workspace: {}", workspace.display());
    println!();

    let config = args.to_config(workspace, log_level);
    let outcome = Splitter::new(config).run();

    print_summary(&outcome, output);
    println!("   Log: {}", log_file.display());

    if !outcome.success {
        anyhow::bail!(
            "Split of {} failed: {}",
            args.version,
            outcome
                .errors
                .last()
                .map(String::as_str)
                .unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn print_summary(outcome: &SplitOutcome, output: &OutputConfig) {
    let mark = if outcome.success {
        emoji(output, "✅", "[OK]")
    } else {
        emoji(output, "❌", "[FAILED]")
    };
    println!("{} Status: {}", mark, status_label(output, outcome.success));
    println!("   {} scene files extracted", outcome.extracted_files.len());
    println!("   {} standalone files modified", outcome.modified_files.len());
    if !outcome.missing_files.is_empty() {
        println!("   {} expected files missing", outcome.missing_files.len());
    }
    if !outcome.unexpected_files.is_empty() {
        println!("   {} unexpected files", outcome.unexpected_files.len());
    }
    println!("   Build verification: {}", outcome.verification);
    for pr in &outcome.pull_requests {
        println!("   PR: {}", pr);
    }
    if !outcome.warnings.is_empty() {
        println!(
            "{} {} warnings",
            emoji(output, "⚠️", "[WARN]"),
            outcome.warnings.len()
        );
    }
    if !outcome.errors.is_empty() {
        println!(
            "{} {} errors",
            emoji(output, "❌", "[ERROR]"),
            outcome.errors.len()
        );
    }
    if let Some(report) = &outcome.report_path {
        println!("   Report: {}", report.display());
    }
}
