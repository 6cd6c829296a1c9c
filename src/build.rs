//! Meson/Ninja wrappers used for optional build verification.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::process::CommandRunner;
use log::{error, info};

fn repo_label(repo: &Path) -> String {
    repo.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| repo.display().to_string())
}

/// Run `meson setup build` in `repo`, starting from a clean build directory.
pub fn configure(runner: &CommandRunner, repo: &Path) -> Result<()> {
    let build_dir = repo.join("build");
    if build_dir.exists() {
        fs::remove_dir_all(&build_dir)?;
    }

    let output = runner.run("meson", &["setup", "build"], Some(repo), &[])?;
    if output.success {
        return Ok(());
    }

    error!("Meson setup failed for {}", repo_label(repo));
    let combined = format!("{}\n{}", output.stdout, output.stderr);
    if combined.to_lowercase().contains("dependency") {
        report_pkg_config(runner);
    }

    Err(Error::BuildTool {
        tool: "meson setup".to_string(),
        repo: repo_label(repo),
        message: last_line(&combined),
    })
}

/// Run `ninja -C build` in `repo`.
pub fn compile(runner: &CommandRunner, repo: &Path) -> Result<()> {
    let output = runner.run("ninja", &["-C", "build"], Some(repo), &[])?;
    if output.success {
        info!("Build successful for {}", repo_label(repo));
        return Ok(());
    }

    error!("Compilation failed for {}", repo_label(repo));
    Err(Error::BuildTool {
        tool: "ninja".to_string(),
        repo: repo_label(repo),
        message: last_line(&format!("{}\n{}", output.stdout, output.stderr)),
    })
}

/// Log whether wlroots is visible to pkg-config; configure failures that
/// mention a dependency are almost always this.
fn report_pkg_config(runner: &CommandRunner) {
    error!("Possible missing dependency. Checking available pkg-config packages...");
    match runner.run("pkg-config", &["--list-all"], None, &[]) {
        Ok(output) if output.success => {
            if output.stdout.contains("wlroots") {
                info!("wlroots found in pkg-config");
            } else {
                error!("wlroots NOT found in pkg-config");
            }
        }
        Ok(_) => error!("pkg-config --list-all failed"),
        Err(e) => error!("Could not run pkg-config: {}", e),
    }
}

fn last_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or("no output")
        .to_string()
}
