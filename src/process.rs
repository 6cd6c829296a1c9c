//! External process execution with a time budget and a single retry.
//!
//! All collaborator wrappers (`git`, `meson`, `ninja`, `gh`, `pkg-config`)
//! run through [`CommandRunner`]. A command that outlives its budget is killed
//! and reported as [`Error::CommandTimeout`]. [`with_retry`] retries an
//! operation exactly once when its error is classified as transient.

use crate::error::{Error, FailureKind, Result};
use log::{debug, error, warn};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands with a fixed time budget.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(crate::defaults::command_timeout())
    }
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program args...` in `cwd` with extra environment variables.
    ///
    /// A non-zero exit is not an error here; callers inspect
    /// [`CommandOutput::success`] and map failures to their own variants.
    pub fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        envs: &[(&str, &str)],
    ) -> Result<CommandOutput> {
        let display = render_command(program, args);
        debug!(
            "Running command: {} in {}",
            display,
            cwd.map(|p| p.display().to_string())
                .unwrap_or_else(|| ".".to_string())
        );

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        for (key, value) in envs {
            command.env(key, value);
        }

        let mut child = command.spawn()?;
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                // Best effort: the child may have exited between polls
                let _ = child.kill();
                let _ = child.wait();
                error!(
                    "Command timed out after {}s: {}",
                    self.timeout.as_secs(),
                    display
                );
                return Err(Error::CommandTimeout {
                    command: display,
                    seconds: self.timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let output = CommandOutput {
            success: status.success(),
            code: status.code(),
            stdout: stdout_reader.join().unwrap_or_default(),
            stderr: stderr_reader.join().unwrap_or_default(),
        };

        if !output.success {
            error!(
                "Command failed with exit code {}: {}",
                output
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                display
            );
            if !output.stderr.trim().is_empty() {
                error!("stderr: {}", output.stderr.trim());
            }
            if !output.stdout.trim().is_empty() {
                error!("stdout: {}", output.stdout.trim());
            }
        }

        Ok(output)
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn render_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classify a failed command's stderr.
///
/// Authentication and missing-ref failures are permanent; connectivity
/// problems are transient. Anything unrecognised is treated as permanent so
/// a logic error is never retried.
pub fn classify_stderr(stderr: &str) -> FailureKind {
    const PERMANENT: &[&str] = &[
        "Authentication failed",
        "Permission denied",
        "could not read Username",
        "Repository not found",
        "did not match any",
        "HTTP 401",
        "HTTP 403",
    ];
    const TRANSIENT: &[&str] = &[
        "Could not resolve host",
        "Connection timed out",
        "Connection reset",
        "Connection refused",
        "early EOF",
        "The remote end hung up unexpectedly",
        "Operation timed out",
        "HTTP 502",
        "HTTP 503",
        "HTTP 504",
    ];

    if PERMANENT.iter().any(|needle| stderr.contains(needle)) {
        FailureKind::Permanent
    } else if TRANSIENT.iter().any(|needle| stderr.contains(needle)) {
        FailureKind::Transient
    } else {
        FailureKind::Permanent
    }
}

/// Run `op`, retrying exactly once if the first error is transient.
pub fn with_retry<T, F>(label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    match op() {
        Err(e) if e.failure_kind() == FailureKind::Transient => {
            warn!("{} failed with a transient error, retrying once: {}", label, e);
            op()
        }
        other => other,
    }
}
