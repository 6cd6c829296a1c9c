//! Logger setup for a split run.
//!
//! Every record goes to stderr and to a timestamped `split_<stamp>.log` in
//! the workspace, formatted as `<timestamp> - scroll_split - <LEVEL> - <message>`.
//! `RUST_LOG`, when set, overrides the level chosen on the command line.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use env_logger::{Builder, Target};

use crate::config::LogLevel;
use crate::error::{Error, Result};

/// Writes every byte to stderr and to the log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // The log file is authoritative; stderr is best effort
        let _ = io::stderr().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}

/// File name of the log for a run started at `at`.
pub fn file_name(at: &DateTime<Local>) -> String {
    format!("split_{}.log", at.format("%Y%m%d_%H%M%S"))
}

/// Format one record the way the log file expects it.
pub fn format_line(at: &DateTime<Local>, level: log::Level, message: &str) -> String {
    format!(
        "{} - scroll_split - {} - {}",
        at.format("%Y-%m-%d %H:%M:%S,%3f"),
        level,
        message
    )
}

/// Install the global logger, returning the log file path.
///
/// Installing twice is not an error; the first logger stays in place.
pub fn init(workspace: &Path, level: LogLevel) -> Result<PathBuf> {
    fs::create_dir_all(workspace).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to create workspace '{}': {}",
            workspace.display(),
            e
        ),
    })?;
    let path = workspace.join(file_name(&Local::now()));
    let file = File::create(&path).map_err(|e| Error::Filesystem {
        message: format!("Failed to create log file '{}': {}", path.display(), e),
    })?;

    let mut builder = Builder::new();
    builder
        .filter_level(level.to_filter())
        .target(Target::Pipe(Box::new(Tee { file })))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(&Local::now(), record.level(), &record.args().to_string())
            )
        });
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    if builder.try_init().is_err() {
        log::debug!("Logger already installed");
    }
    Ok(path)
}
