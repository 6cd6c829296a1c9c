//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::Parser;

use crate::commands;
use scroll_split::config::LogLevel;
use scroll_split::output::{ColorChoice, OutputConfig};

/// Scroll Split - Split Scroll into scene-scroll and scroll-standalone
#[derive(Parser, Debug)]
#[command(name = "scroll-split")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    split: commands::split::SplitArgs,

    /// Colorize output
    #[arg(long, value_name = "WHEN", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info", value_parser = parse_log_level)]
    log_level: LogLevel,
}

fn parse_log_level(value: &str) -> std::result::Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| {
        format!(
            "invalid log level '{}' (expected error, warn, info, debug or trace)",
            value
        )
    })
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let output = OutputConfig::resolve(self.color);
        commands::split::execute(self.split, self.log_level, &output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_accepts_warning() {
        let cli = Cli::try_parse_from(["scroll-split", "1.11.3", "--log-level", "WARNING"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert!(Cli::try_parse_from(["scroll-split", "1.11.3", "--log-level", "loud"]).is_err());
    }
}
