//! # Terminal Output
//!
//! Colour and emoji decisions for the run summary printed by the CLI. The
//! log file and the report are never coloured; only stdout is.
//!
//! For `--color=auto` the environment decides: `NO_COLOR` (any value) and
//! `CLICOLOR=0` turn colour off, `CLICOLOR_FORCE` turns it on, `TERM=dumb`
//! turns it off, and otherwise it is on when stdout is a colour terminal.

use clap::ValueEnum;
use console::style;

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    Always,
    Never,
    #[default]
    Auto,
}

/// Whether the summary may use colour and emoji.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` choice against the process environment.
    pub fn resolve(choice: ColorChoice) -> Self {
        let use_color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => color_from_env(
                |name| std::env::var_os(name).map(|v| v.to_string_lossy().into_owned()),
                || console::Term::stdout().features().colors_supported(),
            ),
        };
        Self { use_color }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::resolve(ColorChoice::Auto)
    }
}

fn color_from_env<F, T>(lookup: F, terminal_supports_color: T) -> bool
where
    F: Fn(&str) -> Option<String>,
    T: FnOnce() -> bool,
{
    // https://no-color.org/
    if lookup("NO_COLOR").is_some() {
        return false;
    }
    if lookup("CLICOLOR").as_deref() == Some("0") {
        return false;
    }
    if lookup("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if lookup("TERM").as_deref() == Some("dumb") {
        return false;
    }
    terminal_supports_color()
}

/// `emoji_str` when colour is on, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// `SUCCESS` in green or `FAILED` in red, uncoloured when colour is off.
pub fn status_label(config: &OutputConfig, success: bool) -> String {
    let label = if success { "SUCCESS" } else { "FAILED" };
    if !config.use_color {
        return label.to_string();
    }
    let styled = if success {
        style(label).green().bold()
    } else {
        style(label).red().bold()
    };
    styled.force_styling(true).to_string()
}
