//! # Scroll Split CLI
//!
//! This is the binary entry point for the `scroll-split` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Running the split and printing a summary.
//! - Translating a failed run into a non-zero exit code.
//!
//! The pipeline itself lives in the `scroll_split` library crate; the binary
//! is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
