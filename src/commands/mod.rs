//! # CLI Command Implementations
//!
//! `scroll-split` has a single command, the split run itself. It follows the
//! usual layout of a command module:
//! - An `Args` struct that defines the command's arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `scroll_split` library to do the work.

pub mod split;
