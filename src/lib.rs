//! # Scroll Split Library
//!
//! This library splits the monolithic Scroll window manager repository into
//! two derivative repositories: `scene-scroll`, a library holding the scene
//! graph, and `scroll-standalone`, a consumer rewired to depend on it
//! externally. It backs the `scroll-split` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use scroll_split::manifest;
//! use scroll_split::phases::rewire::rewrite_content;
//!
//! let manifest = manifest::parse_json(
//!     r##"{
//!         "scene_files": {"implementation": ["sway/tree/scene/scene.c"]},
//!         "modifications": {"include_patterns": [
//!             {"from": "#include \"sway/tree/scene\\.h\"",
//!              "to": "#include <scene-scroll/scene.h>"}
//!         ]}
//!     }"##,
//!     "split_manifest.json",
//! )
//! .unwrap();
//!
//! let rewritten = rewrite_content("#include \"sway/tree/scene.h\"\n", &manifest.rewrite_rules);
//! assert_eq!(rewritten, "#include <scene-scroll/scene.h>\n");
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: the declarative list of scene files and the
//!   include rewrite rules driving a split.
//! - **Apply-or-preview files (`filesystem`)**: every write to a target
//!   repository goes through one `FileOperations` value; a dry run swaps in
//!   an in-memory preview so nothing on disk changes.
//! - **Collaborators (`repository`, `git`, `build`, `github`, `process`)**:
//!   narrow traits over `git`, `meson`/`ninja` and `gh`, each external
//!   command bounded in time and retried once on transient failure.
//! - **Build descriptors (`meson`, `descriptor`)**: structural edits of the
//!   consumer's `meson.build` files and generation of the library's.
//! - **Phases (`phases`)**: the pipeline itself.
//!
//! ## Execution Flow
//!
//! `phases::orchestrator::Splitter` runs, strictly in order:
//!
//! 1.  **Setup**: clone the source at the requested version and both targets.
//! 2.  **Analysis**: classify declared files as matched, missing or unexpected.
//! 3.  **Extraction**: copy matched files into the library and generate its
//!     `meson.build` and README.
//! 4.  **Rewiring**: rewrite the consumer's includes and build files.
//! 5.  **Verification**: optionally build both targets.
//! 6.  **Publishing**: push update branches and open draft pull requests.
//!
//! Problems along the way are collected into a `SplitOutcome`; only a missing
//! manifest, a missing scene directory or a failed clone stop the run. A
//! Markdown report is written to the workspace in every case.

pub mod build;
pub mod config;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod github;
pub mod logging;
pub mod manifest;
pub mod meson;
pub mod output;
pub mod path;
pub mod phases;
pub mod process;
pub mod report;
pub mod repository;

#[cfg(test)]
mod path_proptest;
