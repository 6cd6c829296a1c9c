//! Phase 3: Extraction
//!
//! Copies every matched file from the source checkout into the library,
//! routed by file role, then generates the library's build descriptor and
//! origin README from what actually landed there.
//!
//! Routing flattens the source layout on purpose: `.c` files go to `src/`
//! under their base name, headers go to `include/scene-scroll/`, and the one
//! header living under an `include/` path becomes the public `scene.h`.

use std::path::PathBuf;

use log::{debug, info, warn};

use super::PhaseContribution;
use crate::defaults;
use crate::descriptor::{render_readme, LibraryDescriptor};
use crate::error::Result;
use crate::filesystem::FileOperations;
use crate::path::{base_name, extension};
use crate::repository::RepositoryHandle;

/// Library-relative destination for a matched source path, or `None` when
/// the file type has no route.
pub fn route(source_path: &str) -> Option<String> {
    match extension(source_path) {
        Some("c") => Some(format!(
            "{}/{}",
            defaults::LIBRARY_SRC_DIR,
            base_name(source_path)
        )),
        Some("h") => {
            let name = if source_path.contains("include/") {
                defaults::PUBLIC_HEADER
            } else {
                base_name(source_path)
            };
            Some(format!("{}/{}", defaults::LIBRARY_INCLUDE_DIR, name))
        }
        _ => None,
    }
}

/// Executes the extraction phase.
///
/// Per-file failures are logged and recorded as warnings; they never abort
/// the batch.
pub fn execute(
    source: &RepositoryHandle,
    library: &RepositoryHandle,
    matched: &[String],
    version: &str,
    files: &dyn FileOperations,
) -> PhaseContribution {
    let mut contribution = PhaseContribution::default();

    for source_path in matched {
        let Some(destination) = route(source_path) else {
            warn!("Unknown file type: {}", source_path);
            contribution.warning(format!("Unknown file type: {}", source_path));
            continue;
        };
        let from = source.path(source_path);
        let to = library.path(&destination);
        match files.copy(&from, &to) {
            Ok(()) => {
                debug!("Extracted {} -> {}", source_path, destination);
                contribution.extracted.push(to);
            }
            Err(e) => {
                warn!("Failed to extract {}: {}", source_path, e);
                contribution.warning(format!("Failed to extract {}: {}", source_path, e));
            }
        }
    }
    info!("Extracted {} files", contribution.extracted.len());

    if let Err(e) = generate_build_files(library, version, files) {
        log::error!("Failed to generate build files: {}", e);
        contribution.error(format!("Failed to generate build files: {}", e));
    }

    contribution
}

/// Write `meson.build` and `README.md` into the library root.
///
/// Sources are the `.c` files directly inside the library's `src/`;
/// auxiliary headers are installed only if present.
pub fn generate_build_files(
    library: &RepositoryHandle,
    version: &str,
    files: &dyn FileOperations,
) -> Result<Vec<PathBuf>> {
    let src_dir = library.path(defaults::LIBRARY_SRC_DIR);
    let sources: Vec<String> = files
        .list_files(&src_dir, &[])?
        .into_iter()
        .filter(|path| path.parent() == Some(src_dir.as_path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("c"))
        .filter_map(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .collect();

    let include_dir = library.path(defaults::LIBRARY_INCLUDE_DIR);
    let auxiliary: Vec<&str> = defaults::AUXILIARY_HEADERS
        .iter()
        .copied()
        .filter(|header| files.exists(&include_dir.join(header)))
        .collect();

    let descriptor = LibraryDescriptor::new(sources, auxiliary);
    let build_file = library.path("meson.build");
    files.write(&build_file, &descriptor.render())?;
    info!(
        "Generated {} with {} sources",
        build_file.display(),
        descriptor.sources().len()
    );

    let generated_at = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    let readme = library.path("README.md");
    files.write(&readme, &render_readme(version, &generated_at))?;

    Ok(vec![build_file, readme])
}
