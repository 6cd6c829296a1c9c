//! Apply-or-preview filesystem access
//!
//! Every mutating operation in the pipeline goes through a single
//! [`FileOperations`] instance chosen once by the orchestrator:
//!
//! - [`DiskFileOperations`] writes straight to the host filesystem.
//! - [`PreviewFileOperations`] stages writes in an in-memory [`MemoryFS`]
//!   and records directory removals, leaving the disk untouched. Reads go
//!   through the staging area first, so later phases of a dry run observe
//!   exactly what earlier phases would have written.
//!
//! Components never look at the dry-run flag themselves.

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// Represents a staged file
#[derive(Debug, Clone)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }
}

/// In-memory filesystem keyed by full path
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: HashMap<PathBuf, File>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) {
        self.files.insert(path.as_ref().to_path_buf(), file);
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) {
        self.add_file(path, File::from_string(content))
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// Returns true if any file lives under `dir`
    pub fn has_files_under<P: AsRef<Path>>(&self, dir: P) -> bool {
        let dir = dir.as_ref();
        self.files.keys().any(|p| p.starts_with(dir) && p != dir)
    }

    /// Remove every file under `dir`
    pub fn remove_under<P: AsRef<Path>>(&mut self, dir: P) {
        let dir = dir.as_ref();
        self.files.retain(|p, _| !p.starts_with(dir));
    }

    /// List all files, sorted
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// The narrow capability through which all reads and writes of target
/// repositories are routed.
pub trait FileOperations: Send + Sync {
    /// True when writes are only being previewed.
    fn is_preview(&self) -> bool;

    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Check whether a file or directory exists.
    fn exists(&self, path: &Path) -> bool;

    /// Recursively list regular files under `dir`, sorted, skipping any
    /// directory whose name is in `skip_dirs`. A missing `dir` lists nothing.
    fn list_files(&self, dir: &Path, skip_dirs: &[&str]) -> Result<Vec<PathBuf>>;

    /// Write text to `path`, creating parent directories as needed.
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Copy `from` to `to`, creating parent directories as needed.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove a directory tree. Removing a missing directory is a no-op.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

/// Returns the file operations matching the dry-run flag.
pub fn for_mode(dry_run: bool) -> Box<dyn FileOperations> {
    if dry_run {
        Box::new(PreviewFileOperations::new())
    } else {
        Box::new(DiskFileOperations)
    }
}

fn walk_files(dir: &Path, skip_dirs: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Always allow the root directory (depth 0) to be processed
            if e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            !(e.file_type().is_dir() && skip_dirs.contains(&name))
        })
    {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("Failed to walk {}: {}", dir.display(), e),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn skipped(path: &Path, root: &Path, skip_dirs: &[&str]) -> bool {
    path.strip_prefix(root)
        .map(|rel| {
            rel.parent()
                .map(|parent| {
                    parent
                        .components()
                        .any(|c| skip_dirs.contains(&c.as_os_str().to_str().unwrap_or("")))
                })
                .unwrap_or(false)
        })
        .unwrap_or(true)
}

/// Writes straight to the host filesystem.
pub struct DiskFileOperations;

impl FileOperations for DiskFileOperations {
    fn is_preview(&self) -> bool {
        false
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| Error::Filesystem {
            message: format!("Failed to read '{}': {}", path.display(), e),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(&self, dir: &Path, skip_dirs: &[&str]) -> Result<Vec<PathBuf>> {
        walk_files(dir, skip_dirs)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }
        fs::write(path, content).map_err(|e| Error::Filesystem {
            message: format!("Failed to write file '{}': {}", path.display(), e),
        })
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }
        fs::copy(from, to).map_err(|e| Error::Filesystem {
            message: format!(
                "Failed to copy '{}' to '{}': {}",
                from.display(),
                to.display(),
                e
            ),
        })?;
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        fs::remove_dir_all(path).map_err(|e| Error::Filesystem {
            message: format!("Failed to remove '{}': {}", path.display(), e),
        })
    }
}

/// Stages writes in memory; the disk is never modified.
#[derive(Default)]
pub struct PreviewFileOperations {
    staged: Mutex<MemoryFS>,
    removed: Mutex<Vec<PathBuf>>,
}

impl PreviewFileOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths that would have been written, sorted.
    pub fn staged_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self.lock_staged()?.list_files())
    }

    /// Directories that would have been removed, in removal order.
    pub fn removed_dirs(&self) -> Result<Vec<PathBuf>> {
        Ok(self.lock_removed()?.clone())
    }

    fn lock_staged(&self) -> Result<std::sync::MutexGuard<'_, MemoryFS>> {
        self.staged.lock().map_err(|_| Error::LockPoisoned {
            context: "preview staging area".to_string(),
        })
    }

    fn lock_removed(&self) -> Result<std::sync::MutexGuard<'_, Vec<PathBuf>>> {
        self.removed.lock().map_err(|_| Error::LockPoisoned {
            context: "preview removal list".to_string(),
        })
    }

    fn is_removed(&self, path: &Path) -> Result<bool> {
        Ok(self.lock_removed()?.iter().any(|dir| path.starts_with(dir)))
    }
}

impl FileOperations for PreviewFileOperations {
    fn is_preview(&self) -> bool {
        true
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        if let Some(file) = self.lock_staged()?.get_file(path) {
            return String::from_utf8(file.content.clone()).map_err(|e| Error::Filesystem {
                message: format!("Staged file '{}' is not UTF-8: {}", path.display(), e),
            });
        }
        if self.is_removed(path)? {
            return Err(Error::Filesystem {
                message: format!("Failed to read '{}': removed in this run", path.display()),
            });
        }
        DiskFileOperations.read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        let staged = match self.lock_staged() {
            Ok(staged) => staged.exists(path) || staged.has_files_under(path),
            Err(_) => false,
        };
        if staged {
            return true;
        }
        !self.is_removed(path).unwrap_or(false) && path.exists()
    }

    fn list_files(&self, dir: &Path, skip_dirs: &[&str]) -> Result<Vec<PathBuf>> {
        let mut files: BTreeSet<PathBuf> = BTreeSet::new();
        for path in walk_files(dir, skip_dirs)? {
            if !self.is_removed(&path)? {
                files.insert(path);
            }
        }
        for path in self.lock_staged()?.list_files() {
            if path.starts_with(dir) && !skipped(&path, dir, skip_dirs) {
                files.insert(path);
            }
        }
        Ok(files.into_iter().collect())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        log::debug!("[DRY RUN] Would write {}", path.display());
        self.lock_staged()?.add_file_string(path, content);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let content = match self.lock_staged()?.get_file(from) {
            Some(file) => file.content.clone(),
            None => fs::read(from).map_err(|e| Error::Filesystem {
                message: format!("Failed to read '{}': {}", from.display(), e),
            })?,
        };
        log::debug!(
            "[DRY RUN] Would copy {} to {}",
            from.display(),
            to.display()
        );
        self.lock_staged()?.add_file(to, File::new(content));
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        log::debug!("[DRY RUN] Would remove {}", path.display());
        self.lock_staged()?.remove_under(path);
        self.lock_removed()?.push(path.to_path_buf());
        Ok(())
    }
}
