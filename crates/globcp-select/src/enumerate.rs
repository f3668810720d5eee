//! Source tree enumeration

use globcp_types::{Error, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Every regular file under a source root, as absolute paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFileSet {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl SourceFileSet {
    /// Build a file set from already-known paths
    pub fn from_files<P: Into<PathBuf>>(root: P, files: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    /// Absolute source root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files in enumeration order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the tree holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Make `root` absolute against the working directory and fold `.`/`..`
/// segments lexically. Symlinks are not resolved.
pub fn absolute_root(root: &Path) -> Result<PathBuf> {
    let joined = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()?.join(root)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}

/// Check that `root` is an existing, readable directory and return its absolute form
pub fn validate_source_root(root: &Path) -> Result<PathBuf> {
    if root.as_os_str().is_empty() {
        return Err(Error::invalid_source(root, "source folder is not set"));
    }

    let absolute = absolute_root(root)?;
    let metadata = std::fs::metadata(&absolute)
        .map_err(|e| Error::invalid_source(&absolute, e.to_string()))?;
    if !metadata.is_dir() {
        return Err(Error::invalid_source(&absolute, "not a directory"));
    }
    std::fs::read_dir(&absolute).map_err(|e| Error::invalid_source(&absolute, e.to_string()))?;

    Ok(absolute)
}

/// Recursively list every non-directory entry under `root`, dot-files included.
///
/// Symbolic links are followed: a linked directory contributes the files
/// below it, never the link itself. Link cycles and dangling links are
/// skipped with a warning.
///
/// Entries are visited in file-name order so repeated runs see the same sequence.
pub fn enumerate_files(root: &Path) -> Result<SourceFileSet> {
    let root = validate_source_root(root)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(&root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_skippable_link(&e) => {
                warn!("Skipping unreadable link: {}", e);
                continue;
            }
            Err(e) => {
                return Err(Error::Io {
                    message: format!("Failed to read '{}': {}", root.display(), e),
                })
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        debug!("Found source file: {}", entry.path().display());
        files.push(entry.into_path());
    }

    info!("Scanned {} files in '{}'", files.len(), root.display());
    Ok(SourceFileSet { root, files })
}

/// A link cycle, or a link whose target is gone
fn is_skippable_link(error: &walkdir::Error) -> bool {
    if error.loop_ancestor().is_some() {
        return true;
    }
    error
        .path()
        .and_then(|path| path.symlink_metadata().ok())
        .is_some_and(|meta| meta.file_type().is_symlink())
}
