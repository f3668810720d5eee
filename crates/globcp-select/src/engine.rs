//! Selection engine
//!
//! Selection runs in two passes over the enumerated source tree:
//!
//! 1. **Include union**: every include pattern is matched against the full
//!    file list; a file joins the selection the first time any include
//!    matches it, so the result keeps first-match order without duplicates.
//! 2. **Exclude narrowing**: each exclude is a negated glob and the current
//!    selection is filtered through it in declared order. A file survives only
//!    if it passes every exclude.

use crate::{
    enumerate::{enumerate_files, SourceFileSet},
    matcher::{GlobMatcher, MatchOptions},
    pattern::PatternSet,
};
use globcp_types::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files chosen for copying, in selection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionResult {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl SelectionResult {
    /// Absolute source root the selection was made under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Selected files
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of selected files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Take ownership of the selected files
    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }
}

/// Applies classified content patterns to an enumerated source tree
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    options: MatchOptions,
}

impl SelectionEngine {
    /// Create an engine with host matching options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with explicit matching options
    pub fn with_options(options: MatchOptions) -> Self {
        Self { options }
    }

    /// Matching options in use
    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Enumerate `root` and select files with the raw `patterns`
    pub fn select_from<S: AsRef<str>>(&self, root: &Path, patterns: &[S]) -> Result<SelectionResult> {
        let source = enumerate_files(root)?;
        let set = PatternSet::classify(patterns, source.root());
        self.select(&source, &set)
    }

    /// Select files from an enumerated tree.
    ///
    /// All patterns are compiled before any matching, so an invalid pattern
    /// fails the selection without partial results.
    pub fn select(&self, source: &SourceFileSet, patterns: &PatternSet) -> Result<SelectionResult> {
        let includes = patterns
            .includes
            .iter()
            .map(|p| GlobMatcher::new(p.glob_expression(), self.options))
            .collect::<Result<Vec<_>>>()?;
        let excludes = patterns
            .excludes
            .iter()
            .map(|p| GlobMatcher::new(p.glob_expression(), self.options))
            .collect::<Result<Vec<_>>>()?;

        let mut seen: HashSet<&Path> = HashSet::new();
        let mut selected = Vec::new();
        for matcher in &includes {
            let before = selected.len();
            for file in source.files() {
                if matcher.is_match(file) && seen.insert(file.as_path()) {
                    selected.push(file.clone());
                }
            }
            debug!(
                "Include '{}' added {} file(s)",
                matcher.expression(),
                selected.len() - before
            );
        }

        for matcher in &excludes {
            let before = selected.len();
            selected.retain(|file| matcher.is_match(file));
            debug!(
                "Exclude '{}' removed {} file(s)",
                matcher.expression(),
                before - selected.len()
            );
        }

        info!(
            "Selected {} of {} file(s) under '{}'",
            selected.len(),
            source.len(),
            source.root().display()
        );

        Ok(SelectionResult {
            root: source.root().to_path_buf(),
            files: selected,
        })
    }
}
