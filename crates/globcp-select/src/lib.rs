//! Content pattern selection for globcp
//!
//! This crate turns a source folder and a list of content patterns into the
//! ordered set of files to copy:
//!
//! - **Pattern classification**: a pattern starting with an odd number of `!`
//!   is an exclude, anything else is an include
//! - **Glob matching**: patterns are resolved against the source root and
//!   matched with `*`, `?`, `**` and brace/class syntax; dot-files match
//!   without special syntax
//! - **Enumeration**: every file under the root, in a stable order
//! - **Selection**: the union of include matches, narrowed by every exclude
//!
//! # Examples
//!
//! ```rust,no_run
//! use globcp_select::SelectionEngine;
//! use std::path::Path;
//!
//! # fn example() -> globcp_types::Result<()> {
//! let engine = SelectionEngine::new();
//! let selection = engine.select_from(Path::new("dist"), &["**", "!**/*.map"])?;
//! for file in selection.files() {
//!     println!("{}", file.display());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod enumerate;
pub mod matcher;
pub mod paths;
pub mod pattern;

pub use engine::{SelectionEngine, SelectionResult};
pub use enumerate::{absolute_root, enumerate_files, validate_source_root, SourceFileSet};
pub use matcher::{GlobMatcher, MatchOptions};
pub use pattern::{ContentPattern, PatternKind, PatternSet, MATCH_ALL};
