//! Negation-aware glob matching
//!
//! [`GlobMatcher`] is the single primitive the selection engine matches with.
//! An expression that starts with an odd run of `!` is negated: it matches a
//! path exactly when the remainder of the expression does not.

use crate::paths;
use globcp_types::{Error, Result};
use globset::GlobBuilder;
use std::path::Path;

/// Matching options shared by every pattern in a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// A pattern without `/` matches against the file's base name anywhere in the tree
    pub match_base: bool,
    /// Compare case-insensitively
    pub case_insensitive: bool,
}

impl MatchOptions {
    /// Options for the local platform: case-insensitive on Windows, case-sensitive elsewhere
    pub fn for_host() -> Self {
        Self {
            match_base: true,
            case_insensitive: cfg!(windows),
        }
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::for_host()
    }
}

/// A compiled glob expression with optional leading negation
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    expression: String,
    negated: bool,
    base_name_only: bool,
    matcher: globset::GlobMatcher,
}

impl GlobMatcher {
    /// Compile `expression`.
    ///
    /// `*` and `?` never cross a `/`; `**` spans directories; dot-files need
    /// no special syntax.
    pub fn new(expression: &str, options: MatchOptions) -> Result<Self> {
        let bangs = expression.chars().take_while(|c| *c == '!').count();
        let inner = &expression[bangs..];

        let glob = GlobBuilder::new(inner)
            .literal_separator(true)
            .backslash_escape(!cfg!(windows))
            .case_insensitive(options.case_insensitive)
            .build()
            .map_err(|e| Error::InvalidPattern {
                pattern: expression.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            expression: expression.to_string(),
            negated: bangs % 2 == 1,
            base_name_only: options.match_base && !inner.contains('/'),
            matcher: glob.compile_matcher(),
        })
    }

    /// The expression as given, including any leading `!`
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether the expression is negated
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Match `path`, honouring negation
    pub fn is_match(&self, path: &Path) -> bool {
        let hit = if self.base_name_only {
            path.file_name()
                .is_some_and(|name| self.matcher.is_match(name.to_string_lossy().as_ref()))
        } else {
            self.matcher.is_match(paths::to_slash(path))
        };
        hit != self.negated
    }
}
