//! Content pattern classification
//!
//! A raw content pattern is an include unless it starts with an odd number of
//! `!` characters. Both kinds are resolved against the source root into a
//! glob expression. Exclude expressions keep their leading `!` run verbatim in
//! front of the joined path, so [`crate::GlobMatcher`] reads them as negated
//! globs: "match everything that does not match the rest".
//!
//! An even `!` run is not a negation at all. The `!` characters stay in the
//! joined include expression and are matched literally.

use crate::paths;
use std::path::Path;
use tracing::debug;

/// Pattern that selects every file under the source root
pub const MATCH_ALL: &str = "**";

/// Whether a pattern adds files or removes them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Adds matching files to the selection
    Include,
    /// Removes matching files from the selection
    Exclude,
}

/// A classified content pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPattern {
    raw: String,
    leading_bangs: usize,
    kind: PatternKind,
    glob_expression: String,
}

impl ContentPattern {
    /// Classify a raw pattern and resolve it against `source_root`
    pub fn classify(raw: &str, source_root: &Path) -> Self {
        let raw = raw.trim();
        let root = paths::to_slash(source_root);

        let mut negate = false;
        let mut leading_bangs = 0;
        for c in raw.chars() {
            if c != '!' {
                break;
            }
            negate = !negate;
            leading_bangs += 1;
        }

        let (kind, glob_expression) = if negate {
            // `!` is one byte, so the split lands on a char boundary
            let (bangs, rest) = raw.split_at(leading_bangs);
            (
                PatternKind::Exclude,
                format!("{}{}", bangs, paths::join(&root, rest)),
            )
        } else {
            (PatternKind::Include, paths::join(&root, raw))
        };

        Self {
            raw: raw.to_string(),
            leading_bangs,
            kind,
            glob_expression,
        }
    }

    /// The trimmed pattern as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Number of consecutive `!` at the start of the pattern
    pub fn leading_bangs(&self) -> usize {
        self.leading_bangs
    }

    /// Include or exclude
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Whether this is an exclude pattern
    pub fn is_exclude(&self) -> bool {
        self.kind == PatternKind::Exclude
    }

    /// Glob expression handed to the matcher
    pub fn glob_expression(&self) -> &str {
        &self.glob_expression
    }
}

/// Patterns split by kind, each list in declared order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    /// Include patterns
    pub includes: Vec<ContentPattern>,
    /// Exclude patterns
    pub excludes: Vec<ContentPattern>,
}

impl PatternSet {
    /// Classify every raw pattern against `source_root`.
    ///
    /// When only exclude patterns are given, an implicit [`MATCH_ALL`] include
    /// is added so the excludes have a full file set to narrow.
    pub fn classify<I, S>(raw_patterns: I, source_root: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for raw in raw_patterns {
            let pattern = ContentPattern::classify(raw.as_ref(), source_root);
            debug!(
                "Pattern '{}' classified as {:?} -> '{}'",
                pattern.raw(),
                pattern.kind(),
                pattern.glob_expression()
            );
            match pattern.kind() {
                PatternKind::Include => set.includes.push(pattern),
                PatternKind::Exclude => set.excludes.push(pattern),
            }
        }

        if set.includes.is_empty() && !set.excludes.is_empty() {
            debug!("Only exclude patterns given, adding implicit '{}'", MATCH_ALL);
            set.includes
                .push(ContentPattern::classify(MATCH_ALL, source_root));
        }

        set
    }

    /// Whether there are no patterns at all
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("**", PatternKind::Include, 0, "/srv/site/**")]
    #[case("  dist/*.js  ", PatternKind::Include, 0, "/srv/site/dist/*.js")]
    #[case("!sub/**", PatternKind::Exclude, 1, "!/srv/site/sub/**")]
    #[case("!!keep.txt", PatternKind::Include, 2, "/srv/site/!!keep.txt")]
    #[case("!!!drop/*", PatternKind::Exclude, 3, "!!!/srv/site/drop/*")]
    #[case("./a/../b.txt", PatternKind::Include, 0, "/srv/site/b.txt")]
    #[case("mid!dle", PatternKind::Include, 0, "/srv/site/mid!dle")]
    fn test_classify(
        #[case] raw: &str,
        #[case] kind: PatternKind,
        #[case] bangs: usize,
        #[case] expression: &str,
    ) {
        let pattern = ContentPattern::classify(raw, Path::new("/srv/site"));
        assert_eq!(pattern.kind(), kind);
        assert_eq!(pattern.leading_bangs(), bangs);
        assert_eq!(pattern.glob_expression(), expression);
        assert_eq!(pattern.raw(), raw.trim());
    }

    #[test]
    fn test_set_keeps_declared_order() {
        let set = PatternSet::classify(
            ["*.txt", "!a.txt", "sub/**", "!!!b.txt"],
            Path::new("/root"),
        );
        let includes: Vec<_> = set.includes.iter().map(|p| p.raw()).collect();
        let excludes: Vec<_> = set.excludes.iter().map(|p| p.raw()).collect();
        assert_eq!(includes, vec!["*.txt", "sub/**"]);
        assert_eq!(excludes, vec!["!a.txt", "!!!b.txt"]);
    }

    #[test]
    fn test_excludes_only_injects_match_all() {
        let set = PatternSet::classify(["!*.log"], Path::new("/root"));
        assert_eq!(set.includes.len(), 1);
        assert_eq!(set.includes[0].raw(), MATCH_ALL);
        assert_eq!(set.includes[0].glob_expression(), "/root/**");
        assert_eq!(set.excludes.len(), 1);
    }

    #[test]
    fn test_no_patterns_stays_empty() {
        let set = PatternSet::classify(Vec::<String>::new(), Path::new("/root"));
        assert!(set.is_empty());
    }
}
