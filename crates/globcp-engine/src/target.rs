//! Remote target path resolution

use globcp_select::paths;
use globcp_types::CopyPair;
use std::path::{Path, PathBuf};

/// Default target root: the remote session's working directory
pub const DEFAULT_TARGET_ROOT: &str = "./";

/// Normalize a configured target root.
///
/// An empty root becomes [`DEFAULT_TARGET_ROOT`]. A leading `~/` is rewritten
/// to `./` because SFTP cannot expand the home directory; relative paths
/// already resolve against it.
pub fn normalize_target_root(root: &str) -> String {
    let root = root.trim();
    if root.is_empty() || root == "~" {
        DEFAULT_TARGET_ROOT.to_string()
    } else if let Some(rest) = root.strip_prefix("~/") {
        format!("{}{}", DEFAULT_TARGET_ROOT, rest)
    } else {
        root.to_string()
    }
}

/// Maps selected source files to remote target paths
#[derive(Debug, Clone)]
pub struct TargetResolver {
    source_root: String,
    target_root: String,
    flatten: bool,
}

impl TargetResolver {
    /// Create a resolver for files under `source_root`
    pub fn new(source_root: &Path, target_root: &str, flatten: bool) -> Self {
        Self {
            source_root: source_root.to_string_lossy().into_owned(),
            target_root: normalize_target_root(target_root),
            flatten,
        }
    }

    /// Normalized target root
    pub fn target_root(&self) -> &str {
        &self.target_root
    }

    /// Path of `source` relative to the target root.
    ///
    /// Flattened: the file name only. Otherwise the source root prefix and
    /// one leading separator are stripped.
    pub fn relative_path(&self, source: &Path) -> String {
        if self.flatten {
            return source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        let full = source.to_string_lossy();
        let full: &str = &full;
        let relative = full.strip_prefix(self.source_root.as_str()).unwrap_or(full);
        let relative = relative.strip_prefix(['/', '\\']).unwrap_or(relative);
        paths::to_slash(Path::new(relative))
    }

    /// Full remote target path for `source`, always `/`-separated
    pub fn resolve(&self, source: &Path) -> String {
        paths::join(&self.target_root, &self.relative_path(source))
    }

    /// Pair `source` with its remote target
    pub fn pair(&self, source: PathBuf) -> CopyPair {
        let remote = self.resolve(&source);
        CopyPair::new(source, remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "./")]
    #[case("   ", "./")]
    #[case("~", "./")]
    #[case("~/www", "./www")]
    #[case("/var/www", "/var/www")]
    #[case("deploy/", "deploy/")]
    fn test_normalize_target_root(#[case] root: &str, #[case] expected: &str) {
        assert_eq!(normalize_target_root(root), expected);
    }

    #[cfg(unix)]
    #[rstest]
    #[case("/src/a.txt", false, "./", "a.txt")]
    #[case("/src/sub/b.txt", false, "./", "sub/b.txt")]
    #[case("/src/sub/b.txt", false, "/var/www", "/var/www/sub/b.txt")]
    #[case("/src/sub/b.txt", false, "~/www/", "www/sub/b.txt")]
    #[case("/src/sub/b.txt", true, "/var/www", "/var/www/b.txt")]
    #[case("/src/.hidden", true, "", ".hidden")]
    fn test_resolve(
        #[case] source: &str,
        #[case] flatten: bool,
        #[case] target_root: &str,
        #[case] expected: &str,
    ) {
        let resolver = TargetResolver::new(Path::new("/src"), target_root, flatten);
        assert_eq!(resolver.resolve(Path::new(source)), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_pair_keeps_source() {
        let resolver = TargetResolver::new(Path::new("/src"), "/out", false);
        let pair = resolver.pair(PathBuf::from("/src/x/y.bin"));
        assert_eq!(pair.source, PathBuf::from("/src/x/y.bin"));
        assert_eq!(pair.remote, "/out/x/y.bin");
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,7}(\\.[a-z]{1,3})?"
    }

    proptest! {
        #[cfg(unix)]
        #[test]
        fn prop_flatten_keeps_only_file_name(dirs in prop::collection::vec(segment(), 0..4), name in segment()) {
            let mut source = PathBuf::from("/src");
            source.extend(&dirs);
            source.push(&name);

            let resolver = TargetResolver::new(Path::new("/src"), "./", true);
            prop_assert_eq!(resolver.relative_path(&source), name);
        }

        #[cfg(unix)]
        #[test]
        fn prop_hierarchy_strips_root_prefix(dirs in prop::collection::vec(segment(), 0..4), name in segment()) {
            let mut relative = PathBuf::new();
            relative.extend(&dirs);
            relative.push(&name);
            let source = Path::new("/src").join(&relative);

            let resolver = TargetResolver::new(Path::new("/src"), "./", false);
            prop_assert_eq!(resolver.relative_path(&source), relative.to_string_lossy().into_owned());
        }
    }
}
