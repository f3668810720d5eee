//! Copy run options

use crate::cleanup::RemoteOs;
use crate::target::DEFAULT_TARGET_ROOT;
use globcp_config::Config;
use globcp_select::{MatchOptions, MATCH_ALL};
use std::path::PathBuf;

/// Everything a [`crate::CopyOrchestrator`] run needs besides the connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOptions {
    /// Local folder the patterns are resolved against
    pub source_root: PathBuf,
    /// Raw content patterns, in declared order
    pub patterns: Vec<String>,
    /// Remote destination folder
    pub target_root: String,
    /// Keep only file names on the remote side
    pub flatten: bool,
    /// Replace existing remote files
    pub overwrite: bool,
    /// Empty the remote destination folder before copying
    pub clean: bool,
    /// Shell family used for the cleanup command
    pub remote_os: RemoteOs,
    /// Treat an empty selection as a fatal error
    pub fail_on_empty: bool,
    /// Select and resolve targets but do not touch the remote side
    pub dry_run: bool,
    /// Glob matching options
    pub match_options: MatchOptions,
}

impl CopyOptions {
    /// Options for copying `source_root` with `patterns` into the default target folder
    pub fn new<P, I, S>(source_root: P, patterns: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_root: source_root.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the remote destination folder
    pub fn with_target_root<S: Into<String>>(mut self, target_root: S) -> Self {
        self.target_root = target_root.into();
        self
    }

    /// Set flatten mode
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Set whether existing remote files are replaced
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Request cleanup of the remote destination with the given shell family
    pub fn with_clean(mut self, clean: bool, remote_os: RemoteOs) -> Self {
        self.clean = clean;
        self.remote_os = remote_os;
        self
    }

    /// Set whether an empty selection fails the run
    pub fn with_fail_on_empty(mut self, fail_on_empty: bool) -> Self {
        self.fail_on_empty = fail_on_empty;
        self
    }

    /// Set dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            patterns: vec![MATCH_ALL.to_string()],
            target_root: DEFAULT_TARGET_ROOT.to_string(),
            flatten: false,
            overwrite: true,
            clean: false,
            remote_os: RemoteOs::Posix,
            fail_on_empty: true,
            dry_run: false,
            match_options: MatchOptions::for_host(),
        }
    }
}

impl From<&Config> for CopyOptions {
    fn from(config: &Config) -> Self {
        Self {
            source_root: config.source.root.clone(),
            patterns: config.source.patterns.clone(),
            target_root: config.target.root.clone(),
            flatten: config.target.flatten,
            overwrite: config.target.overwrite,
            clean: config.target.clean,
            remote_os: RemoteOs::from_windows_flag(config.target.remote_is_windows),
            fail_on_empty: config.run.fail_on_empty,
            dry_run: config.run.dry_run,
            match_options: MatchOptions::for_host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_defaults() {
        let from_config = CopyOptions::from(&Config::default());
        let defaults = CopyOptions::default();

        assert_eq!(from_config.patterns, defaults.patterns);
        assert_eq!(from_config.target_root, defaults.target_root);
        assert_eq!(from_config.overwrite, defaults.overwrite);
        assert_eq!(from_config.fail_on_empty, defaults.fail_on_empty);
        assert_eq!(from_config.remote_os, RemoteOs::Posix);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.source.root = PathBuf::from("/srv/site");
        config.source.patterns = vec!["dist/**".to_string(), "!**/*.map".to_string()];
        config.target.root = "~/www".to_string();
        config.target.flatten = true;
        config.target.overwrite = false;
        config.target.clean = true;
        config.target.remote_is_windows = true;
        config.run.fail_on_empty = false;
        config.run.dry_run = true;

        let options = CopyOptions::from(&config);
        assert_eq!(options.source_root, PathBuf::from("/srv/site"));
        assert_eq!(options.patterns, vec!["dist/**", "!**/*.map"]);
        assert_eq!(options.target_root, "~/www");
        assert!(options.flatten);
        assert!(!options.overwrite);
        assert!(options.clean);
        assert_eq!(options.remote_os, RemoteOs::Windows);
        assert!(!options.fail_on_empty);
        assert!(options.dry_run);
    }

    #[test]
    fn test_builder_methods() {
        let options = CopyOptions::new("/src", ["**", "!sub/**"])
            .with_target_root("/out")
            .with_overwrite(false)
            .with_clean(true, RemoteOs::Windows);

        assert_eq!(options.patterns, vec!["**", "!sub/**"]);
        assert_eq!(options.target_root, "/out");
        assert!(!options.overwrite);
        assert!(options.clean);
        assert_eq!(options.remote_os, RemoteOs::Windows);
    }
}
