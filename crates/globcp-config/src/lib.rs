//! Configuration management system for globcp
//!
//! This crate provides the typed configuration surface of a copy run: what
//! to select locally, where to put it remotely, how to reach the remote host,
//! and how to log.
//!
//! # Features
//!
//! - **Multiple formats**: YAML, TOML and JSON configuration files
//! - **Validation**: Range and consistency checks after every build
//! - **Environment overrides**: `GLOBCP__SECTION__KEY` variables override file values
//! - **Defaults**: Sensible default values for all configuration options
//!
//! # Examples
//!
//! ```rust,no_run
//! use globcp_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("globcp.yaml")
//!     .add_env_prefix("GLOBCP")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Target folder: {}", config.target.root);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Main configuration structure for globcp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local selection configuration
    pub source: SourceConfig,
    /// Remote destination configuration
    pub target: TargetConfig,
    /// Remote host and credentials
    pub remote: RemoteConfig,
    /// Run-level policy
    pub run: RunConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Check the settings a real copy run needs on top of [`ConfigBuilder`] validation
    pub fn validate_for_run(&self) -> ConfigResult<()> {
        if self.remote.host.trim().is_empty() {
            return Err(ConfigError::missing_required("remote.host"));
        }
        if self.remote.username.trim().is_empty() {
            return Err(ConfigError::missing_required("remote.username"));
        }
        if self.source.root.as_os_str().is_empty() {
            return Err(ConfigError::missing_required("source.root"));
        }
        Ok(())
    }
}

/// Local selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory the content patterns are resolved against
    pub root: PathBuf,
    /// Ordered raw content patterns; a pattern with an odd number of leading `!` excludes
    pub patterns: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            patterns: vec!["**".to_string()],
        }
    }
}

/// Remote destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Remote target folder
    pub root: String,
    /// Discard directory structure and copy every file by base name
    pub flatten: bool,
    /// Replace files that already exist remotely
    pub overwrite: bool,
    /// Empty the remote target folder before copying
    pub clean: bool,
    /// The remote host runs Windows (selects the cleanup command flavour)
    pub remote_is_windows: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            root: "./".to_string(),
            flatten: false,
            overwrite: true,
            clean: false,
            remote_is_windows: false,
        }
    }
}

/// Remote host and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Host name or address
    pub host: String,
    /// SSH port
    pub port: u16,
    /// Login user
    pub username: String,
    /// Password, also used for keyboard-interactive authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Private key file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,
    /// Passphrase for the private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_passphrase: Option<String>,
    /// Try the SSH agent before other methods
    pub use_agent: bool,
    /// Seconds to wait for the connection to become ready
    pub connect_timeout_secs: u64,
}

impl RemoteConfig {
    /// Connection-ready timeout as a [`Duration`]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `host:port` address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: String::new(),
            password: None,
            private_key_path: None,
            private_key_passphrase: None,
            use_agent: true,
            connect_timeout_secs: 30,
        }
    }
}

/// Run-level policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Treat an empty selection as a fatal error instead of a warning
    pub fail_on_empty: bool,
    /// Resolve and log every transfer without touching the remote side
    pub dry_run: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fail_on_empty: true,
            dry_run: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Split a multi-line pattern block into trimmed, non-empty content patterns
pub fn parse_pattern_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
