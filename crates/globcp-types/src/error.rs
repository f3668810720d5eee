//! Error types and handling for globcp
//!
//! Every failure a run can hit is one variant of [`Error`]. Variants are split
//! into two classes: *fatal* errors abort the remaining run phases, while
//! *per-file* errors are recorded against a single file and the batch carries on.

use std::path::PathBuf;

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Medium severity - a single file failed, the batch continues
    Medium,
    /// High severity - the run is aborted
    High,
}

/// Main error type for globcp operations
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// Source root is missing or not a directory
    #[error("Invalid source folder '{path}': {reason}")]
    InvalidSource {
        /// Source root that was rejected
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// Remote session could not be established or authenticated
    #[error("Connection to '{host}' failed: {message}")]
    Connection {
        /// Remote host the connection was attempted against
        host: String,
        /// Error message from the transport
        message: String,
    },

    /// A remote command (target cleanup) failed
    #[error("Remote command '{command}' failed: {message}")]
    RemoteCommand {
        /// Command line that was executed
        command: String,
        /// Error message or captured stderr
        message: String,
    },

    /// Selection produced no files
    #[error("No files matched the content patterns under '{root}'")]
    EmptySelection {
        /// Source root the selection ran against
        root: PathBuf,
    },

    /// Target already exists and overwriting is disabled
    #[error("Remote file '{remote}' already exists and overwrite is disabled")]
    ExistsConflict {
        /// Remote target path
        remote: String,
    },

    /// Transport-level failure for a single file
    #[error("Transfer of '{local}' to '{remote}' failed: {message}")]
    Transfer {
        /// Local source file
        local: PathBuf,
        /// Remote target path
        remote: String,
        /// Error message from the transport
        message: String,
    },

    /// A content pattern could not be compiled into a glob
    #[error("Invalid content pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Glob expression as handed to the matcher
        pattern: String,
        /// Error message from the glob compiler
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Connection establishment timed out
    #[error("Operation timed out after {seconds} seconds")]
    Timeout {
        /// Number of seconds after which the operation timed out
        seconds: u64,
    },

    /// Local I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid source root
    InvalidSource,
    /// Connection and authentication errors
    Connection,
    /// Remote command errors
    RemoteCommand,
    /// Empty selection
    EmptySelection,
    /// Existing remote target
    ExistsConflict,
    /// Per-file transfer errors
    Transfer,
    /// Pattern compilation errors
    InvalidPattern,
    /// Configuration errors
    Config,
    /// Timeout
    Timeout,
    /// Local I/O errors
    Io,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSource { .. } => ErrorKind::InvalidSource,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::RemoteCommand { .. } => ErrorKind::RemoteCommand,
            Self::EmptySelection { .. } => ErrorKind::EmptySelection,
            Self::ExistsConflict { .. } => ErrorKind::ExistsConflict,
            Self::Transfer { .. } => ErrorKind::Transfer,
            Self::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            Self::Config { .. } => ErrorKind::Config,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        if self.is_fatal() {
            ErrorSeverity::High
        } else {
            ErrorSeverity::Medium
        }
    }

    /// Whether this error aborts the whole run.
    ///
    /// Only existence conflicts and transfer failures are scoped to a single
    /// file; everything else ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ExistsConflict { .. } | Self::Transfer { .. })
    }

    /// Create a new invalid source error
    pub fn invalid_source<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::InvalidSource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new connection error
    pub fn connection<H: Into<String>, S: Into<String>>(host: H, message: S) -> Self {
        Self::Connection {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a new remote command error
    pub fn remote_command<C: Into<String>, S: Into<String>>(command: C, message: S) -> Self {
        Self::RemoteCommand {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a new transfer error
    pub fn transfer<P: Into<PathBuf>, R: Into<String>, S: Into<String>>(
        local: P,
        remote: R,
        message: S,
    ) -> Self {
        Self::Transfer {
            local: local.into(),
            remote: remote.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
