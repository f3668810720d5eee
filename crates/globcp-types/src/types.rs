//! Core data types for globcp
//!
//! This module provides the per-file copy records and the run report that
//! aggregates them.

use crate::Error;
use std::fmt;
use std::path::PathBuf;

/// A selected local file paired with its remote destination.
///
/// `remote` always uses forward-slash separators, whatever the local platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPair {
    /// Absolute local source path
    pub source: PathBuf,
    /// Remote target path
    pub remote: String,
}

impl CopyPair {
    /// Create a new copy pair
    pub fn new<P: Into<PathBuf>, R: Into<String>>(source: P, remote: R) -> Self {
        Self {
            source: source.into(),
            remote: remote.into(),
        }
    }
}

/// What happened to a single [`CopyPair`]
#[derive(Debug, Clone)]
pub enum CopyStatus {
    /// File was transferred
    Copied,
    /// Dry run: the transfer was only planned
    Planned,
    /// Existence check or transfer failed
    Failed(Error),
}

/// Per-file result fed into [`RunReport::record`]
#[derive(Debug, Clone)]
pub struct CopyOutcome {
    /// The pair this outcome belongs to
    pub pair: CopyPair,
    /// Status of the pair
    pub status: CopyStatus,
}

impl CopyOutcome {
    /// Outcome for a transferred file
    pub fn copied(pair: CopyPair) -> Self {
        Self {
            pair,
            status: CopyStatus::Copied,
        }
    }

    /// Outcome for a file skipped by a dry run
    pub fn planned(pair: CopyPair) -> Self {
        Self {
            pair,
            status: CopyStatus::Planned,
        }
    }

    /// Outcome for a failed file
    pub fn failed(pair: CopyPair, error: Error) -> Self {
        Self {
            pair,
            status: CopyStatus::Failed(error),
        }
    }

    /// Whether this outcome counts as a failure
    pub fn is_failure(&self) -> bool {
        matches!(self.status, CopyStatus::Failed(_))
    }
}

/// A file that could not be copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Local source file
    pub source: PathBuf,
    /// Remote target path
    pub remote: String,
    /// Rendered error message
    pub message: String,
}

/// Orchestrator run phases, in the order they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    /// Nothing has happened yet
    Init,
    /// Remote session is established
    Connected,
    /// Remote target folder was emptied
    Cleaned,
    /// Content patterns are being applied
    Selecting,
    /// Files are being transferred
    Copying,
    /// Remote session is torn down
    Disconnected,
    /// Final outcome is known
    Reported,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Connected => "connected",
            Self::Cleaned => "cleaned",
            Self::Selecting => "selecting",
            Self::Copying => "copying",
            Self::Disconnected => "disconnected",
            Self::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// Aggregated result of a copy run
///
/// Built by folding [`CopyOutcome`]s with [`RunReport::record`]; once the run
/// is finished the report is not mutated again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Number of files the run tried to copy
    pub attempted: u64,
    /// Number of files transferred (or planned, in a dry run)
    pub copied: u64,
    /// Number of files that failed
    pub failed: u64,
    /// Details of every failed file, in selection order
    pub failures: Vec<FileFailure>,
    /// Non-fatal warnings raised during the run
    pub warnings: Vec<String>,
}

impl RunReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the report
    pub fn record(mut self, outcome: CopyOutcome) -> Self {
        self.attempted += 1;
        match outcome.status {
            CopyStatus::Copied | CopyStatus::Planned => self.copied += 1,
            CopyStatus::Failed(error) => {
                self.failed += 1;
                self.failures.push(FileFailure {
                    source: outcome.pair.source,
                    remote: outcome.pair.remote,
                    message: error.to_string(),
                });
            }
        }
        self
    }

    /// Build a report from a sequence of outcomes
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = CopyOutcome>,
    {
        outcomes.into_iter().fold(Self::new(), Self::record)
    }

    /// Attach a non-fatal warning
    pub fn with_warning<S: Into<String>>(mut self, warning: S) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// A run succeeds when no file failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!("{} of {} file(s) copied", self.copied, self.attempted)
        } else {
            format!(
                "{} of {} file(s) failed to copy",
                self.failed, self.attempted
            )
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
