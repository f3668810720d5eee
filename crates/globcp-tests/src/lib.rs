//! globcp Testing Suite
//!
//! Integration tests for the globcp crates plus the fixtures they share:
//! temporary source trees and an in-memory remote host that stands in for
//! an SSH server.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Common fixtures used across all test files so each scenario only
/// describes what differs.
pub mod test_utils;

pub use test_utils::{MockConnector, MockSession, SessionCall, SourceTree};
