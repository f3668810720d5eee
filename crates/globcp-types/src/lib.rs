//! Core type system and error handling for globcp
//!
//! This crate provides the foundational types shared by every globcp crate:
//!
//! - **Error handling**: the run's error taxonomy, split into fatal and per-file errors
//! - **Core types**: copy pairs, per-file outcomes and the aggregated run report
//! - **Traits**: the async remote-session interface the orchestrator consumes
//!
//! # Examples
//!
//! ```rust
//! use globcp_types::{CopyOutcome, CopyPair, RunReport};
//!
//! let report = RunReport::from_outcomes(vec![CopyOutcome::copied(CopyPair::new(
//!     "/srv/site/index.html",
//!     "./www/index.html",
//! ))]);
//! assert!(report.is_success());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use traits::{RemoteSession, SessionConnector};
pub use types::*;
