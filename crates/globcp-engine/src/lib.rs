//! Copy orchestration for globcp
//!
//! This crate drives a complete copy run on top of the selection engine and
//! any [`globcp_types::SessionConnector`]:
//!
//! - **Target resolution**: flattened or hierarchy-preserving remote paths
//! - **Remote cleanup**: POSIX or Windows commands that empty the target folder
//! - **Per-file execution**: existence checks and transfers whose failures are
//!   recorded, never propagated
//! - **Orchestration**: connect, clean, select, copy and a guaranteed disconnect
//!
//! # Examples
//!
//! ```rust,no_run
//! use globcp_config::ConfigLoader;
//! use globcp_engine::{CopyOptions, CopyOrchestrator};
//! use globcp_remote::SshConnector;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load_default()?;
//! let orchestrator = CopyOrchestrator::new(
//!     CopyOptions::from(&config),
//!     SshConnector::new(config.remote.clone()),
//! );
//! let report = orchestrator.run().await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cleanup;
pub mod executor;
pub mod options;
pub mod orchestrator;
pub mod target;

pub use cleanup::{cleanup_command, RemoteOs};
pub use executor::PairExecutor;
pub use options::CopyOptions;
pub use orchestrator::CopyOrchestrator;
pub use target::{normalize_target_root, TargetResolver, DEFAULT_TARGET_ROOT};
