//! SSH/SFTP remote transport for globcp
//!
//! This crate provides the production implementation of the
//! [`globcp_types::SessionConnector`] and [`globcp_types::RemoteSession`]
//! traits on top of libssh2:
//!
//! - **Connection**: TCP connect and SSH handshake bounded by the configured timeout
//! - **Authentication**: agent, private key file, password and keyboard-interactive
//! - **Remote commands**: exec channels with exit status checking
//! - **File transfer**: SFTP uploads that create missing parent directories
//!
//! libssh2 is blocking, so every call runs on tokio's blocking pool and is
//! awaited before the next one starts.
//!
//! # Examples
//!
//! ```rust,no_run
//! use globcp_config::RemoteConfig;
//! use globcp_remote::SshConnector;
//! use globcp_types::{RemoteSession, SessionConnector};
//!
//! # async fn example() -> globcp_types::Result<()> {
//! let connector = SshConnector::new(RemoteConfig {
//!     host: "deploy.example.com".to_string(),
//!     username: "deploy".to_string(),
//!     ..Default::default()
//! });
//! let mut session = connector.connect().await?;
//! let listing = session.execute("ls -la").await?;
//! println!("{}", listing);
//! session.close().await;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod connection;

pub use client::SshSession;
pub use connection::SshConnector;
