//! Core traits for globcp operations
//!
//! The copy orchestrator talks to the remote host only through these two
//! traits, so the transport can be swapped (SSH/SFTP in production, a scripted
//! fake in tests).

use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// An authenticated connection to the remote host
#[async_trait]
pub trait RemoteSession: Send {
    /// Execute a shell command and return its stdout
    async fn execute(&mut self, command: &str) -> Result<String>;

    /// Check whether a remote path exists
    async fn exists(&mut self, remote_path: &str) -> Result<bool>;

    /// Upload a single local file to `remote_path`
    async fn transfer(&mut self, local_path: &Path, remote_path: &str) -> Result<()>;

    /// Tear down the session. Idempotent and infallible.
    async fn close(&mut self);
}

/// Factory that establishes [`RemoteSession`]s
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Session type produced by this connector
    type Session: RemoteSession;

    /// Connect and authenticate
    async fn connect(&self) -> Result<Self::Session>;
}
