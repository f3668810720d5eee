//! Shared fixtures for globcp tests
//!
//! - [`SourceTree`]: a temporary local folder built file by file
//! - [`MockConnector`]/[`MockSession`]: an in-memory remote host that records
//!   every call and fails on request

use async_trait::async_trait;
use globcp_types::{Error, RemoteSession, Result, SessionConnector};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;

/// A temporary source folder
#[derive(Debug)]
pub struct SourceTree {
    dir: TempDir,
}

impl SourceTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Create a tree holding `files`, each containing its own relative path
    pub fn with_files(files: &[&str]) -> Self {
        let tree = Self::new();
        for file in files {
            tree.add_file(file, file.as_bytes());
        }
        tree
    }

    /// Add a file, creating parent folders as needed
    pub fn add_file<C: AsRef<[u8]>>(&self, relative: &str, contents: C) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Add an empty folder
    pub fn add_dir(&self, relative: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path).expect("Failed to create dir");
        path
    }

    /// Root of the tree
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the tree
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

impl Default for SourceTree {
    fn default() -> Self {
        Self::new()
    }
}

/// A call made against the mock remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    /// `SessionConnector::connect`
    Connect,
    /// `RemoteSession::execute`
    Execute(String),
    /// `RemoteSession::exists`
    Exists(String),
    /// `RemoteSession::transfer`
    Transfer {
        /// Local file
        local: PathBuf,
        /// Remote target
        remote: String,
    },
    /// `RemoteSession::close`
    Close,
}

#[derive(Debug, Default)]
struct MockRemote {
    calls: Vec<SessionCall>,
    files: BTreeMap<String, Vec<u8>>,
    refuse_connect: bool,
    fail_commands: bool,
    fail_exists: HashSet<String>,
    fail_transfers: HashSet<String>,
}

/// Connector to an in-memory remote host.
///
/// Clones share the same remote, so a test can keep one handle for
/// assertions while the orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    remote: Arc<Mutex<MockRemote>>,
}

impl MockConnector {
    /// A remote that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockRemote> {
        self.remote.lock().expect("mock remote poisoned")
    }

    /// Fail every connection attempt
    pub fn refuse_connect(self) -> Self {
        self.state().refuse_connect = true;
        self
    }

    /// Fail every remote command
    pub fn fail_commands(self) -> Self {
        self.state().fail_commands = true;
        self
    }

    /// Fail existence checks of `remote`
    pub fn fail_exists_for(self, remote: &str) -> Self {
        self.state().fail_exists.insert(remote.to_string());
        self
    }

    /// Fail transfers to `remote`
    pub fn fail_transfer_to(self, remote: &str) -> Self {
        self.state().fail_transfers.insert(remote.to_string());
        self
    }

    /// Place a file on the remote before the run
    pub fn with_remote_file(self, remote: &str, contents: &[u8]) -> Self {
        self.state()
            .files
            .insert(remote.to_string(), contents.to_vec());
        self
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<SessionCall> {
        self.state().calls.clone()
    }

    /// Remote paths transferred to, in order
    pub fn transfers(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                SessionCall::Transfer { remote, .. } => Some(remote.clone()),
                _ => None,
            })
            .collect()
    }

    /// Commands executed, in order
    pub fn commands(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                SessionCall::Execute(command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    /// How often a session was closed
    pub fn close_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| **call == SessionCall::Close)
            .count()
    }

    /// Contents of a remote file
    pub fn remote_file(&self, remote: &str) -> Option<Vec<u8>> {
        self.state().files.get(remote).cloned()
    }

    /// All remote file paths
    pub fn remote_paths(&self) -> Vec<String> {
        self.state().files.keys().cloned().collect()
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    type Session = MockSession;

    async fn connect(&self) -> Result<MockSession> {
        let mut state = self.state();
        state.calls.push(SessionCall::Connect);
        if state.refuse_connect {
            return Err(Error::connection("mock-host", "connection refused"));
        }
        Ok(MockSession {
            remote: Arc::clone(&self.remote),
        })
    }
}

/// Session on the in-memory remote host
#[derive(Debug)]
pub struct MockSession {
    remote: Arc<Mutex<MockRemote>>,
}

impl MockSession {
    fn state(&self) -> MutexGuard<'_, MockRemote> {
        self.remote.lock().expect("mock remote poisoned")
    }
}

#[async_trait]
impl RemoteSession for MockSession {
    /// A successful command empties the remote
    async fn execute(&mut self, command: &str) -> Result<String> {
        let mut state = self.state();
        state.calls.push(SessionCall::Execute(command.to_string()));
        if state.fail_commands {
            return Err(Error::remote_command(command, "exit status 1: permission denied"));
        }
        state.files.clear();
        Ok(String::new())
    }

    async fn exists(&mut self, remote_path: &str) -> Result<bool> {
        let mut state = self.state();
        state.calls.push(SessionCall::Exists(remote_path.to_string()));
        if state.fail_exists.contains(remote_path) {
            return Err(Error::Io {
                message: format!("stat '{}' failed", remote_path),
            });
        }
        Ok(state.files.contains_key(remote_path))
    }

    async fn transfer(&mut self, local_path: &Path, remote_path: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(SessionCall::Transfer {
            local: local_path.to_path_buf(),
            remote: remote_path.to_string(),
        });
        if state.fail_transfers.contains(remote_path) {
            return Err(Error::transfer(local_path, remote_path, "connection reset"));
        }
        let contents = fs::read(local_path)
            .map_err(|e| Error::transfer(local_path, remote_path, e.to_string()))?;
        state.files.insert(remote_path.to_string(), contents);
        Ok(())
    }

    async fn close(&mut self) {
        self.state().calls.push(SessionCall::Close);
    }
}
