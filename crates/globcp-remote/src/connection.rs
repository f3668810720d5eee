//! SSH connection establishment and authentication

use crate::client::SshSession;
use globcp_config::RemoteConfig;
use globcp_types::{Error, Result, SessionConnector};
use ssh2::{KeyboardInteractivePrompt, Prompt, Session};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Opens [`SshSession`]s to the configured remote host
#[derive(Debug, Clone)]
pub struct SshConnector {
    config: RemoteConfig,
}

impl SshConnector {
    /// Create a connector for `config`
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }

    /// Remote endpoint configuration
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl SessionConnector for SshConnector {
    type Session = SshSession;

    async fn connect(&self) -> Result<SshSession> {
        let config = self.config.clone();
        let timeout = config.connect_timeout();
        let host = config.host.clone();

        info!("Connecting to {}", config.address());
        let task = tokio::task::spawn_blocking(move || open_session(&config));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(Error::connection(host, format!("connect task failed: {}", e))),
            Err(_) => Err(Error::Timeout {
                seconds: timeout.as_secs(),
            }),
        }
    }
}

/// Connect, handshake and authenticate. Runs on a blocking thread.
fn open_session(config: &RemoteConfig) -> Result<SshSession> {
    let fail = |message: String| Error::connection(&config.host, message);
    let timeout = config.connect_timeout();

    let addr = resolve(config).map_err(fail)?;
    let tcp = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|e| fail(format!("TCP connection to {} failed: {}", addr, e)))?;
    debug!("TCP connection to {} established", addr);

    let mut session =
        Session::new().map_err(|e| fail(format!("Failed to create SSH session: {}", e)))?;
    session.set_timeout(timeout_millis(timeout));
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| fail(format!("SSH handshake failed: {}", e)))?;

    let method = authenticate(&session, config)
        .map_err(|e| fail(format!("Authentication failed: {}", e)))?;
    info!("Authenticated to {} via {}", config.address(), method);

    let sftp = session
        .sftp()
        .map_err(|e| fail(format!("Failed to open SFTP subsystem: {}", e)))?;

    // Only connection establishment is bounded
    session.set_timeout(0);

    Ok(SshSession::new(config.host.clone(), session, sftp))
}

fn resolve(config: &RemoteConfig) -> std::result::Result<SocketAddr, String> {
    (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|e| format!("Invalid address '{}': {}", config.address(), e))?
        .next()
        .ok_or_else(|| format!("'{}' did not resolve to any address", config.address()))
}

fn timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

/// Answers every keyboard-interactive prompt with the configured password
struct PasswordPrompt<'a> {
    password: &'a str,
}

impl KeyboardInteractivePrompt for PasswordPrompt<'_> {
    fn prompt<'p>(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[Prompt<'p>],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.password.to_string()).collect()
    }
}

/// The authentication attempts an SSH session offers.
///
/// Each attempt reports whether the session is authenticated afterwards.
trait Authenticate {
    fn try_agent(&self, username: &str) -> bool;
    fn try_key_file(
        &self,
        username: &str,
        key_path: &Path,
        passphrase: Option<&str>,
    ) -> std::result::Result<bool, String>;
    fn try_password(&self, username: &str, password: &str) -> bool;
    fn try_keyboard_interactive(&self, username: &str, password: &str) -> bool;
}

impl Authenticate for Session {
    fn try_agent(&self, username: &str) -> bool {
        let Ok(mut agent) = self.agent() else {
            return false;
        };
        if agent.connect().is_err() || agent.list_identities().is_err() {
            return false;
        }
        agent
            .identities()
            .unwrap_or_default()
            .iter()
            .any(|identity| agent.userauth(username, identity).is_ok() && self.authenticated())
    }

    fn try_key_file(
        &self,
        username: &str,
        key_path: &Path,
        passphrase: Option<&str>,
    ) -> std::result::Result<bool, String> {
        self.userauth_pubkey_file(username, None, key_path, passphrase)
            .map(|()| self.authenticated())
            .map_err(|e| e.to_string())
    }

    fn try_password(&self, username: &str, password: &str) -> bool {
        self.userauth_password(username, password).is_ok() && self.authenticated()
    }

    fn try_keyboard_interactive(&self, username: &str, password: &str) -> bool {
        let mut prompt = PasswordPrompt { password };
        self.userauth_keyboard_interactive(username, &mut prompt)
            .is_ok()
            && self.authenticated()
    }
}

/// Try agent, key file, password and keyboard-interactive authentication in turn
fn authenticate<A: Authenticate>(
    session: &A,
    config: &RemoteConfig,
) -> std::result::Result<&'static str, String> {
    let username = config.username.as_str();

    if config.use_agent {
        if session.try_agent(username) {
            return Ok("agent");
        }
        debug!("Agent authentication unavailable for {}", username);
    }

    if let Some(key_path) = &config.private_key_path {
        let passphrase = config.private_key_passphrase.as_deref();
        match session.try_key_file(username, key_path, passphrase) {
            Ok(true) => return Ok("publickey"),
            Ok(false) => debug!("Public key '{}' did not authenticate", key_path.display()),
            Err(e) => warn!("Public key '{}' rejected: {}", key_path.display(), e),
        }
    }

    if let Some(password) = &config.password {
        if session.try_password(username, password) {
            return Ok("password");
        }
        if session.try_keyboard_interactive(username, password) {
            return Ok("keyboard-interactive");
        }
    }

    Err(format!("no authentication method succeeded for '{}'", username))
}
