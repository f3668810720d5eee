//! SSH/SFTP session operations

use globcp_types::{Error, RemoteSession, Result};
use ssh2::{ErrorCode, Session, Sftp};
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// `LIBSSH2_FX_NO_SUCH_FILE`
const SFTP_NO_SUCH_FILE: i32 = 2;

/// Pause between polls while a remote command is still running
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Permissions for directories created on the remote side
const REMOTE_DIR_MODE: i32 = 0o755;

/// An authenticated SSH session with an open SFTP channel
pub struct SshSession {
    host: String,
    session: Session,
    sftp: Arc<Sftp>,
    closed: bool,
}

impl SshSession {
    pub(crate) fn new(host: String, session: Session, sftp: Sftp) -> Self {
        Self {
            host,
            session,
            sftp: Arc::new(sftp),
            closed: false,
        }
    }
}

impl std::fmt::Debug for SshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSession")
            .field("host", &self.host)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// Run blocking libssh2 work off the async executor
async fn blocking<F, T>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Io {
            message: format!("SSH worker task failed: {}", e),
        })?
}

#[async_trait::async_trait]
impl RemoteSession for SshSession {
    async fn execute(&mut self, command: &str) -> Result<String> {
        let session = self.session.clone();
        let command = command.to_string();
        blocking(move || run_command(&session, &command)).await
    }

    async fn exists(&mut self, remote_path: &str) -> Result<bool> {
        let sftp = Arc::clone(&self.sftp);
        let remote_path = remote_path.to_string();
        blocking(move || stat_exists(&sftp, &remote_path)).await
    }

    async fn transfer(&mut self, local_path: &Path, remote_path: &str) -> Result<()> {
        let sftp = Arc::clone(&self.sftp);
        let local_path = local_path.to_path_buf();
        let remote_path = remote_path.to_string();
        blocking(move || upload(&sftp, &local_path, &remote_path)).await
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let session = self.session.clone();
        let host = self.host.clone();
        let result = tokio::task::spawn_blocking(move || {
            session.disconnect(None, "globcp run finished", None)
        })
        .await;

        match result {
            Ok(Ok(())) => debug!("Disconnected from {}", host),
            Ok(Err(e)) => warn!("Disconnect from {} was not clean: {}", host, e),
            Err(e) => warn!("Disconnect task for {} failed: {}", host, e),
        }
    }
}

fn run_command(session: &Session, command: &str) -> Result<String> {
    let fail = |message: String| Error::remote_command(command, message);

    let mut channel = session
        .channel_session()
        .map_err(|e| fail(format!("cannot open channel: {}", e)))?;
    channel.exec(command).map_err(|e| fail(e.to_string()))?;

    // Both streams share the channel window; drain them together
    session.set_blocking(false);
    let drained = drain_streams(&mut channel.stream(0), &mut channel.stderr(), || {
        channel.eof()
    });
    session.set_blocking(true);
    let (stdout, stderr) = drained.map_err(|e| fail(format!("cannot read output: {}", e)))?;

    channel.wait_close().map_err(|e| fail(e.to_string()))?;
    let status = channel.exit_status().map_err(|e| fail(e.to_string()))?;
    if status != 0 {
        return Err(fail(format!("exit status {}: {}", status, stderr.trim())));
    }

    debug!("Remote command succeeded: {}", command);
    Ok(stdout)
}

/// Read two non-blocking streams in turn until both are exhausted and `eof` reports true
fn drain_streams<O, E, F>(stdout: &mut O, stderr: &mut E, eof: F) -> io::Result<(String, String)>
where
    O: Read,
    E: Read,
    F: Fn() -> bool,
{
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut buf = [0u8; 8192];

    loop {
        let read_out = read_some(stdout, &mut buf, &mut out)?;
        let read_err = read_some(stderr, &mut buf, &mut err)?;
        if read_out || read_err {
            continue;
        }
        if eof() {
            break;
        }
        std::thread::sleep(DRAIN_POLL);
    }

    Ok((
        String::from_utf8_lossy(&out).into_owned(),
        String::from_utf8_lossy(&err).into_owned(),
    ))
}

/// One read into `sink`; `true` when bytes arrived
fn read_some<R: Read>(stream: &mut R, buf: &mut [u8], sink: &mut Vec<u8>) -> io::Result<bool> {
    match stream.read(buf) {
        Ok(0) => Ok(false),
        Ok(n) => {
            sink.extend_from_slice(&buf[..n]);
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(true),
        Err(e) => Err(e),
    }
}

fn stat_exists(sftp: &Sftp, remote_path: &str) -> Result<bool> {
    match sftp.stat(Path::new(remote_path)) {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.code(), ErrorCode::SFTP(SFTP_NO_SUCH_FILE)) => Ok(false),
        Err(e) => Err(Error::Io {
            message: format!("Failed to stat remote '{}': {}", remote_path, e),
        }),
    }
}

fn upload(sftp: &Sftp, local_path: &Path, remote_path: &str) -> Result<()> {
    let fail = |message: String| Error::transfer(local_path, remote_path, message);

    let mut source = std::fs::File::open(local_path)
        .map_err(|e| fail(format!("cannot open local file: {}", e)))?;

    for dir in parent_dirs(remote_path) {
        let path = Path::new(dir);
        let mkdir = || {
            debug!("Creating remote directory '{}'", dir);
            sftp.mkdir(path, REMOTE_DIR_MODE)
        };
        ensure_dir(|| sftp.stat(path).is_ok(), mkdir)
            .map_err(|e| fail(format!("cannot create remote directory '{}': {}", dir, e)))?;
    }

    let mut target = sftp
        .create(Path::new(remote_path))
        .map_err(|e| fail(format!("cannot create remote file: {}", e)))?;
    let bytes = std::io::copy(&mut source, &mut target).map_err(|e| fail(e.to_string()))?;

    debug!(
        "Uploaded {} bytes from '{}' to '{}'",
        bytes,
        local_path.display(),
        remote_path
    );
    Ok(())
}

/// Create a folder unless `exists` already reports it.
///
/// Some SFTP roots refuse `stat` on folders that do exist, so a failed
/// `mkdir` is only an error when a second `exists` check fails too.
fn ensure_dir<S, M, E>(exists: S, mkdir: M) -> std::result::Result<(), E>
where
    S: Fn() -> bool,
    M: FnOnce() -> std::result::Result<(), E>,
{
    if exists() {
        return Ok(());
    }
    match mkdir() {
        Ok(()) => Ok(()),
        Err(_) if exists() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Every ancestor directory of `remote_path`, outermost first.
///
/// The filesystem root and `.` are left out since they always exist.
fn parent_dirs(remote_path: &str) -> Vec<&str> {
    let Some(parent_end) = remote_path.rfind('/') else {
        return Vec::new();
    };
    let parent = &remote_path[..parent_end];

    parent
        .match_indices('/')
        .map(|(i, _)| &parent[..i])
        .chain(std::iter::once(parent))
        .filter(|dir| !dir.is_empty() && *dir != "." && *dir != "..")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.txt", vec![])]
    #[case("./a.txt", vec![])]
    #[case("/a.txt", vec![])]
    #[case("sub/a.txt", vec!["sub"])]
    #[case("/var/www/sub/a.txt", vec!["/var", "/var/www", "/var/www/sub"])]
    #[case("./deploy/x/a.txt", vec!["./deploy", "./deploy/x"])]
    fn test_parent_dirs(#[case] remote: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parent_dirs(remote), expected);
    }

    /// Blocks for the first `stalls` reads, then hands out small chunks
    struct Stutter {
        data: std::io::Cursor<Vec<u8>>,
        stalls: usize,
    }

    impl Stutter {
        fn new(data: &[u8], stalls: usize) -> Self {
            Self {
                data: std::io::Cursor::new(data.to_vec()),
                stalls,
            }
        }
    }

    impl Read for Stutter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.stalls > 0 {
                self.stalls -= 1;
                return Err(io::ErrorKind::WouldBlock.into());
            }
            let len = buf.len().min(100);
            self.data.read(&mut buf[..len])
        }
    }

    #[test]
    fn test_ensure_dir_skips_existing_folder() {
        let result: std::result::Result<(), &str> =
            ensure_dir(|| true, || panic!("mkdir must not run"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_ensure_dir_accepts_failed_mkdir_when_folder_is_present() {
        let stats = std::cell::Cell::new(0);
        let result = ensure_dir(
            || {
                stats.set(stats.get() + 1);
                stats.get() > 1
            },
            || Err("permission denied"),
        );

        assert!(result.is_ok());
        assert_eq!(stats.get(), 2);
    }

    #[test]
    fn test_ensure_dir_fails_when_folder_stays_missing() {
        assert_eq!(ensure_dir(|| false, || Err("no space")), Err("no space"));
    }

    #[test]
    fn test_drain_streams_reads_both_streams_together() {
        let stderr_data = vec![b'e'; 64 * 1024];
        let mut stdout = Stutter::new(b"done\n", 2);
        let mut stderr = Stutter::new(&stderr_data, 3);
        let polls = std::cell::Cell::new(0);

        let (out, err) = drain_streams(&mut stdout, &mut stderr, || {
            polls.set(polls.get() + 1);
            polls.get() >= 3
        })
        .unwrap();

        assert_eq!(out, "done\n");
        assert_eq!(err.len(), stderr_data.len());
        assert_eq!(polls.get(), 3);
    }

    #[test]
    fn test_drain_streams_propagates_read_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::ErrorKind::ConnectionReset.into())
            }
        }

        let result = drain_streams(&mut Broken, &mut io::empty(), || true);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::ConnectionReset);
    }
}
