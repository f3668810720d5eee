//! Remote target cleanup commands
//!
//! The remote OS cannot be detected over the session, so the caller states
//! it. Both command forms empty the target folder but keep the folder itself.

/// Shell family of the remote host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteOs {
    /// POSIX `sh` compatible shell
    #[default]
    Posix,
    /// Windows `cmd.exe`
    Windows,
}

impl RemoteOs {
    /// Pick the shell family from the configured flag
    pub fn from_windows_flag(remote_is_windows: bool) -> Self {
        if remote_is_windows {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Build the command that removes everything under `target_root`.
///
/// The POSIX form succeeds when the folder does not exist yet.
pub fn cleanup_command(target_root: &str, os: RemoteOs) -> String {
    match os {
        RemoteOs::Posix => {
            let folder = posix_quote(target_root);
            format!("[ ! -d {folder} ] || find {folder} -mindepth 1 -maxdepth 1 -exec rm -rf {{}} +")
        }
        RemoteOs::Windows => {
            let folder = windows_folder(target_root);
            format!(
                "del /q /f \"{folder}\\*\" & for /d %d in (\"{folder}\\*\") do @rd /s /q \"%d\""
            )
        }
    }
}

/// Single-quote for `sh`; embedded quotes become `'\''`
fn posix_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn windows_folder(target_root: &str) -> String {
    let folder = target_root.replace('/', "\\");
    let folder = folder.trim_end_matches('\\');
    if folder.is_empty() {
        // `/` alone would trim to nothing
        if target_root.starts_with('/') {
            "\\".to_string()
        } else {
            ".".to_string()
        }
    } else {
        folder.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "./",
        "[ ! -d './' ] || find './' -mindepth 1 -maxdepth 1 -exec rm -rf {} +"
    )]
    #[case(
        "/var/www",
        "[ ! -d '/var/www' ] || find '/var/www' -mindepth 1 -maxdepth 1 -exec rm -rf {} +"
    )]
    #[case(
        "it's here",
        r"[ ! -d 'it'\''s here' ] || find 'it'\''s here' -mindepth 1 -maxdepth 1 -exec rm -rf {} +"
    )]
    fn test_posix_command(#[case] target: &str, #[case] expected: &str) {
        assert_eq!(cleanup_command(target, RemoteOs::Posix), expected);
    }

    #[rstest]
    #[case(
        "./",
        r#"del /q /f ".\*" & for /d %d in (".\*") do @rd /s /q "%d""#
    )]
    #[case(
        "C:/inetpub/wwwroot/",
        r#"del /q /f "C:\inetpub\wwwroot\*" & for /d %d in ("C:\inetpub\wwwroot\*") do @rd /s /q "%d""#
    )]
    #[case(
        "deploy/site",
        r#"del /q /f "deploy\site\*" & for /d %d in ("deploy\site\*") do @rd /s /q "%d""#
    )]
    fn test_windows_command(#[case] target: &str, #[case] expected: &str) {
        assert_eq!(cleanup_command(target, RemoteOs::Windows), expected);
    }

    #[test]
    fn test_os_from_flag() {
        assert_eq!(RemoteOs::from_windows_flag(true), RemoteOs::Windows);
        assert_eq!(RemoteOs::from_windows_flag(false), RemoteOs::Posix);
        assert_eq!(RemoteOs::default(), RemoteOs::Posix);
    }

    #[cfg(unix)]
    fn run_sh(command: &str) -> std::process::ExitStatus {
        std::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_posix_command_empties_folder_but_keeps_it() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("site");
        std::fs::create_dir_all(target.join("sub")).unwrap();
        std::fs::write(target.join("a.txt"), "a").unwrap();
        std::fs::write(target.join(".hidden"), "h").unwrap();
        std::fs::write(target.join("sub/b.txt"), "b").unwrap();

        let status = run_sh(&cleanup_command(&target.to_string_lossy(), RemoteOs::Posix));

        assert!(status.success());
        assert!(target.is_dir());
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_posix_command_succeeds_without_folder() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("not-yet-deployed");

        let status = run_sh(&cleanup_command(&target.to_string_lossy(), RemoteOs::Posix));

        assert!(status.success());
        assert!(!target.exists());
    }
}
