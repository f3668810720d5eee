//! End-to-end tests for globcp copy runs
//!
//! Every run goes through [`CopyOrchestrator`] against the in-memory remote
//! from `globcp_tests::test_utils`.

use globcp_config::{Config, ConfigLoader};
use globcp_engine::{CopyOptions, CopyOrchestrator, RemoteOs};
use globcp_select::SelectionEngine;
use globcp_tests::{MockConnector, SessionCall, SourceTree};
use globcp_types::ErrorKind;
use rstest::rstest;
use std::path::PathBuf;
use tempfile::TempDir;

fn site_tree() -> SourceTree {
    SourceTree::with_files(&["a.txt", ".hidden", "sub/b.txt"])
}

fn relative(tree: &SourceTree, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|f| {
            f.strip_prefix(tree.path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_match_all_selects_hidden_and_nested_files() {
    let tree = site_tree();

    let selection = SelectionEngine::new().select_from(tree.path(), &["**"]).unwrap();

    assert_eq!(
        relative(&tree, selection.files()),
        vec![".hidden", "a.txt", "sub/b.txt"]
    );
}

#[tokio::test]
async fn test_copy_preserves_hierarchy() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let remote = MockConnector::new();
    let options = CopyOptions::new(tree.path(), ["**"]).with_target_root("/var/www");

    let report = CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert!(report.is_success());
    assert_eq!(report.attempted, 3);
    assert_eq!(report.copied, 3);
    assert_eq!(
        remote.transfers(),
        vec!["/var/www/.hidden", "/var/www/a.txt", "/var/www/sub/b.txt"]
    );
    assert_eq!(remote.remote_file("/var/www/sub/b.txt").unwrap(), b"sub/b.txt");
    Ok(())
}

#[tokio::test]
async fn test_exclusion_with_flatten() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let remote = MockConnector::new();
    let options = CopyOptions::new(tree.path(), ["**", "!sub/**"]).with_flatten(true);

    let report = CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert_eq!(report.attempted, 2);
    assert_eq!(remote.transfers(), vec![".hidden", "a.txt"]);
    Ok(())
}

#[tokio::test]
async fn test_flatten_uses_file_names_only() -> Result<(), Box<dyn std::error::Error>> {
    let tree = SourceTree::with_files(&["css/site.css", "js/app.js", "index.html"]);
    let remote = MockConnector::new();
    let options = CopyOptions::new(tree.path(), ["**/*.css", "**/*.js"])
        .with_target_root("~/public")
        .with_flatten(true);

    CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert_eq!(remote.transfers(), vec!["public/site.css", "public/app.js"]);
    Ok(())
}

#[tokio::test]
async fn test_existing_target_without_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let remote = MockConnector::new().with_remote_file("a.txt", b"remote copy");
    let options = CopyOptions::new(tree.path(), ["**"]).with_overwrite(false);

    let report = CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert!(!report.is_success());
    assert_eq!(report.attempted, 3);
    assert_eq!(report.copied, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].remote, "a.txt");
    assert_eq!(remote.remote_file("a.txt").unwrap(), b"remote copy");
    assert_eq!(remote.transfers(), vec![".hidden", "sub/b.txt"]);
    Ok(())
}

#[tokio::test]
async fn test_overwrite_replaces_existing_target() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let remote = MockConnector::new().with_remote_file("a.txt", b"remote copy");
    let options = CopyOptions::new(tree.path(), ["a.txt"]);

    let report = CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert!(report.is_success());
    assert_eq!(remote.remote_file("a.txt").unwrap(), b"a.txt");
    assert!(!remote
        .calls()
        .iter()
        .any(|c| matches!(c, SessionCall::Exists(_))));
    Ok(())
}

#[tokio::test]
async fn test_clean_then_copy_without_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let remote = MockConnector::new().with_remote_file("a.txt", b"stale");
    let options = CopyOptions::new(tree.path(), ["a.txt"])
        .with_overwrite(false)
        .with_clean(true, RemoteOs::Posix);

    let report = CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert!(report.is_success());
    assert_eq!(
        remote.commands(),
        vec!["[ ! -d './' ] || find './' -mindepth 1 -maxdepth 1 -exec rm -rf {} +"]
    );
    assert_eq!(remote.remote_paths(), vec!["a.txt"]);
    assert_eq!(remote.remote_file("a.txt").unwrap(), b"a.txt");
    Ok(())
}

#[tokio::test]
async fn test_windows_cleanup_command() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let remote = MockConnector::new();
    let options = CopyOptions::new(tree.path(), ["a.txt"])
        .with_target_root("C:/inetpub/site/")
        .with_clean(true, RemoteOs::Windows);

    CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert_eq!(
        remote.commands(),
        vec![r#"del /q /f "C:\inetpub\site\*" & for /d %d in ("C:\inetpub\site\*") do @rd /s /q "%d""#]
    );
    Ok(())
}

#[tokio::test]
async fn test_cleanup_failure_aborts_before_copy() {
    let tree = site_tree();
    let remote = MockConnector::new().fail_commands();
    let options = CopyOptions::new(tree.path(), ["**"]).with_clean(true, RemoteOs::Posix);

    let err = CopyOrchestrator::new(options, remote.clone())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteCommand);
    assert!(remote.transfers().is_empty());
    assert_eq!(remote.calls().last(), Some(&SessionCall::Close));
}

#[tokio::test]
async fn test_empty_selection_as_warning() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let remote = MockConnector::new();
    let options = CopyOptions::new(tree.path(), ["*.none"]).with_fail_on_empty(false);

    let report = CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert!(report.is_success());
    assert_eq!(report.attempted, 0);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(remote.calls(), vec![SessionCall::Connect, SessionCall::Close]);
    Ok(())
}

#[tokio::test]
async fn test_empty_selection_is_fatal_by_default() {
    let tree = site_tree();
    let remote = MockConnector::new();
    let options = CopyOptions::new(tree.path(), ["*.none"]);

    let err = CopyOrchestrator::new(options, remote.clone())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptySelection);
    assert_eq!(remote.close_count(), 1);
}

#[tokio::test]
async fn test_transfer_failure_does_not_stop_batch() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let remote = MockConnector::new().fail_transfer_to("a.txt");
    let options = CopyOptions::new(tree.path(), ["**"]);

    let report = CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.copied, 2);
    assert_eq!(report.failed, 1);
    assert!(report.failures[0].message.contains("connection reset"));
    assert_eq!(remote.transfers(), vec![".hidden", "a.txt", "sub/b.txt"]);
    Ok(())
}

#[tokio::test]
async fn test_failed_existence_check_counts_as_file_failure() -> Result<(), Box<dyn std::error::Error>>
{
    let tree = site_tree();
    let remote = MockConnector::new().fail_exists_for("sub/b.txt");
    let options = CopyOptions::new(tree.path(), ["**"]).with_overwrite(false);

    let report = CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].remote, "sub/b.txt");
    assert_eq!(remote.transfers(), vec![".hidden", "a.txt"]);
    Ok(())
}

#[tokio::test]
async fn test_invalid_source_root() {
    let remote = MockConnector::new();

    let tree = site_tree();
    let options = CopyOptions::new(tree.join("a.txt"), ["**"]);
    let err = CopyOrchestrator::new(options, remote.clone())
        .run()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSource);

    let options = CopyOptions::new(tree.join("missing"), ["**"]);
    let err = CopyOrchestrator::new(options, remote.clone())
        .run()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSource);

    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_connection_refused_owes_no_disconnect() {
    let tree = site_tree();
    let remote = MockConnector::new().refuse_connect();

    let err = CopyOrchestrator::new(CopyOptions::new(tree.path(), ["**"]), remote.clone())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.is_fatal());
    assert_eq!(remote.calls(), vec![SessionCall::Connect]);
}

#[rstest]
#[case::clean_run(MockConnector::new(), &["**"], true)]
#[case::cleanup_fails(MockConnector::new().fail_commands(), &["**"], true)]
#[case::empty_selection(MockConnector::new(), &["*.none"], false)]
#[case::transfer_fails(MockConnector::new().fail_transfer_to("a.txt"), &["**"], false)]
#[case::exists_fails(MockConnector::new().fail_exists_for("a.txt"), &["**"], false)]
#[tokio::test]
async fn test_session_closed_exactly_once(
    #[case] remote: MockConnector,
    #[case] patterns: &[&str],
    #[case] clean: bool,
) {
    let tree = site_tree();
    let options = CopyOptions::new(tree.path(), patterns.iter().copied())
        .with_overwrite(false)
        .with_clean(clean, RemoteOs::Posix);

    let _ = CopyOrchestrator::new(options, remote.clone()).run().await;

    assert_eq!(remote.close_count(), 1);
    assert_eq!(remote.calls().last(), Some(&SessionCall::Close));
}

#[tokio::test]
async fn test_dry_run_leaves_remote_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let remote = MockConnector::new().with_remote_file("a.txt", b"stale");
    let options = CopyOptions::new(tree.path(), ["**"])
        .with_clean(true, RemoteOs::Posix)
        .with_dry_run(true);

    let report = CopyOrchestrator::new(options, remote.clone()).run().await?;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.copied, 3);
    assert!(remote.commands().is_empty());
    assert!(remote.transfers().is_empty());
    assert_eq!(remote.remote_file("a.txt").unwrap(), b"stale");
    Ok(())
}

#[tokio::test]
async fn test_run_from_saved_config() -> Result<(), Box<dyn std::error::Error>> {
    let tree = site_tree();
    let config_dir = TempDir::new()?;
    let config_path = config_dir.path().join("globcp.yaml");

    let mut config = Config::default();
    config.source.root = tree.path().to_path_buf();
    config.source.patterns = vec!["**/*.txt".to_string(), "!sub/**".to_string()];
    config.target.root = "deploy".to_string();
    config.remote.host = "example.com".to_string();
    config.remote.username = "deploy".to_string();
    ConfigLoader::save_to_file(&config, &config_path)?;

    let loaded = ConfigLoader::load_from_file(&config_path)?;
    loaded.validate_for_run()?;

    let remote = MockConnector::new();
    let report = CopyOrchestrator::new(CopyOptions::from(&loaded), remote.clone())
        .run()
        .await?;

    assert!(report.is_success());
    assert_eq!(remote.transfers(), vec!["deploy/a.txt"]);
    Ok(())
}
