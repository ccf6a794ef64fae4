//! Local session integration tests.
//!
//! These run real `sh` processes against temporary directories.

#![cfg(unix)]

use std::path::PathBuf;

use tempfile::TempDir;
use tokio_test::assert_ok;

use termhop::{Session, SessionConfig, SessionState, TermhopError};

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    std::fs::create_dir(root.join("sub")).unwrap();
    std::fs::create_dir(root.join("sub").join("deeper")).unwrap();
    std::fs::write(root.join("notes.txt"), "hello\n").unwrap();
    Fixture { _dir: dir, root }
}

fn root_str(fx: &Fixture) -> String {
    fx.root.to_string_lossy().into_owned()
}

async fn connected(fx: &Fixture) -> Session {
    let config = SessionConfig {
        start_directory: Some(root_str(fx)),
        ..SessionConfig::default()
    };
    let mut session = Session::local(config);
    assert_ok!(session.connect().await);
    session
}

#[tokio::test]
async fn test_connect_uses_start_directory() {
    let fx = fixture();
    let session = connected(&fx).await;

    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(session.tracked_directory(), Some(root_str(&fx).as_str()));
}

#[tokio::test]
async fn test_single_cd_updates_directory() {
    let fx = fixture();
    let mut session = connected(&fx).await;

    let result = session.execute_command("cd sub").await.unwrap();
    let expected = fx.root.join("sub").to_string_lossy().into_owned();

    assert!(result.success);
    assert_eq!(result.output, expected);
    assert_eq!(session.tracked_directory(), Some(expected.as_str()));

    let result = session.execute_command("cd ..").await.unwrap();
    assert_eq!(result.output, root_str(&fx));
}

#[tokio::test]
async fn test_cd_missing_directory_is_soft_error() {
    let fx = fixture();
    let mut session = connected(&fx).await;

    let result = session.execute_command("cd missing").await.unwrap();
    let missing = fx.root.join("missing").to_string_lossy().into_owned();

    assert!(result.success);
    assert_eq!(
        result.output,
        format!("cd: {missing}: No such file or directory")
    );
    assert_eq!(session.tracked_directory(), Some(root_str(&fx).as_str()));
}

#[tokio::test]
async fn test_cd_into_file_is_not_a_directory() {
    let fx = fixture();
    let mut session = connected(&fx).await;

    let result = session.execute_command("cd notes.txt").await.unwrap();
    assert!(result.success);
    assert!(result.output.ends_with("Not a directory"));
    assert_eq!(session.tracked_directory(), Some(root_str(&fx).as_str()));
}

#[tokio::test]
async fn test_cd_into_unsearchable_directory_is_refused() {
    use std::os::unix::fs::PermissionsExt;

    // Root bypasses directory permissions.
    if unsafe { libc::geteuid() } == 0 {
        return;
    }

    let fx = fixture();
    let locked = fx.root.join("locked");
    std::fs::create_dir(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
    let mut session = connected(&fx).await;

    let result = session.execute_command("cd locked").await.unwrap();
    let listing = session.execute_command("ls").await;
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert!(result.success);
    assert_eq!(
        result.output,
        format!("cd: {}: Permission denied", locked.to_string_lossy())
    );
    assert_eq!(session.tracked_directory(), Some(root_str(&fx).as_str()));
    assert!(listing.unwrap().output.contains("notes.txt"));
}

#[tokio::test]
async fn test_completions_from_tracked_directory() {
    let fx = fixture();
    std::fs::write(fx.root.join("sub").join("zzcomplete_file.txt"), "").unwrap();
    let mut session = connected(&fx).await;
    session.execute_command("cd sub").await.unwrap();

    let candidates = session.get_completions("zzcomplete").await;

    assert!(candidates.contains(&"zzcomplete_file.txt".to_string()));
}

#[tokio::test]
async fn test_chain_runs_in_new_directory() {
    let fx = fixture();
    let mut session = connected(&fx).await;

    let result = session.execute_command("cd sub/deeper && pwd").await.unwrap();
    let expected = fx.root.join("sub").join("deeper");

    assert!(result.success);
    assert_eq!(result.output.trim(), expected.to_string_lossy());
    assert_eq!(
        session.tracked_directory(),
        Some(expected.to_string_lossy().as_ref())
    );
}

#[tokio::test]
async fn test_plain_command_keeps_directory() {
    let fx = fixture();
    let mut session = connected(&fx).await;
    session.execute_command("cd sub").await.unwrap();
    let before = session.tracked_directory().map(str::to_string);

    let result = session.execute_command("ls ..").await.unwrap();

    assert!(result.output.contains("notes.txt"));
    assert_eq!(session.tracked_directory(), before.as_deref());
}

#[tokio::test]
async fn test_cd_dash_returns_to_previous() {
    let fx = fixture();
    let mut session = connected(&fx).await;

    session.execute_command("cd sub").await.unwrap();
    let result = session.execute_command("cd -").await.unwrap();

    assert_eq!(result.output, root_str(&fx));
}

#[tokio::test]
async fn test_failing_command_still_succeeds() {
    let fx = fixture();
    let mut session = connected(&fx).await;

    let result = session.execute_command("cat does-not-exist").await.unwrap();
    assert!(result.success);
    assert!(result.output.contains("does-not-exist"));
}

#[tokio::test]
async fn test_execute_before_connect() {
    let mut session = Session::local(SessionConfig::default());

    let err = session.execute_command("ls").await.unwrap_err();
    assert!(matches!(err, TermhopError::NotConnected));
    assert!(session.get_completions("l").await.is_empty());
}

#[tokio::test]
async fn test_disconnect_clears_directory() {
    let fx = fixture();
    let mut session = connected(&fx).await;

    session.disconnect().await;
    session.disconnect().await;

    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(session.tracked_directory().is_none());
}

#[test]
fn test_blocking_round_trip() {
    let fx = fixture();
    tokio_test::block_on(async {
        let mut session = connected(&fx).await;
        let result = session.execute_command("").await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "");
    });
}
