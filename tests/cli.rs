use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;

/// Helper to get a temporary home directory
fn temp_home() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Helper to get the session file path in the temp home
fn session_file_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join(".otp-gateway").join("session.json")
}

const BINARY_NAME: &str = "otp-gateway";

/// Points the binary at a backend nobody listens on.
fn command(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.env("HOME", home.path())
        .env("OTP_GATEWAY_API_URL", "http://127.0.0.1:9")
        .env_remove("OTP_GATEWAY_ENVIRONMENT")
        .env_remove("OTP_GATEWAY_SESSION_SECRET")
        .env_remove("OTP_GATEWAY_API_KEY");
    cmd
}

#[test]
/// Help command should display usage information.
fn cli_help_displays_usage() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("Usage: otp-gateway"))
        .stdout(contains("refresh-qr"));
}

#[test]
/// Logout command should delete an existing session file.
fn logout_deletes_session_file() {
    let tmp = temp_home();
    let session_path = session_file_path(&tmp);
    fs::create_dir_all(session_path.parent().unwrap()).unwrap();
    fs::write(&session_path, "{}").unwrap();
    assert!(session_path.exists());

    command(&tmp)
        .arg("logout")
        .assert()
        .success()
        .stdout(contains("Logging out"));

    assert!(!session_path.exists());
}

#[test]
fn register_rejects_mismatched_passwords() {
    let tmp = temp_home();
    command(&tmp)
        .args([
            "register",
            "--name",
            "Sari",
            "--email",
            "sari@example.com",
            "--password",
            "secret1",
            "--confirm-password",
            "secret2",
        ])
        .assert()
        .failure()
        .stdout(contains("Passwords do not match"));
}

#[test]
fn status_requires_login() {
    let tmp = temp_home();
    command(&tmp)
        .arg("status")
        .assert()
        .failure()
        .stdout(contains("Not logged in"));
}

#[test]
fn logs_rejects_unknown_status_filter() {
    let tmp = temp_home();
    command(&tmp)
        .args(["logs", "--status", "pending"])
        .assert()
        .failure()
        .stderr(contains("invalid value"));
}

#[test]
fn logs_help_offers_full_messages() {
    let tmp = temp_home();
    command(&tmp)
        .args(["logs", "--help"])
        .assert()
        .success()
        .stdout(contains("--full"));
}
