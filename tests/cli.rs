use std::time::Duration;

use assert_cmd::Command;

fn tailf() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tailf"));
    cmd.timeout(Duration::from_secs(10));
    cmd
}

#[test]
fn test_missing_file_reports_and_exits() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.log");

    let output = tailf().arg(&missing).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("File not found"), "stderr: {}", stderr);
}

#[test]
fn test_zero_line_count_rejected() {
    let tmp = tempfile::NamedTempFile::new().unwrap();

    let output = tailf().args(["-n", "0"]).arg(tmp.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line count must be >= 1"), "stderr: {}", stderr);
}

#[test]
fn test_file_argument_required() {
    tailf().assert().failure().code(2);
}
