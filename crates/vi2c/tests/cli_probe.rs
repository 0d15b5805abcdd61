#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::Command;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/vi2c-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn vi2c() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vi2c"));
    cmd.env_remove("VI2C_DEVICE").arg("--log-level").arg("error");
    cmd
}

#[test]
fn probe_against_stand_in_file_echoes_pattern() {
    let dir = unique_temp_dir("probe");
    let device = dir.join("vI2C");

    let output = vi2c()
        .arg("--format")
        .arg("json")
        .arg("--device")
        .arg(&device)
        .arg("probe")
        .output()
        .expect("probe should run");

    assert!(output.status.success());
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("probe should emit json");
    assert_eq!(payload["written"], 6);
    assert_eq!(payload["received"], "01 02 03 01 02 03");
    assert_eq!(payload["echoed"], true);
    assert_eq!(
        std::fs::read(&device).expect("stand-in should exist"),
        vec![1, 2, 3, 1, 2, 3]
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn probe_loopback_reads_full_buffer() {
    let output = vi2c()
        .arg("--format")
        .arg("json")
        .arg("probe")
        .arg("--loopback")
        .output()
        .expect("probe should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("exchange-report.schema.json"));
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(payload["received_size"], 1024);
    assert_eq!(payload["trailing_size"], 1018);
    assert_eq!(payload["backend"], "loopback");
}

#[test]
fn probe_raw_prints_received_bytes() {
    let dir = unique_temp_dir("raw");
    let device = dir.join("vI2C");

    let output = vi2c()
        .env("VI2C_DEVICE", &device)
        .arg("--format")
        .arg("raw")
        .arg("probe")
        .arg("--pattern")
        .arg("0x41 0x42")
        .arg("--repeat")
        .arg("3")
        .output()
        .expect("probe should run");

    assert!(output.status.success());
    assert_eq!(output.stdout, b"ABABAB");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn probe_missing_device_directory_fails() {
    let dir = unique_temp_dir("missing");
    let device = dir.join("no-such-dir").join("vI2C");

    let output = vi2c()
        .arg("--device")
        .arg(&device)
        .arg("probe")
        .output()
        .expect("probe should run");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: probe failed"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn probe_bad_pattern_is_usage_error() {
    let output = vi2c()
        .arg("probe")
        .arg("--loopback")
        .arg("--pattern")
        .arg("xyz")
        .output()
        .expect("probe should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn expect_echo_fails_when_read_is_short() {
    let output = vi2c()
        .arg("--format")
        .arg("json")
        .arg("probe")
        .arg("--loopback")
        .arg("--read-len")
        .arg("2")
        .arg("--expect-echo")
        .output()
        .expect("probe should run");

    assert_eq!(output.status.code(), Some(1));
}
