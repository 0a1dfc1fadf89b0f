//! Integration tests for the `osr-parser` binary.

use std::path::Path;
use std::process::{Command, Output};

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(0x0B);
    buf.push(u8::try_from(s.len()).unwrap());
    buf.extend_from_slice(s.as_bytes());
}

/// A small but complete replay with a real LZMA payload.
fn replay_bytes(player: &str, score: i32) -> Vec<u8> {
    let mut payload = Vec::new();
    lzma_rs::lzma_compress(&mut &b"0|256|-500|0,16|120|80|1,"[..], &mut payload).unwrap();

    let mut buf = vec![0];
    buf.extend_from_slice(&20_200_104i32.to_le_bytes());
    write_string(&mut buf, "2857c41637b6c80d2c9c7fb5a9392635");
    write_string(&mut buf, player);
    buf.push(0x00);
    for count in [100i16, 10, 1, 20, 5, 0] {
        buf.extend_from_slice(&count.to_le_bytes());
    }
    buf.extend_from_slice(&score.to_le_bytes());
    buf.extend_from_slice(&313i16.to_le_bytes());
    buf.push(0);
    buf.extend_from_slice(&24i32.to_le_bytes());
    write_string(&mut buf, "0|1,500|0.75");
    buf.extend_from_slice(&637_144_704_001_234_567u64.to_le_bytes());
    buf.extend_from_slice(&i32::try_from(payload.len()).unwrap().to_le_bytes());
    buf.extend_from_slice(&payload);
    buf.extend_from_slice(&42i64.to_le_bytes());
    buf
}

fn run(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_osr-parser"))
        .args(args)
        .arg(dir)
        .output()
        .unwrap()
}

// ============================================================================
// batch
// ============================================================================

#[test]
fn test_batch_all_valid_succeeds() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("a.osr"), replay_bytes("alpha", 1000)).unwrap();
    std::fs::write(input.path().join("b.osr"), replay_bytes("beta", 3000)).unwrap();

    let out_arg = output.path().to_str().unwrap();
    let result = run(&["batch", "--output", out_arg, "--summary"], input.path());

    assert!(result.status.success());
    assert!(output.path().join("a.json").exists());
    assert!(output.path().join("b.json").exists());

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["successful"], 2);
    assert_eq!(summary["failed"], 0);
}

#[test]
fn test_batch_continue_on_error_still_reports_failure() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let mut broken = replay_bytes("broken", 0);
    broken.truncate(40);
    std::fs::write(input.path().join("a_broken.osr"), broken).unwrap();
    std::fs::write(input.path().join("b_good.osr"), replay_bytes("good", 2000)).unwrap();

    let out_arg = output.path().to_str().unwrap();
    let result = run(&["batch", "--output", out_arg, "--continue-on-error"], input.path());

    assert!(!result.status.success());
    // The good file after the broken one was still processed
    assert!(output.path().join("b_good.json").exists());
    assert!(!output.path().join("a_broken.json").exists());
}

#[test]
fn test_batch_stops_at_first_error() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("a_broken.osr"), [0x00, 0x01]).unwrap();
    std::fs::write(input.path().join("b_good.osr"), replay_bytes("good", 2000)).unwrap();

    let out_arg = output.path().to_str().unwrap();
    let result = run(&["batch", "--output", out_arg], input.path());

    assert!(!result.status.success());
    assert!(!output.path().join("b_good.json").exists());
}

#[test]
fn test_batch_empty_directory_fails() {
    let input = tempfile::tempdir().unwrap();
    let result = run(&["batch"], input.path());
    assert!(!result.status.success());
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.osr");
    let bad = dir.path().join("bad.osr");
    std::fs::write(&good, replay_bytes("good", 1)).unwrap();
    std::fs::write(&bad, [0x0B, 0xFF]).unwrap();

    let status = |path: &Path| {
        Command::new(env!("CARGO_BIN_EXE_osr-parser"))
            .arg("validate")
            .arg(path)
            .status()
            .unwrap()
    };

    assert!(status(&good).success());
    assert!(!status(&bad).success());
}
