#![cfg(feature = "cli")]

use std::process::Command;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_flashpatch").to_string()
}

#[test]
fn cli_build_inspect_roundtrip() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("update.patch");

    std::fs::write(&base, b"abcde12345abcde12345").unwrap();
    std::fs::write(&target, b"abcdeXXXXXabcde12345!").unwrap();

    let st = Command::new(bin())
        .args(["build", "--abi", "3", "--opset-hash", "0xCAFEF00D"])
        .arg(&base)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin())
        .args(["inspect", "--base"])
        .arg(&base)
        .arg("--target")
        .arg(&target)
        .arg(&patch)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("ABI version:         3"), "{stdout}");
    assert!(stdout.contains("0xcafef00d"), "{stdout}");
    assert!(stdout.contains("verify:                OK"), "{stdout}");
}

#[test]
fn cli_inspect_detects_wrong_target() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let target = dir.path().join("target.bin");
    let other = dir.path().join("other.bin");
    let patch = dir.path().join("update.patch");

    std::fs::write(&base, b"0000000000").unwrap();
    std::fs::write(&target, b"0000110000").unwrap();
    std::fs::write(&other, b"0000220000").unwrap();

    let st = Command::new(bin())
        .arg("build")
        .arg(&base)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .args(["-q", "inspect", "--base"])
        .arg(&base)
        .arg("--target")
        .arg(&other)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(!st.success());
}

#[test]
fn cli_inspect_json_reports_failed_verification() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let target = dir.path().join("target.bin");
    let other = dir.path().join("other.bin");
    let patch = dir.path().join("update.patch");

    std::fs::write(&base, b"0000000000").unwrap();
    std::fs::write(&target, b"0000110000").unwrap();
    std::fs::write(&other, b"0000220000").unwrap();

    let st = Command::new(bin())
        .arg("build")
        .arg(&base)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());

    let inspect = |target: &std::path::Path| {
        Command::new(bin())
            .args(["-q", "--json", "inspect", "--base"])
            .arg(&base)
            .arg("--target")
            .arg(target)
            .arg(&patch)
            .output()
            .unwrap()
    };
    let json_of = |stderr: &[u8]| -> serde_json::Value {
        let text = String::from_utf8_lossy(stderr);
        let start = text.find('{').expect("json object on stderr");
        serde_json::from_str(&text[start..]).unwrap()
    };

    let out = inspect(&other);
    assert!(!out.status.success());
    let report = json_of(&out.stderr);
    assert_eq!(report["command"], "inspect");
    assert_eq!(report["verified"], false);

    let out = inspect(&target);
    assert!(out.status.success());
    assert_eq!(json_of(&out.stderr)["verified"], true);
}

#[test]
fn cli_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("update.patch");

    std::fs::write(&base, b"aaaa").unwrap();
    std::fs::write(&target, b"abaa").unwrap();
    std::fs::write(&patch, b"keep me").unwrap();

    let st = Command::new(bin())
        .arg("build")
        .arg(&base)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&patch).unwrap(), b"keep me");

    let st = Command::new(bin())
        .args(["--force", "build"])
        .arg(&base)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());
    assert_ne!(std::fs::read(&patch).unwrap(), b"keep me");
}

#[test]
fn cli_missing_input_fails() {
    let dir = tempdir().unwrap();
    let out = Command::new(bin())
        .arg("build")
        .arg(dir.path().join("missing.bin"))
        .arg(dir.path().join("also-missing.bin"))
        .arg(dir.path().join("out.patch"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("missing.bin"), "{stderr}");
}

#[test]
fn cli_json_stats() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("update.patch");

    std::fs::write(&base, vec![0u8; 1000]).unwrap();
    std::fs::write(&target, vec![7u8; 1000]).unwrap();

    let out = Command::new(bin())
        .args(["--json", "build", "--digest", "none"])
        .arg(&base)
        .arg(&target)
        .arg(&patch)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(stats["command"], "build");
    assert_eq!(stats["chunks"], 1);
    assert_eq!(stats["rle_chunks"], 1);
    assert_eq!(stats["digest"], "none");
    assert_eq!(
        stats["patch_size"].as_u64().unwrap(),
        std::fs::metadata(&patch).unwrap().len()
    );
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("DEFAULT_MERGE_GAP=16"), "{stderr}");
}
