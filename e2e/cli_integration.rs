// e2e/cli_integration.rs — black-box tests of the `pocketplus` binary.
//
// Drives the compiled CLI through std::process::Command: compress and
// decompress dispatch, output-name resolution, overwrite refusal, test
// mode, stdout mode, and exit codes.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// Locate the binary produced by Cargo.
fn pocketplus_bin() -> PathBuf {
    // CARGO_BIN_EXE_pocketplus is set by Cargo when running integration tests.
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_pocketplus") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("pocketplus");
    p
}

/// Create a TempDir containing a telemetry-shaped input: 40 packets of 90
/// bytes, mostly static with a moving counter.
fn make_temp_input() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let input_path = dir.path().join("telemetry.bin");
    let mut data = Vec::with_capacity(40 * 90);
    for t in 0..40u8 {
        let mut packet = [0u8; 90];
        packet[0] = t;
        packet[5] = t.wrapping_mul(3);
        packet[89] = 0xA5;
        data.extend_from_slice(&packet);
    }
    fs::write(&input_path, &data).unwrap();
    (dir, input_path)
}

// ── 1. Compress / decompress round trip via default filenames ───────────────

#[test]
fn cli_roundtrip_with_default_names() {
    let (dir, input) = make_temp_input();
    let original = fs::read(&input).unwrap();

    let status = Command::new(pocketplus_bin())
        .args([input.to_str().unwrap()])
        .current_dir(dir.path())
        .status()
        .expect("failed to run pocketplus");
    assert!(status.success(), "compress should exit 0");

    let packed = dir.path().join("telemetry.bin.pkt");
    assert!(packed.exists(), "default .pkt output should exist");
    assert!(fs::metadata(&packed).unwrap().len() < original.len() as u64);

    let status = Command::new(pocketplus_bin())
        .args(["-d", packed.to_str().unwrap()])
        .current_dir(dir.path())
        .status()
        .expect("failed to run pocketplus -d");
    assert!(status.success(), "decompress should exit 0");

    let restored = fs::read(dir.path().join("telemetry.bin.depkt")).unwrap();
    assert_eq!(restored, original, "round trip must be lossless");
}

// ── 2. Explicit output path and parameters ──────────────────────────────────

#[test]
fn cli_explicit_output_and_parameters() {
    let (dir, input) = make_temp_input();
    let original = fs::read(&input).unwrap();
    let packed = dir.path().join("out.pp");
    let restored = dir.path().join("back.bin");

    let status = Command::new(pocketplus_bin())
        .args([
            input.to_str().unwrap(),
            "-o",
            packed.to_str().unwrap(),
            "-R",
            "7",
            "--pt",
            "5",
            "--ft",
            "9",
            "--rt",
            "13",
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let status = Command::new(pocketplus_bin())
        .args([
            "-d",
            packed.to_str().unwrap(),
            "-o",
            restored.to_str().unwrap(),
            "-R",
            "7",
        ])
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(fs::read(&restored).unwrap(), original);
}

// ── 3. Overwrite protection ─────────────────────────────────────────────────

#[test]
fn cli_refuses_overwrite_without_force() {
    let (dir, input) = make_temp_input();
    let packed = dir.path().join("telemetry.bin.pkt");
    fs::write(&packed, b"already here").unwrap();

    let output = Command::new(pocketplus_bin())
        .args([input.to_str().unwrap()])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success(), "clobbering must fail without -f");
    assert_eq!(fs::read(&packed).unwrap(), b"already here");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("-f"), "error should point at -f: {stderr}");

    let status = Command::new(pocketplus_bin())
        .args(["-f", input.to_str().unwrap()])
        .current_dir(dir.path())
        .status()
        .unwrap();
    assert!(status.success(), "-f should allow the overwrite");
    assert_ne!(fs::read(&packed).unwrap(), b"already here");
}

// ── 4. Test mode ────────────────────────────────────────────────────────────

#[test]
fn cli_test_mode_verifies_without_output() {
    let (dir, input) = make_temp_input();
    let status = Command::new(pocketplus_bin())
        .args(["-t", input.to_str().unwrap()])
        .current_dir(dir.path())
        .status()
        .unwrap();
    assert!(status.success(), "-t on a valid stream should exit 0");
    assert!(
        !dir.path().join("telemetry.bin.pkt").exists(),
        "test mode must not write output"
    );
}

// ── 5. Stdout mode ──────────────────────────────────────────────────────────

#[test]
fn cli_stdout_mode_emits_compressed_bytes() {
    let (dir, input) = make_temp_input();
    let original = fs::read(&input).unwrap();

    let output = Command::new(pocketplus_bin())
        .args(["-c", input.to_str().unwrap()])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!output.stdout.is_empty());

    // Feed the captured bytes back through -d -c.
    let packed_path = dir.path().join("captured.pkt");
    fs::write(&packed_path, &output.stdout).unwrap();
    let back = Command::new(pocketplus_bin())
        .args(["-d", "-c", packed_path.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(back.status.success());
    assert_eq!(back.stdout, original);
}

// ── 6. Error paths ──────────────────────────────────────────────────────────

#[test]
fn cli_rejects_partial_trailing_packet() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("short.bin");
    fs::write(&input, vec![0u8; 91]).unwrap();

    let output = Command::new(pocketplus_bin())
        .args([input.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("multiple of the packet size"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn cli_rejects_out_of_range_robustness() {
    let (_dir, input) = make_temp_input();
    let output = Command::new(pocketplus_bin())
        .args([input.to_str().unwrap(), "-R", "8"])
        .output()
        .unwrap();
    assert!(!output.status.success(), "-R 8 must be rejected at parse");
}

#[test]
fn cli_reports_missing_input() {
    let output = Command::new(pocketplus_bin())
        .args(["definitely-not-here.bin"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot read"), "unexpected stderr: {stderr}");
}

#[test]
fn cli_rejects_truncated_compressed_stream() {
    let (dir, input) = make_temp_input();
    let status = Command::new(pocketplus_bin())
        .args([input.to_str().unwrap()])
        .current_dir(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let packed = dir.path().join("telemetry.bin.pkt");
    let mut bytes = fs::read(&packed).unwrap();
    // Cut inside the first (uncompressed) packet segment so the failure is
    // unambiguous rather than landing on a segment boundary.
    bytes.truncate(50);
    let cut = dir.path().join("cut.pkt");
    fs::write(&cut, &bytes).unwrap();

    let output = Command::new(pocketplus_bin())
        .args(["-d", cut.to_str().unwrap()])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success(), "truncated stream must fail");
}

// ── 7. Version banner ───────────────────────────────────────────────────────

#[test]
fn cli_version() {
    let output = Command::new(pocketplus_bin())
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1.0.0"), "unexpected version: {stdout}");
}
