//! End-to-end tests for the pipecat binary.

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

// =============================================================================
// Helper functions
// =============================================================================

fn create_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

fn run_pipecat(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pipecat"))
        .args(args)
        .env_remove("PIPECAT_LOG")
        .output()
        .expect("Failed to run pipecat")
}

fn path(file: &NamedTempFile) -> &str {
    file.path().to_str().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// =============================================================================
// Flag scenarios
// =============================================================================

#[test]
fn test_plain_copy() {
    let file = create_file("a\n\tb\n\nc");
    let output = run_pipecat(&[path(&file)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "a\n\tb\n\nc\n");
}

#[test]
fn test_squeeze_then_number() {
    let file = create_file("a\n\n\nb\n");
    let output = run_pipecat(&["-s", "-n", path(&file)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1: a\n2: \n3: b\n");
}

#[test]
fn test_number_nonblank() {
    let file = create_file("x\n\ny\n");
    let output = run_pipecat(&["-b", path(&file)]);
    assert_eq!(stdout(&output), "1:x\n\n2:y\n");
}

#[test]
fn test_nonblank_overrides_number() {
    let file = create_file("x\n\ny\n");
    let output = run_pipecat(&["-n", "-b", path(&file)]);
    assert_eq!(stdout(&output), "1:x\n\n2:y\n");
}

#[test]
fn test_show_tabs() {
    let file = create_file("hello\tworld\nliteral \\t stays\n");
    let output = run_pipecat(&["-T", path(&file)]);
    assert_eq!(stdout(&output), "hello^Iworld\nliteral \\t stays\n");

    let lower = run_pipecat(&["-t", path(&file)]);
    assert_eq!(stdout(&lower), stdout(&output));
}

#[test]
fn test_show_ends_with_everything() {
    let file = create_file("a\tb\n\n\n\nc\n");
    let output = run_pipecat(&["-s", "-T", "-n", "-E", path(&file)]);
    assert_eq!(stdout(&output), "1: a^Ib$\n2: $\n3: c$\n");

    let lower = run_pipecat(&["-e", path(&file)]);
    assert_eq!(stdout(&lower), "a\tb$\n$\n$\n$\nc$\n");
}

#[test]
fn test_pull_executor_matches_threaded() {
    let file = create_file("a\tb\n\n\n\nc\n\nd\n");
    let threaded = run_pipecat(&["-s", "-T", "-b", "-E", path(&file)]);
    let pulled = run_pipecat(&["--executor", "pull", "-s", "-T", "-b", "-E", path(&file)]);
    assert_eq!(stdout(&threaded), stdout(&pulled));
}

// =============================================================================
// Multiple files
// =============================================================================

#[test]
fn test_numbering_continues_across_files() {
    let a = create_file("a\nb\n");
    let b = create_file("c\n");
    let output = run_pipecat(&["-n", path(&a), path(&b)]);
    assert_eq!(stdout(&output), "1: a\n2: b\n3: c\n");
}

#[test]
fn test_reset_numbering() {
    let a = create_file("a\nb\n");
    let b = create_file("c\n");
    let output = run_pipecat(&["-n", "--reset-numbering", path(&a), path(&b)]);
    assert_eq!(stdout(&output), "1: a\n2: b\n1: c\n");
}

#[test]
fn test_files_in_invocation_order() {
    let a = create_file("first\n");
    let b = create_file("second\n");
    let output = run_pipecat(&[path(&b), path(&a), path(&b)]);
    assert_eq!(stdout(&output), "second\nfirst\nsecond\n");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-file.txt");
    let output = run_pipecat(&[missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let err = stderr(&output);
    assert!(err.contains("no-such-file.txt"), "stderr: {err}");
    assert_eq!(err.lines().count(), 1, "stderr: {err}");
}

#[test]
fn test_missing_file_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.txt");
    let a = create_file("a\n");
    let c = create_file("c\n");
    let output = run_pipecat(&[path(&a), missing.to_str().unwrap(), path(&c)]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "a\n");
    assert!(stderr(&output).contains("gone.txt"));
}

#[test]
fn test_continue_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.txt");
    let a = create_file("a\n");
    let c = create_file("c\n");
    let output = run_pipecat(&[
        "--continue-on-error",
        "-n",
        path(&a),
        missing.to_str().unwrap(),
        path(&c),
    ]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "1: a\n2: c\n");
    assert!(stderr(&output).contains("gone.txt"));
}

#[test]
fn test_max_line_bytes() {
    let file = create_file("short\nthis line is long\nafter\n");
    let output = run_pipecat(&["--max-line-bytes", "8", path(&file)]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "short\n");
    assert!(stderr(&output).contains("line 2"));
}

#[test]
fn test_max_line_bytes_at_usize_max() {
    let file = create_file("abc\nde\n");
    let limit = usize::MAX.to_string();
    let output = run_pipecat(&["-n", "--max-line-bytes", &limit, path(&file)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1: abc\n2: de\n");
}

#[test]
fn test_requires_a_file() {
    let output = run_pipecat(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let file = create_file("a\n");
    let output = run_pipecat(&["-v", "-n", path(&file)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1: a\n");
    assert!(stderr(&output).contains("built pipeline"));
}
