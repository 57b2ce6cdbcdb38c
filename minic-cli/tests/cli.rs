use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn minic() -> Command {
    Command::cargo_bin("minic-cli").expect("binary exists")
}

#[test]
fn compiles_file_to_three_address_code() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("input.mc");
    fs::write(&input_path, "int x = 1;\nint y = x + 2;\nreturn y;").expect("write input");
    let output_path = dir.path().join("out.ir");

    minic()
        .arg("--input")
        .arg(&input_path)
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let ir = fs::read_to_string(&output_path).expect("read ir");
    assert_eq!(ir, "DECLARE int x\nx = 1\nDECLARE int y\nt0 = x + 2\ny = t0\n");
}

#[test]
fn reads_stdin_and_writes_stdout() {
    minic()
        .write_stdin("int a = 2 * 3;\nreturn a;")
        .assert()
        .success()
        .stdout(predicate::str::contains("t0 = 2 * 3"))
        .stdout(predicate::str::contains("a = t0"));
}

#[test]
fn prints_diagnostics_to_stderr_without_failing() {
    minic()
        .write_stdin("if (1) { int y = 2; }\ny = 3;")
        .assert()
        .success()
        .stderr(predicate::str::contains("Line 2: Variable 'y' used before declaration"));
}

#[test]
fn check_flag_fails_on_errors() {
    minic()
        .arg("--check")
        .write_stdin("int x = 1; int x = 2;")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already declared"));
}

#[test]
fn check_flag_ignores_warnings() {
    minic()
        .arg("--check")
        .write_stdin("int z = 5;")
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning: Variable 'z'"));
}

#[test]
fn deny_warnings_fails_on_unused_variables() {
    minic()
        .arg("--deny-warnings")
        .write_stdin("int z = 5;")
        .assert()
        .failure()
        .stderr(predicate::str::contains("warnings are denied"));
}

#[test]
fn emits_json_document() {
    let output = minic()
        .arg("--emit")
        .arg("json")
        .write_stdin("int sum = x + y;")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(value["ast"]["type"], "Program");
    assert_eq!(value["instructions"][1]["operation"], "+");
    assert_eq!(value["instructions"][1]["result"], "t0");
    assert!(value["diagnostics"][0].as_str().is_some());
}

#[test]
fn emits_tokens_listing() {
    minic()
        .arg("--emit")
        .arg("tokens")
        .write_stdin("x = 1;")
        .assert()
        .success()
        .stdout(predicate::str::contains("1:1\tIdentifier\tx"));
}

#[test]
fn compiles_every_file_in_a_directory() {
    let dir = tempdir().expect("tempdir");
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("nested")).expect("create dirs");
    fs::write(src.join("a.mc"), "int a = 1;").expect("write a");
    fs::write(src.join("nested").join("b.mc"), "int b = 2 + 3;").expect("write b");
    fs::write(src.join("skip.txt"), "int c;").expect("write skip");
    let out = dir.path().join("out");

    minic()
        .arg("--input")
        .arg(&src)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let a = fs::read_to_string(out.join("a.ir")).expect("a.ir");
    assert_eq!(a, "DECLARE int a\na = 1\n");
    let b = fs::read_to_string(out.join("nested").join("b.ir")).expect("b.ir");
    assert!(b.contains("t0 = 2 + 3"));
    assert!(!out.join("skip.ir").exists());
}

#[test]
fn rejects_unknown_emit_format() {
    minic()
        .arg("--emit")
        .arg("wasm")
        .write_stdin("int x;")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported emit format: wasm"));
}

#[test]
fn reports_missing_input_file() {
    let dir = tempdir().expect("tempdir");
    minic()
        .arg("--input")
        .arg(dir.path().join("missing.mc"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input file"));
}
