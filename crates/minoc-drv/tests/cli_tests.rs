//! End-to-end CLI tests.
//!
//! Each test writes a source file into a temp directory, runs the `minoc`
//! binary on it, and checks the printed result or the reported error.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn minoc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_minoc"))
}

fn write_source(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).expect("failed to write test source");
    path
}

fn minoc(file: &Path, input: &str) -> Command {
    let mut cmd = Command::new(minoc_bin());
    cmd.arg(file).arg(input);
    cmd
}

#[test]
fn squares_its_input() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "square.mino", "int main(int x) { return x * x; }");
    minoc(&file, "7").assert().success().stdout("49\n");
}

#[test]
fn computes_factorial_recursively() {
    let dir = TempDir::new().unwrap();
    let file = write_source(
        &dir,
        "fact.mino",
        "int fact(int n) { if (n <= 1) return 1; return n * fact(n - 1); }
         int main(int x) { return fact(x); }",
    );
    minoc(&file, "6").assert().success().stdout("720\n");
}

#[test]
fn sums_with_a_while_loop() {
    let dir = TempDir::new().unwrap();
    let file = write_source(
        &dir,
        "sum.mino",
        "int main(int x) {
             int s = 0; int i = 1;
             while (i <= x) { s = s + i; i = i + 1; }
             return s;
         }",
    );
    minoc(&file, "10").assert().success().stdout("55\n");
}

#[test]
fn branches_on_a_bool_helper() {
    let dir = TempDir::new().unwrap();
    let file = write_source(
        &dir,
        "even.mino",
        "bool even(int n) { return n % 2 == 0; }
         int main(int x) { if (even(x)) return 1; else return 0; }",
    );
    minoc(&file, "4").assert().success().stdout("1\n");
    minoc(&file, "5").assert().success().stdout("0\n");
}

#[test]
fn ternary_with_range_check() {
    let dir = TempDir::new().unwrap();
    let file = write_source(
        &dir,
        "range.mino",
        "int main(int x) { return (x > 0 && x < 10) ? x : -1; }",
    );
    minoc(&file, "3").assert().success().stdout("3\n");
    minoc(&file, "42").assert().success().stdout("-1\n");
}

#[test]
fn negative_inputs_are_accepted() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "neg.mino", "int main(int x) { return -x; }");
    minoc(&file, "-8").assert().success().stdout("8\n");
}

#[test]
fn undefined_variable_fails_with_its_name() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "bad.mino", "int f(int x) { return y; }");
    minoc(&file, "1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Undefined variable: y"));
}

#[test]
fn parse_error_fails_before_execution() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "syntax.mino", "int main(int x) { return x }");
    minoc(&file, "1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected ';'"));
}

#[test]
fn missing_source_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nothing.mino");
    minoc(&path, "1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to open input file"));
}

#[test]
fn program_without_main_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "nomain.mino", "int f(int x) { return x; }");
    minoc(&file, "1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("main"));
}

#[test]
fn invalid_characters_warn_but_do_not_abort() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "noisy.mino", "int main(int x) { return x; } @");
    minoc(&file, "9")
        .assert()
        .success()
        .stdout("9\n")
        .stderr(predicate::str::contains("warning"));
}

#[test]
fn enable_dump_writes_artifacts() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "dump.mino", "int main(int x) { return x + 1; }");
    let mut cmd = minoc(&file, "1");
    cmd.env("ENABLE_DUMP", "1");
    cmd.assert().success().stdout("2\n");

    let syn = PathBuf::from(format!("{}.syn", file.display()));
    let initial = PathBuf::from(format!("{}.initial.ll", file.display()));
    let optimized = PathBuf::from(format!("{}.optimized.ll", file.display()));
    assert!(syn.exists(), "missing {}", syn.display());
    assert!(initial.exists(), "missing {}", initial.display());
    assert!(optimized.exists(), "missing {}", optimized.display());

    let printed = std::fs::read_to_string(&syn).unwrap();
    assert!(printed.contains("int main(int x)"));
    let ir = std::fs::read_to_string(&initial).unwrap();
    assert!(ir.contains("define i32 @main"));
}

#[test]
fn dump_is_off_by_default() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "quiet.mino", "int main(int x) { return x; }");
    let mut cmd = minoc(&file, "1");
    cmd.env_remove("ENABLE_DUMP");
    cmd.assert().success();
    assert!(!PathBuf::from(format!("{}.syn", file.display())).exists());
}

#[test]
fn help_shows_usage() {
    let mut cmd = Command::new(minoc_bin());
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_is_reported() {
    let mut cmd = Command::new(minoc_bin());
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("minoc"));
}
