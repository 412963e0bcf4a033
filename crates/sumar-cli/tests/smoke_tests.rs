//! End-to-end smoke tests for the sumador binary

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn sumador() -> Command {
    Command::cargo_bin("sumador").expect("binary builds")
}

fn write_snapshot(dir: &Path, name: &str, covered_line_2: u64) {
    let content = format!(
        "        -:    0:Source:src/cat.c\n\
                 -:    1:#include <stdio.h>\n\
         {:9}:    2:int main(void) {{\n\
             #####:    3:  return fail();\n\
                 -:    4:}}\n",
        covered_line_2
    );
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_version() {
    sumador()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_lists_subcommands() {
    sumador()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("aggregate"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_no_args_fails() {
    sumador().assert().failure();
}

#[test]
fn test_aggregate_no_snapshots_fails() {
    let temp = tempfile::tempdir().unwrap();
    let run_dir = temp.path().join("run_coverage");
    fs::create_dir(&run_dir).unwrap();

    sumador()
        .arg("aggregate")
        .arg(&run_dir)
        .arg("-o")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no coverage snapshots"));
}

#[test]
fn test_aggregate_no_discovered_dirs_fails() {
    let temp = tempfile::tempdir().unwrap();

    sumador()
        .arg("aggregate")
        .arg("--result-dir")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("_coverage"));
}

#[test]
fn test_aggregate_produces_cumulative_output() {
    let temp = tempfile::tempdir().unwrap();
    let run_a = temp.path().join("a_coverage");
    let run_b = temp.path().join("b_coverage");
    fs::create_dir(&run_a).unwrap();
    fs::create_dir(&run_b).unwrap();
    write_snapshot(&run_a, "t00000.gcov.txt", 3);
    write_snapshot(&run_b, "t00000.gcov.txt", 0);
    let out = temp.path().join("out");

    sumador()
        .arg("aggregate")
        .arg(&run_a)
        .arg(&run_b)
        .arg("-o")
        .arg(&out)
        .arg("--no-lcov")
        .arg("--no-gcovr")
        .assert()
        .success()
        .stdout(predicate::str::contains("sources: 1"));

    let cumulative = out.join("src_cat.c").join("cumulative.gcov.txt");
    let text = fs::read_to_string(cumulative).unwrap();
    assert!(text.contains("        +:    2:"));
    assert!(text.contains("    #####:    3:"));
    assert!(out.join("merged_summary.txt").is_file());
}

#[test]
fn test_aggregate_discovers_suffix_dirs() {
    let temp = tempfile::tempdir().unwrap();
    let run = temp.path().join("fuzz_coverage");
    fs::create_dir(&run).unwrap();
    write_snapshot(&run, "t00001.gcov.txt", 5);

    sumador()
        .arg("aggregate")
        .arg("--result-dir")
        .arg(temp.path())
        .arg("-o")
        .arg(temp.path().join("out"))
        .arg("--no-lcov")
        .arg("--no-gcovr")
        .assert()
        .success();
}

#[test]
fn test_export_writes_tracefiles() {
    let temp = tempfile::tempdir().unwrap();
    write_snapshot(temp.path(), "t00007.gcov.txt", 12);
    let out = temp.path().join("traces");

    sumador()
        .arg("export")
        .arg(temp.path().join("t00007.gcov.txt"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let info = fs::read_to_string(out.join("t00007.info")).unwrap();
    assert!(info.contains("SF:src/cat.c"));
    assert!(info.contains("DA:2,12"));
    assert!(info.contains("DA:3,0"));
    let json = fs::read_to_string(out.join("t00007.json")).unwrap();
    assert!(json.contains("gcovr/format_version"));
}
