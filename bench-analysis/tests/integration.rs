//! Integration tests for bench-analysis.
//!
//! These tests drive the compiled binary against temporary result directories.

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const REFERENCE_RUN_1: &str =
    r#"{"p50_ms":5,"p95_ms":9,"p99_ms":12,"rps":100,"errors":0,"count":1000}"#;
const REFERENCE_RUN_2: &str =
    r#"{"p50_ms":7,"p95_ms":11,"p99_ms":14,"rps":90,"errors":1,"count":900}"#;

fn bench_analysis(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bench-analysis"));
    cmd.current_dir(cwd).env_remove("RUST_LOG");
    cmd
}

fn write_run(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

/// Run the binary and return stdout, asserting success.
fn analyze(cwd: &Path, args: &[&str]) -> String {
    let assert = bench_analysis(cwd).args(args).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

/// Test that a missing results directory argument is a usage error.
#[test]
fn test_missing_argument_exits_with_usage_error() {
    let cwd = tempdir().unwrap();

    let assert = bench_analysis(cwd.path()).assert().code(2);
    let output = assert.get_output();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"));
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_dir(cwd.path()).unwrap().count(), 0);
}

/// Test the reference example end to end.
#[test]
fn test_reference_example() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "a-10-1.json", REFERENCE_RUN_1);
    write_run(dir.path(), "a-10-2.json", REFERENCE_RUN_2);

    let stdout = analyze(dir.path(), &[dir.path().to_str().unwrap(), "--no-chart"]);

    assert_eq!(
        stdout,
        "mode,concurrency,repeat,p50_ms,p95_ms,p99_ms,rps,errors,count\n\
         a,10,1,5,9,12,100,0,1000\n\
         a,10,2,7,11,14,90,1,900\n"
    );

    let agg = fs::read_to_string(dir.path().join("summary-agg.csv")).unwrap();
    assert_eq!(
        agg,
        "mode,concurrency,p50_ms,p95_ms,p99_ms,rps,errors\na,10,6.0,10.0,13.0,95.0,1\n"
    );
    assert!(!dir.path().join("p95_vs_concurrency.png").exists());
}

/// Test that non-run files are excluded from both tables.
#[test]
fn test_non_run_files_are_excluded() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "a-10-1.json", REFERENCE_RUN_1);
    write_run(dir.path(), "bh2-agg-0001.json", r#"{"agg": {"a": 4}, "count": 4}"#);
    write_run(dir.path(), "steady.json", REFERENCE_RUN_2);
    write_run(dir.path(), "notes.txt", "not a result");

    let stdout = analyze(dir.path(), &[dir.path().to_str().unwrap(), "--no-chart"]);

    assert_eq!(stdout.lines().count(), 2);
    assert!(!stdout.contains("bh2"));
    assert!(!stdout.contains("steady"));

    let agg = fs::read_to_string(dir.path().join("summary-agg.csv")).unwrap();
    assert_eq!(agg.lines().count(), 2);
}

/// Test that rows are sorted by mode, then numeric concurrency, then repeat.
#[test]
fn test_rows_sorted_and_groups_counted() {
    let dir = tempdir().unwrap();
    for name in [
        "b-1-1.json",
        "a-10-2.json",
        "a-2-2.json",
        "a-10-1.json",
        "a-2-1.json",
        "a-2-3.json",
    ] {
        write_run(dir.path(), name, REFERENCE_RUN_1);
    }

    let stdout = analyze(dir.path(), &[dir.path().to_str().unwrap(), "--no-chart"]);
    let keys: Vec<String> = stdout
        .lines()
        .skip(1)
        .map(|line| line.splitn(4, ',').take(3).collect::<Vec<_>>().join(","))
        .collect();

    assert_eq!(
        keys,
        vec!["a,2,1", "a,2,2", "a,2,3", "a,10,1", "a,10,2", "b,1,1"]
    );

    let agg = fs::read_to_string(dir.path().join("summary-agg.csv")).unwrap();
    let groups: Vec<&str> = agg
        .lines()
        .skip(1)
        .map(|line| line.rsplitn(6, ',').last().unwrap())
        .collect();
    assert_eq!(groups, vec!["a,2", "a,10", "b,1"]);
}

/// Test that an empty directory produces header-only tables.
#[test]
fn test_empty_directory() {
    let dir = tempdir().unwrap();

    let stdout = analyze(dir.path(), &[dir.path().to_str().unwrap()]);

    assert_eq!(
        stdout,
        "mode,concurrency,repeat,p50_ms,p95_ms,p99_ms,rps,errors,count\n"
    );
    let agg = fs::read_to_string(dir.path().join("summary-agg.csv")).unwrap();
    assert_eq!(agg, "mode,concurrency,p50_ms,p95_ms,p99_ms,rps,errors\n");
}

/// Test that the chart step never aborts the run, whether or not it can draw.
#[test]
fn test_chart_is_best_effort() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "a-10-1.json", REFERENCE_RUN_1);
    write_run(dir.path(), "a-100-1.json", REFERENCE_RUN_2);
    write_run(dir.path(), "b-10-1.json", REFERENCE_RUN_2);

    analyze(dir.path(), &[dir.path().to_str().unwrap()]);

    assert!(dir.path().join("summary-agg.csv").exists());
}

/// Test that invalid JSON in a run file fails the whole run.
#[test]
fn test_invalid_json_fails() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "a-10-1.json", "{\"p50_ms\": 5,");

    let assert = bench_analysis(dir.path())
        .args([dir.path().to_str().unwrap(), "--no-chart"])
        .assert()
        .failure();
    let output = assert.get_output();

    assert_ne!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("a-10-1.json"));
    assert!(!dir.path().join("summary-agg.csv").exists());
}

/// Test that a run body that is not a JSON object fails before any output.
#[test]
fn test_non_object_body_fails_before_output() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "a-1-1.json", REFERENCE_RUN_1);
    write_run(dir.path(), "a-2-1.json", "[1, 2, 3]");

    let assert = bench_analysis(dir.path())
        .args([dir.path().to_str().unwrap(), "--no-chart", "--missing", "skip"])
        .assert()
        .code(1);
    let output = assert.get_output();

    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("a-2-1.json"));
    assert!(!dir.path().join("summary-agg.csv").exists());
}

/// Test that a missing metric is fatal by default and skippable on request.
#[test]
fn test_missing_metric_policy() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "a-1-1.json", r#"{"p50_ms":1,"p95_ms":2,"p99_ms":3,"errors":0}"#);
    write_run(
        dir.path(),
        "a-1-2.json",
        r#"{"p50_ms":3,"p95_ms":4,"p99_ms":5,"rps":10,"errors":2}"#,
    );

    let assert = bench_analysis(dir.path())
        .args([dir.path().to_str().unwrap(), "--no-chart"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("rps"));

    analyze(
        dir.path(),
        &[dir.path().to_str().unwrap(), "--no-chart", "--missing", "skip"],
    );
    let agg = fs::read_to_string(dir.path().join("summary-agg.csv")).unwrap();
    assert!(agg.contains("a,1,2.0,3.0,4.0,10.0,2"));
}

/// Test that the config file in the working directory is honoured.
#[test]
fn test_config_file_in_working_directory() {
    let cwd = tempdir().unwrap();
    let results = tempdir().unwrap();
    fs::write(
        cwd.path().join(".bench-analysis.toml"),
        "[input]\nextension = \"out\"\n\n[chart]\nenabled = false\n",
    )
    .unwrap();
    write_run(results.path(), "a-10-1.out", REFERENCE_RUN_1);
    write_run(results.path(), "a-10-2.json", REFERENCE_RUN_2);

    let stdout = analyze(cwd.path(), &[results.path().to_str().unwrap()]);

    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("a,10,1,5,9,12,100,0,1000"));
    assert!(!results.path().join("p95_vs_concurrency.png").exists());
}

/// Test that the summary table goes to stderr and leaves stdout as pure CSV.
#[test]
fn test_summary_goes_to_stderr() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "a-10-1.json", REFERENCE_RUN_1);
    write_run(dir.path(), "a-10-2.json", REFERENCE_RUN_2);

    let assert = bench_analysis(dir.path())
        .args([
            dir.path().to_str().unwrap(),
            "--no-chart",
            "--summary",
            "--no-color",
        ])
        .assert()
        .success();
    let output = assert.get_output();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stdout.lines().count(), 3);
    assert!(!stdout.contains("Summary:"));
    assert!(stderr.contains("Summary:"));
    assert!(stderr.contains("1 groups"));
}
