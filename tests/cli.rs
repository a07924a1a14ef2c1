use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(logs_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("infra-health").expect("binary is built");
    cmd.env_remove("RUST_LOG").arg("--logs-dir").arg(logs_dir);
    cmd
}

#[test]
fn simulated_ok_exits_zero() {
    let dir = tempdir().expect("tempdir");
    cli(&dir.path().join("logs"))
        .args(["--simulate", "ok", "--no-save"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("CPU Usage: 10.0% [OK]"))
        .stdout(predicate::str::contains("No files saved (--no-save)."));
}

#[test]
fn simulated_warn_exits_one() {
    let dir = tempdir().expect("tempdir");
    cli(&dir.path().join("logs"))
        .args(["--simulate", "warn", "--no-save"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("CPU Usage: 75.0% [WARN]"));
}

#[test]
fn simulated_critical_exits_two() {
    let dir = tempdir().expect("tempdir");
    cli(&dir.path().join("logs"))
        .args(["--simulate", "critical", "--no-save"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("[CRITICAL]"));
}

#[test]
fn lowered_thresholds_turn_ok_into_warn() {
    let dir = tempdir().expect("tempdir");
    cli(&dir.path().join("logs"))
        .args(["--simulate", "ok", "--no-save", "--cpu-warn", "0", "--cpu-critical", "100"])
        .assert()
        .code(1);
}

#[test]
fn out_of_range_threshold_exits_two_without_saving() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("reports");
    cli(&dir.path().join("logs"))
        .args(["--simulate", "ok", "--disk-warn", "120"])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("0..100"));
    assert!(!out.exists());
}

#[test]
fn export_md_with_no_save_is_rejected() {
    let dir = tempdir().expect("tempdir");
    cli(&dir.path().join("logs"))
        .args(["--simulate", "ok", "--export-md", "--no-save"])
        .assert()
        .code(2);
}

#[test]
fn json_and_markdown_reports_are_written() {
    let dir = tempdir().expect("tempdir");
    let logs = dir.path().join("logs");
    fs::create_dir(&logs).expect("mkdir");
    fs::write(logs.join("app.log"), "ERROR boom\nTIMEOUT talking to db\n").expect("write");
    let out = dir.path().join("out").join("reports");

    cli(&logs)
        .args(["--simulate", "ok", "--export-md", "--json-only"])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Infrastructure Health Summary").not())
        .stdout(predicate::str::contains("JSON report saved to:"))
        .stdout(predicate::str::contains("Markdown report saved to:"));

    let mut json = None;
    let mut md = 0;
    for entry in fs::read_dir(&out).expect("list reports") {
        let path = entry.expect("entry").path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => json = Some(path),
            Some("md") => md += 1,
            _ => {}
        }
    }
    assert_eq!(md, 1);

    let text = fs::read_to_string(json.expect("json report written")).expect("read");
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
    assert_eq!(value["evaluations"]["cpu"], "OK");
    assert_eq!(value["log_analysis"]["files_scanned"], 1);
    assert_eq!(value["log_analysis"]["problem_counts"]["ERROR"], 1);
    assert_eq!(value["log_analysis"]["problem_counts"]["TIMEOUT"], 1);
    assert_eq!(value["thresholds"]["cpu"]["warn"], 70.0);
}

#[test]
fn quiet_suppresses_completion_banner() {
    let dir = tempdir().expect("tempdir");
    cli(&dir.path().join("logs"))
        .args(["--simulate", "ok", "--no-save", "--quiet", "--json-only"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn unwritable_output_dir_exits_two() {
    let dir = tempdir().expect("tempdir");
    let blocker = dir.path().join("reports");
    fs::write(&blocker, "not a directory").expect("write");

    cli(&dir.path().join("logs"))
        .args(["--simulate", "ok"])
        .arg("--output-dir")
        .arg(&blocker)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to write report"));
}

#[test]
fn config_file_thresholds_apply() {
    let dir = tempdir().expect("tempdir");
    let cfg = dir.path().join("health.yaml");
    fs::write(
        &cfg,
        "thresholds:\n  memory:\n    warn: 40\n    critical: null\n",
    )
    .expect("write");

    cli(&dir.path().join("logs"))
        .args(["--simulate", "ok", "--no-save", "--config"])
        .arg(&cfg)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Memory Usage: 45.0% [WARN]"));
}

#[test]
fn print_default_config_outputs_yaml() {
    let dir = tempdir().expect("tempdir");
    cli(&dir.path().join("logs"))
        .arg("--print-default-config")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("thresholds:"));
}
