// End-to-end smoke tests for the exovet binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn exovet() -> Command {
    Command::cargo_bin("exovet").unwrap()
}

#[test]
fn triage_demo_set_renders_a_terminal_report() {
    exovet()
        .args(["triage", "--samples", "200", "--seed", "42", "--threshold", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exovet Triage Report"))
        .stdout(predicate::str::contains(
            "synthetic demo set (200 samples, seed 42)",
        ))
        .stdout(predicate::str::contains("Most uncertain targets"));
}

#[test]
fn triage_demo_set_emits_valid_json() {
    let output = exovet()
        .args([
            "triage",
            "--format",
            "json",
            "--samples",
            "100",
            "--seed",
            "42",
            "--threshold",
            "0.5",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["source"]["kind"], "synthetic");
    assert_eq!(report["metrics"]["threshold"], 0.5);
    // The demo set separates cleanly at 0.5.
    assert_eq!(report["metrics"]["fp"], 0);
    assert_eq!(report["metrics"]["f1"], 1.0);
    assert_eq!(report["advice"]["f1_grade"], "Excellent");
    assert_eq!(
        report["dispositions"]["confirmed"],
        report["metrics"]["tp"]
    );
    assert_eq!(report["uncertain"].as_array().unwrap().len(), 10);
}

#[test]
fn triage_reads_a_prediction_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("predictions.json");
    fs::write(
        &path,
        r#"{
            "predictions": [
                {
                    "object_id": "KOI-1.01",
                    "probs": {"POSITIVE": 0.9, "NEGATIVE": 0.1},
                    "conf": 0.9,
                    "version": "v1.2.0",
                    "explain": {"tabular": {"shap": [["koi_period", 0.31], ["koi_depth", -0.12]]}}
                },
                {
                    "object_id": "KOI-2.01",
                    "probs": {"POSITIVE": 0.2, "NEGATIVE": 0.8},
                    "conf": 0.8,
                    "version": "v1.2.0"
                }
            ]
        }"#,
    )
    .unwrap();

    let output = exovet()
        .args([
            "triage",
            path.to_str().unwrap(),
            "--format",
            "json",
            "--threshold",
            "0.5",
            "--explain",
            "0",
            "--top-k",
            "2",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["source"]["kind"], "file");
    assert_eq!(report["source"]["targets"], 2);
    // Unlabeled input: confirmed/rest split with MCC pinned at 0.
    assert_eq!(report["metrics"]["tp"], 1);
    assert_eq!(report["metrics"]["fp"], 1);
    assert_eq!(report["metrics"]["mcc"], 0.0);
    assert_eq!(report["explain"]["object_id"], "KOI-1.01");
    assert_eq!(report["explain"]["top_attributions"][1][0], "koi_period");
}

#[test]
fn triage_writes_the_report_to_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.json");

    exovet()
        .args([
            "triage",
            "--format",
            "json",
            "--samples",
            "50",
            "--threshold",
            "0.5",
            "--output",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["source"]["samples"], 50);
}

#[test]
fn missing_input_file_fails_with_context() {
    exovet()
        .args(["triage", "/nonexistent/predictions.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read predictions file"));
}

#[test]
fn out_of_range_threshold_is_rejected_at_parse_time() {
    exovet()
        .args(["triage", "--threshold", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the range"));
}

#[test]
fn init_creates_the_config_once() {
    let dir = tempfile::tempdir().unwrap();

    exovet()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created exovet.toml"));
    assert!(dir.path().join("exovet.toml").exists());

    exovet()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    exovet()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn init_does_not_mistake_a_directory_for_an_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("exovet.toml")).unwrap();

    // The overwrite guard only fires for regular files; a directory in the
    // way surfaces as the write error instead.
    exovet()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists").not());
}

#[test]
fn config_file_supplies_the_default_threshold() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("exovet.toml"),
        "[threshold]\ndefault = 0.8\n",
    )
    .unwrap();

    let output = exovet()
        .current_dir(dir.path())
        .args(["triage", "--format", "json", "--samples", "100"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["metrics"]["threshold"], 0.8);
}
