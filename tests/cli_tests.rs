//! Integration tests for the CLI application
//!
//! These tests run the compiled `linsvm` binary on small synthetic problems.

use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the path to the compiled CLI binary
fn get_cli_binary_path() -> String {
    let debug_path = "target/debug/linsvm";
    let release_path = "target/release/linsvm";

    if std::path::Path::new(debug_path).exists() {
        debug_path.to_string()
    } else if std::path::Path::new(release_path).exists() {
        release_path.to_string()
    } else {
        // Build the binary if it doesn't exist
        let output = Command::new("cargo")
            .args(["build", "--bin", "linsvm"])
            .output()
            .expect("Failed to build CLI binary");

        if !output.status.success() {
            panic!(
                "Failed to build CLI binary: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        debug_path.to_string()
    }
}

fn run(args: &[&str]) -> Output {
    Command::new(get_cli_binary_path())
        .args(args)
        .output()
        .expect("Failed to run CLI command")
}

#[test]
fn test_cli_train_text_report() {
    let output = run(&["train", "-n", "100", "--seed", "1"]);

    assert!(
        output.status.success(),
        "Train command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Hyperplane:"));
    assert!(stdout.contains("Support vectors:"));
    assert!(stdout.contains("Training accuracy: 100.00%"));
}

#[test]
fn test_cli_train_json_report() {
    let output = run(&[
        "train", "-n", "80", "--huber", "0.5", "--lambda", "1", "--format", "json",
    ]);

    assert!(
        output.status.success(),
        "Train command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["solver"], "bfgs");
    assert_eq!(report["n_samples"], 160);
    assert_eq!(report["dim"], 2);
    assert_eq!(report["theta"].as_array().map(|t| t.len()), Some(2));
    assert!(report["bias"].is_number());
    assert!(report["generated_at"].is_string());
    assert_eq!(report["support_tolerance"], 1e-4);
}

#[test]
fn test_cli_train_writes_output_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let report_path = temp_dir.path().join("report.json");

    let output = run(&[
        "train",
        "-n",
        "50",
        "--no-bias",
        "--separation",
        "4,4",
        "--output",
        report_path.to_str().unwrap(),
    ]);

    assert!(
        output.status.success(),
        "Train command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(report_path.exists(), "Report file was not created");

    let content = std::fs::read_to_string(&report_path).unwrap();
    let report: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert!(report["bias"].is_null());
    assert_eq!(report["n_samples"], 100);
}

#[test]
fn test_cli_train_pegasos() {
    let output = run(&[
        "train",
        "--solver",
        "pegasos",
        "-n",
        "100",
        "--separation",
        "6,0",
        "--lambda",
        "0.1",
        "--max-iterations",
        "3000",
        "--batch-size",
        "20",
        "--format",
        "json",
    ]);

    assert!(
        output.status.success(),
        "Pegasos train failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["solver"], "pegasos");
    assert_eq!(report["iterations"], 3000);
}

#[test]
fn test_cli_check_command() {
    let output = run(&["check", "-n", "30", "--huber", "0.5", "--lambda", "0.3"]);

    assert!(
        output.status.success(),
        "Check command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Derivative Check"));
    assert!(stdout.contains("Gradient:"));
    assert!(stdout.contains("Hessian:"));
}

#[test]
fn test_cli_check_hinge_skips_hessian() {
    let output = run(&["check", "-n", "30"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Gradient:"));
    assert!(!stdout.contains("Hessian:"));
}

#[test]
fn test_cli_error_handling_negative_huber() {
    let output = run(&["train", "-n", "20", "--huber=-1"]);

    assert!(
        !output.status.success(),
        "Command should have failed with a negative huber width"
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_error_handling_empty_dataset() {
    let output = run(&["train", "-n", "0"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_error_handling_invalid_solver() {
    let output = run(&["train", "--solver", "smo"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_verbose_and_debug_flags() {
    let verbose_output = run(&["train", "-n", "20", "--verbose"]);
    assert!(verbose_output.status.success());

    let debug_output = run(&["--debug", "check", "-n", "20"]);
    assert!(debug_output.status.success());
}

#[test]
fn test_cli_help_output() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("train"));
    assert!(stdout.contains("check"));
}

#[test]
fn test_cli_version_output() {
    let output = run(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("linsvm"));
}
