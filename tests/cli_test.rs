/*!
Runs the `mcs-analyzer` binary against temporary files.
*/

use mcs_analyzer::DiagnosticsConfig;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn mcs_analyzer() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mcs-analyzer"))
}

#[test]
fn test_lint_json_and_exit_status() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("good.mcs"), "++PTF(UA00001) .\n").unwrap();
    fs::write(temp.path().join("bad.mcs"), "++USERMOD(LJS2012 .\n").unwrap();

    let output = mcs_analyzer()
        .args(["lint", "--format", "json"])
        .arg(temp.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files"].as_array().unwrap().len(), 2);
    assert_eq!(report["summary"]["errors"], 1);
    assert_eq!(report["summary"]["statements"], 2);
}

#[test]
fn test_lint_clean_file_succeeds() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("ptf.mcs");
    fs::write(&file, "++PTF(UA00001) .\n++VER(Z038) FMID(HBB7790) .\n").unwrap();

    let output = mcs_analyzer()
        .args(["lint", "--format", "lsp"])
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let line: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(line["diagnostics"].as_array().unwrap().len(), 0);
}

#[test]
fn test_lint_with_config_disabling_category() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("wide.mcs");
    fs::write(
        &file,
        format!("++PTF(UA00001)\n  DESC({}) .\n", "D".repeat(64)),
    )
    .unwrap();
    let config = temp.path().join("rules.yaml");
    fs::write(&config, "column_overflow: false\n").unwrap();

    let failing = mcs_analyzer().arg("lint").arg(&file).output().unwrap();
    assert_eq!(failing.status.code(), Some(1));

    let passing = mcs_analyzer()
        .arg("lint")
        .arg(&file)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(passing.status.success());
}

#[test]
fn test_rules_generate_config() {
    let temp = TempDir::new().unwrap();
    let output_path = temp.path().join("mcs-rules.toml");

    let output = mcs_analyzer()
        .args(["rules", "generate-config", "--output"])
        .arg(&output_path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let config = DiagnosticsConfig::from_file(&output_path).unwrap();
    assert_eq!(config, DiagnosticsConfig::default());
}

#[test]
fn test_schema_and_rules_listing() {
    let schema = mcs_analyzer().args(["schema", "list"]).output().unwrap();
    assert!(schema.status.success());
    let stdout = String::from_utf8_lossy(&schema.stdout);
    assert!(stdout.contains("++PTF"));
    assert!(stdout.contains("++MSG"));

    let rules = mcs_analyzer().args(["rules", "list"]).output().unwrap();
    assert!(rules.status.success());
    let stdout = String::from_utf8_lossy(&rules.stdout);
    assert!(stdout.contains("MCS001"));
    assert!(stdout.contains("standalone_comment"));
}
