use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

#[allow(deprecated)]
fn cellcheck() -> Command {
    Command::cargo_bin("cellcheck").expect("Failed to find cellcheck binary")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn field_names(descriptor: &Value) -> Vec<String> {
    descriptor["resources"][0]["schema"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect()
}

/// Copies a fixture into a fresh temp directory.
fn temp_copy(name: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::copy(fixture_path(name), &path).unwrap();
    (dir, path)
}

// ============================================================================
// check command tests
// ============================================================================

#[test]
fn test_check_valid_descriptor() {
    cellcheck()
        .arg("check")
        .arg(fixture_path("datapackage.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Descriptor schema is valid"))
        .stdout(predicate::str::contains("gdp"))
        .stdout(predicate::str::contains("Country Code"))
        .stdout(predicate::str::contains("minimum = 1962"))
        .stdout(predicate::str::contains("Unknown constraint").not());
}

#[test]
fn test_check_yaml_descriptor() {
    cellcheck()
        .arg("check")
        .arg(fixture_path("datapackage.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Fields:     4"));
}

#[test]
fn test_check_warns_about_unknown_constraints() {
    cellcheck()
        .arg("check")
        .arg(fixture_path("unknown_constraint.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Unknown constraint 'Year.foobar' will be skipped",
        ));
}

#[test]
fn test_check_json_output() {
    let output = cellcheck()
        .arg("check")
        .arg("--format")
        .arg("json")
        .arg(fixture_path("unknown_constraint.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["name"], "years");
    assert_eq!(json["fields"].as_array().unwrap().len(), 1);
    assert_eq!(json["unknown_constraints"], serde_json::json!(["Year.foobar"]));
}

#[test]
fn test_check_invalid_descriptor() {
    cellcheck()
        .arg("check")
        .arg(fixture_path("invalid.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_check_descriptor_without_schema() {
    cellcheck()
        .arg("check")
        .arg(fixture_path("no_schema.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Descriptor has no schema"));
}

#[test]
fn test_check_missing_file() {
    cellcheck()
        .arg("check")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

// ============================================================================
// validate command tests
// ============================================================================

#[test]
fn test_validate_passing_data() {
    cellcheck()
        .arg("validate")
        .arg(fixture_path("datapackage.json"))
        .arg("--data")
        .arg(fixture_path("gdp_valid.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation PASSED"))
        .stdout(predicate::str::contains("Total findings: 0"));
}

#[test]
fn test_validate_failing_data() {
    cellcheck()
        .arg("validate")
        .arg(fixture_path("datapackage.json"))
        .arg("--data")
        .arg(fixture_path("gdp.csv"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Validation FAILED"))
        .stdout(predicate::str::contains(
            "The value AR in row 3 and column 2 does not conform to the pattern constraint of [A-Z]{3}",
        ))
        .stdout(predicate::str::contains(
            "The value 1960 in row 2 and column 3 does not conform to the minimum constraint of 1962",
        ))
        .stdout(predicate::str::contains("is not type integer"))
        .stdout(predicate::str::contains("Total findings: 3"));
}

#[test]
fn test_validate_json_report() {
    let output = cellcheck()
        .arg("validate")
        .arg(fixture_path("datapackage.yml"))
        .arg("--data")
        .arg(fixture_path("gdp.csv"))
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json = stdout_json(&output);
    assert_eq!(json["passed"], false);
    let findings: Vec<(String, String, u64)> = json["validation-reports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            (
                f["column"].as_str().unwrap().to_string(),
                f["code"].as_str().unwrap().to_string(),
                f["row"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        findings,
        vec![
            ("Country Code".to_string(), "pattern-constraint".to_string(), 2),
            ("Year".to_string(), "type-or-format-error".to_string(), 2),
            ("Year".to_string(), "minimum-constraint".to_string(), 1),
        ]
    );
}

#[test]
fn test_validate_selected_columns() {
    let output = cellcheck()
        .arg("validate")
        .arg(fixture_path("datapackage.json"))
        .arg("--data")
        .arg(fixture_path("gdp.csv"))
        .arg("--columns")
        .arg("Value,Country Code")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    let json = stdout_json(&output);
    let reports = json["validation-reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["column"], "Country Code");
}

#[test]
fn test_validate_skips_unknown_constraint() {
    let output = cellcheck()
        .arg("validate")
        .arg(fixture_path("unknown_constraint.json"))
        .arg("--data")
        .arg(fixture_path("years.csv"))
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json = stdout_json(&output);
    assert_eq!(json["validation-reports"].as_array().unwrap().len(), 2);
    let warnings = json["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("foobar"));
}

#[test]
fn test_validate_with_config_messages() {
    cellcheck()
        .arg("validate")
        .arg(fixture_path("unknown_constraint.json"))
        .arg("--data")
        .arg(fixture_path("years.csv"))
        .arg("--config")
        .arg(fixture_path("messages.toml"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Year too early: 1960 (row 1)"));
}

#[test]
fn test_validate_rejects_bad_config() {
    cellcheck()
        .arg("validate")
        .arg(fixture_path("datapackage.json"))
        .arg("--data")
        .arg(fixture_path("gdp.csv"))
        .arg("--config")
        .arg(fixture_path("bad_config.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log_level"));
}

#[test]
fn test_validate_without_schema_warns() {
    cellcheck()
        .arg("validate")
        .arg(fixture_path("no_schema.json"))
        .arg("--data")
        .arg(fixture_path("years.csv"))
        .arg("--columns")
        .arg("Year")
        .assert()
        .success()
        .stdout(predicate::str::contains("No schema attached to dataset 'bare'"));
}

#[test]
fn test_validate_missing_data_file() {
    cellcheck()
        .arg("validate")
        .arg(fixture_path("datapackage.json"))
        .arg("--data")
        .arg("nonexistent.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open data file"));
}

// ============================================================================
// init command tests
// ============================================================================

#[test]
fn test_init_to_stdout() {
    let output = cellcheck()
        .arg("init")
        .arg("--data")
        .arg(fixture_path("gdp.csv"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["name"], "gdp");
    assert_eq!(
        field_names(&json),
        vec!["Country Name", "Country Code", "Year", "Value"]
    );
    assert_eq!(json["resources"][0]["schema"]["fields"][2]["type"], "string");
}

#[test]
fn test_init_to_file_then_check() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("datapackage.yml");

    cellcheck()
        .arg("init")
        .arg("--data")
        .arg(fixture_path("years.csv"))
        .arg("--name")
        .arg("years")
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 fields"));

    let content = fs::read_to_string(&output_path).unwrap();
    assert!(content.contains("name: years"));

    cellcheck()
        .arg("check")
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(": string"));
}

// ============================================================================
// sync command tests
// ============================================================================

#[test]
fn test_sync_add_column_in_place() {
    let (_dir, path) = temp_copy("datapackage.json");

    cellcheck()
        .arg("sync")
        .arg(&path)
        .arg("--change")
        .arg(r#"{"kind": "add", "columnIndex": 1, "columnName": "Region"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("schema now has 5 fields"));

    let descriptor: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        field_names(&descriptor),
        vec!["Country Name", "Region", "Country Code", "Year", "Value"]
    );
    // Keys outside the field list are untouched.
    assert_eq!(descriptor["licenses"][0]["name"], "ODC-PDDL-1.0");
    assert_eq!(
        descriptor["resources"][0]["schema"]["primaryKey"],
        serde_json::json!(["Country Code", "Year"])
    );
    assert_eq!(
        descriptor["resources"][0]["schema"]["fields"][3]["constraints"]["minimum"],
        1962
    );
}

#[test]
fn test_sync_split_from_file_to_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("synced.json");

    cellcheck()
        .arg("sync")
        .arg(fixture_path("datapackage.json"))
        .arg("--change")
        .arg(fixture_path("split.json"))
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let descriptor: Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(
        field_names(&descriptor),
        vec!["Country", "Region", "Country Code", "Year", "Value"]
    );
}

#[test]
fn test_sync_out_of_range_change_is_rejected() {
    let (_dir, path) = temp_copy("datapackage.json");
    let before = fs::read_to_string(&path).unwrap();

    cellcheck()
        .arg("sync")
        .arg(&path)
        .arg("--change")
        .arg(r#"{"kind": "remove", "columnIndex": 9}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Change 'remove' was not applied"));

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_sync_unknown_change_kind() {
    let (_dir, path) = temp_copy("datapackage.json");

    cellcheck()
        .arg("sync")
        .arg(&path)
        .arg("--change")
        .arg(r#"{"kind": "rename"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Change 'unknown' was not applied"));
}

// ============================================================================
// general CLI tests
// ============================================================================

#[test]
fn test_help() {
    cellcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn test_version() {
    cellcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cellcheck"));
}
