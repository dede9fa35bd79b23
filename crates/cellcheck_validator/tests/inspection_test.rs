//! End-to-end inspection of datasets with a table schema.

use cellcheck_core::{
    CancellationFlag, Dataset, DatasetBuilder, FieldBuilder, FieldType, InspectOptions,
};
use cellcheck_package::{ColumnChange, SchemaSynchronizer};
use cellcheck_validator::{ValidationInspector, ValidationService};
use pretty_assertions::assert_eq;

fn gdp() -> Dataset {
    DatasetBuilder::new("gdp", "gdp")
        .columns(["Country Name", "Country Code", "Year", "Value"])
        .row(["Arab World", "ARB", "1960", "25760683041.0857"])
        .row(["Arab World", "ARB", "1965", "28434203615"])
        .row(["Arab World", "AR", "abc", "-5"])
        .field(
            FieldBuilder::new("Country Code", FieldType::String)
                .constraint("pattern", "[A-Z]{3}")
                .constraint("required", true)
                .build(),
        )
        .field(
            FieldBuilder::new("Year", FieldType::Integer)
                .constraint("minimum", 1962)
                .build(),
        )
        .field(
            FieldBuilder::new("Value", FieldType::Number)
                .constraint("minimum", 0)
                .constraint("maximum", 30000000000.0_f64)
                .build(),
        )
        .build()
        .expect("valid dataset")
}

fn codes_and_rows(report: &cellcheck_core::InspectionReport) -> Vec<(String, String, usize)> {
    report
        .findings
        .iter()
        .map(|f| (f.column.clone(), f.code.clone(), f.row))
        .collect()
}

#[test]
fn test_year_scenario() {
    let dataset = DatasetBuilder::new("1", "years")
        .columns(["Year"])
        .row(["1960"])
        .row(["1965"])
        .row(["abc"])
        .field(
            FieldBuilder::new("Year", "integer")
                .constraint("minimum", 1962)
                .build(),
        )
        .build()
        .unwrap();

    let options = InspectOptions::new().with_columns(["Year"]);
    let report = ValidationInspector::new().inspect(&dataset, &options);

    assert_eq!(report.findings.len(), 2);
    let by_row = |row: usize| report.findings.iter().find(|f| f.row == row).unwrap();
    assert_eq!(by_row(0).code, "minimum-constraint");
    assert_eq!(by_row(2).code, "type-or-format-error");
    assert!(report.findings.iter().all(|f| f.row != 1));
}

#[test]
fn test_unknown_constraint_is_skipped() {
    let dataset = DatasetBuilder::new("1", "years")
        .columns(["Year"])
        .row(["1960"])
        .row(["1970"])
        .field(
            FieldBuilder::new("Year", "integer")
                .constraint("foobar", "anything")
                .constraint("minimum", 1962)
                .build(),
        )
        .build()
        .unwrap();

    let options = InspectOptions::new().with_columns(["Year"]);
    let report = ValidationInspector::new().inspect(&dataset, &options);

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].code, "minimum-constraint");
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("foobar"));
}

#[test]
fn test_findings_follow_column_then_validator_then_row_order() {
    let options = InspectOptions::new().with_columns(["Value", "Country Code", "Year"]);
    let report = ValidationInspector::new().inspect(&gdp(), &options);

    assert_eq!(
        codes_and_rows(&report),
        vec![
            ("Value".to_string(), "minimum-constraint".to_string(), 2),
            ("Country Code".to_string(), "pattern-constraint".to_string(), 2),
            ("Year".to_string(), "type-or-format-error".to_string(), 2),
            ("Year".to_string(), "minimum-constraint".to_string(), 0),
        ]
    );
    assert_eq!(report.stats.columns_checked, 3);
    assert_eq!(report.stats.rows_scanned, 3);
}

#[test]
fn test_bounds_are_inclusive() {
    let dataset = DatasetBuilder::new("1", "bounds")
        .columns(["n"])
        .row(["9"])
        .row(["10"])
        .row(["15"])
        .row(["20"])
        .row(["21"])
        .field(
            FieldBuilder::new("n", "integer")
                .constraint("minimum", 10)
                .constraint("maximum", 20)
                .build(),
        )
        .build()
        .unwrap();

    let options = InspectOptions::new().with_columns(["n"]);
    let report = ValidationInspector::new().inspect(&dataset, &options);
    let failing: Vec<(usize, &str)> = report
        .findings
        .iter()
        .map(|f| (f.row, f.code.as_str()))
        .collect();
    assert_eq!(
        failing,
        vec![(0, "minimum-constraint"), (4, "maximum-constraint")]
    );
}

#[test]
fn test_inspect_is_idempotent() {
    let dataset = gdp();
    let options = InspectOptions::new().with_columns(["Country Code", "Year", "Value"]);
    let inspector = ValidationInspector::new();

    let first = inspector.inspect(&dataset, &options);
    let second = inspector.inspect(&dataset, &options);
    assert_eq!(first.findings, second.findings);
    assert_eq!(first.warnings, second.warnings);
}

#[tokio::test]
async fn test_concurrent_report_equals_sequential() {
    let dataset = gdp();
    let options = InspectOptions::new().with_columns(["Year", "Value", "Country Code", "Nope"]);
    let inspector = ValidationInspector::new();

    let sequential = inspector.inspect(&dataset, &options);
    let concurrent = inspector.inspect_concurrent(&dataset, &options).await;
    assert_eq!(sequential.findings, concurrent.findings);
    assert_eq!(sequential.warnings, concurrent.warnings);
    assert!(!concurrent.interrupted);
}

#[tokio::test]
async fn test_cancelled_run_is_interrupted() {
    let flag = CancellationFlag::new();
    flag.cancel();
    let options = InspectOptions::new()
        .with_columns(["Year"])
        .with_cancellation(flag);
    let inspector = ValidationInspector::new();

    let report = inspector.inspect(&gdp(), &options);
    assert!(report.interrupted);
    assert!(report.findings.is_empty());

    let report = inspector.inspect_concurrent(&gdp(), &options).await;
    assert!(report.interrupted);
    assert!(report.findings.is_empty());
}

#[test]
fn test_missing_schema_yields_empty_report() {
    let dataset = DatasetBuilder::new("bare", "bare")
        .columns(["Year"])
        .row(["abc"])
        .build()
        .unwrap();
    let options = InspectOptions::new().with_columns(["Year"]);
    let report = ValidationInspector::new().inspect(&dataset, &options);

    assert!(report.findings.is_empty());
    assert_eq!(report.warnings, vec!["No schema attached to dataset 'bare'"]);
}

#[test]
fn test_custom_message_template() {
    let options = InspectOptions::new()
        .with_columns(["Year"])
        .with_message("minimum-constraint", "{column_name}: {value} < {constraint} (row {row_number})");
    let report = ValidationInspector::new().inspect(&gdp(), &options);
    let minimum = report
        .findings
        .iter()
        .find(|f| f.code == "minimum-constraint")
        .unwrap();
    assert_eq!(minimum.message, "Year: 1960 < 1962 (row 1)");
}

#[test]
fn test_report_json_shape() {
    let options = InspectOptions::new().with_columns(["Year"]);
    let report = ValidationInspector::new().inspect(&gdp(), &options);
    let json = report.to_json();
    let entries = json["validation-reports"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["column"], "Year");
    assert_eq!(entries[0]["code"], "type-or-format-error");
    assert_eq!(entries[0]["row"], 2);
}

#[test]
fn test_reorder_drops_constraints_from_the_plan() {
    let mut dataset = gdp();
    let order = ["Year", "Value", "Country Name", "Country Code"];
    dataset.columns.reorder(&order).unwrap();
    SchemaSynchronizer::new()
        .on_column_change(
            &mut dataset,
            &ColumnChange::Reorder {
                column_names: order.iter().map(|s| s.to_string()).collect(),
            },
        )
        .unwrap();

    let options = InspectOptions::new().with_columns(["Year"]);
    let report = ValidationInspector::new().inspect(&dataset, &options);
    // Year is now a plain string field: nothing fails.
    assert!(report.passed());
}

#[test]
fn test_moved_column_keeps_its_cells() {
    let mut dataset = gdp();
    dataset.columns.move_column(2, 0).unwrap();
    SchemaSynchronizer::new()
        .on_column_change(
            &mut dataset,
            &ColumnChange::Move {
                column_index: 2,
                new_index: 0,
            },
        )
        .unwrap();

    let options = InspectOptions::new().with_columns(["Year"]);
    let report = ValidationInspector::new().inspect(&dataset, &options);
    assert_eq!(report.findings.len(), 2);
    assert!(report.findings[1].message.contains("column 1"));
}

#[tokio::test]
async fn test_service_edit_then_inspect() {
    let service = ValidationService::new();
    service.register(gdp()).await.unwrap();

    service
        .edit_columns(
            "gdp",
            |columns| columns.insert_column(0, "Region"),
            &ColumnChange::Add {
                column_index: 0,
                column_name: "Region".to_string(),
            },
        )
        .await
        .unwrap();

    let options = InspectOptions::new().with_columns(["Region", "Year"]);
    let report = service.inspect("gdp", &options).await.unwrap();
    // The new column has no cells yet and an unconstrained string field.
    assert!(report.findings_for("Region").next().is_none());
    assert_eq!(report.findings_for("Year").count(), 2);
}

#[test]
fn test_unlisted_type_accepts_any_text() {
    let dataset = DatasetBuilder::new("geo", "geo")
        .columns(["loc"])
        .row(["45.5,9.2"])
        .row(["not a point"])
        .field(FieldBuilder::new("loc", "geopoint").build())
        .build()
        .unwrap();

    let options = InspectOptions::new().with_columns(["loc"]);
    let report = ValidationInspector::new().inspect(&dataset, &options);
    assert!(report.passed());
    assert!(report.findings.is_empty());
}
