use anyhow::Result;
use cellcheck_core::{InspectionReport, Schema};
use cellcheck_validator::ConstraintRegistry;
use colored::*;
use serde_json::json;

pub fn print_validation_report(report: &InspectionReport, format: &str) -> Result<()> {
    match format {
        "json" => print_json_report(report),
        _ => {
            print_text_report(report);
            Ok(())
        }
    }
}

fn print_text_report(report: &InspectionReport) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));

    if report.interrupted {
        println!(
            "\n{} {}",
            "!".yellow().bold(),
            "Validation INTERRUPTED".yellow().bold()
        );
    } else if report.passed() {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    if !report.findings.is_empty() {
        println!("\n{}", "Findings:".red().bold());
        for (i, finding) in report.findings.iter().enumerate() {
            println!(
                "  {}. [{}] {}",
                i + 1,
                finding.code.red(),
                finding.message
            );
        }
    }

    if !report.warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for (i, warning) in report.warnings.iter().enumerate() {
            println!("  {}. {}", i + 1, warning.yellow());
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  Total findings: {}", report.findings.len());
    println!("  Total warnings: {}", report.warnings.len());
    println!("  Columns:        {}", report.stats.columns_checked);
    println!("  Rows:           {}", report.stats.rows_scanned);
    println!("  Duration:       {} ms", report.stats.duration_ms);
    println!("{}", "═".repeat(60));
}

fn print_json_report(report: &InspectionReport) -> Result<()> {
    let mut output = report.to_json();
    output["passed"] = json!(report.passed());
    output["interrupted"] = json!(report.interrupted);
    output["warnings"] = json!(report.warnings);
    output["summary"] = json!({
        "finding_count": report.findings.len(),
        "warning_count": report.warnings.len(),
        "columns_checked": report.stats.columns_checked,
        "rows_scanned": report.stats.rows_scanned,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Prints fields with their type, format and constraints. Returns the
/// constraint names the registry does not know.
pub fn print_schema(schema: &Schema, registry: &ConstraintRegistry) -> Vec<String> {
    let mut unknown = Vec::new();
    println!("\nFields:");
    for (i, field) in schema.fields.iter().enumerate() {
        let format = field
            .format
            .as_deref()
            .map(|f| format!(" ({})", f))
            .unwrap_or_default();
        println!(
            "  {}. {}: {}{}",
            i + 1,
            field.name.bold(),
            field.field_type,
            format
        );
        for (name, payload) in &field.constraints {
            if registry.contains(name) {
                println!("       {} = {}", name, payload);
            } else {
                println!("       {} = {} {}", name, payload, "(unknown)".yellow());
                unknown.push(format!("{}.{}", field.name, name));
            }
        }
    }
    unknown
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
