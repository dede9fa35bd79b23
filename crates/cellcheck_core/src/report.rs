//! Inspection options, findings and reports.
//!
//! An [`InspectOptions`] names the columns to check. The resulting
//! [`InspectionReport`] holds one [`Finding`] per failing cell plus the warnings
//! for anything that was skipped along the way.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative interruption flag shared between a caller and a running
/// inspection. Checked between rows.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

fn default_strict() -> bool {
    true
}

/// Options for one inspection request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectOptions {
    /// Columns to validate, in the order findings are reported
    #[serde(default)]
    pub column_names: Vec<String>,

    /// Use the exact lexical grammar of each type when coercing
    #[serde(default = "default_strict")]
    pub strict: bool,

    /// Message template overrides, keyed by finding code
    #[serde(default)]
    pub messages: HashMap<String, String>,

    /// Optional interruption flag
    #[serde(skip)]
    pub cancellation: Option<CancellationFlag>,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            column_names: Vec::new(),
            strict: default_strict(),
            messages: HashMap::new(),
            cancellation: None,
        }
    }
}

impl InspectOptions {
    /// Creates options with default settings and no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the columns to validate.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_names = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets coercion strictness.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Overrides the message template for a finding code.
    pub fn with_message(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(code.into(), template.into());
        self
    }

    /// Attaches an interruption flag.
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Returns true if the attached flag was raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationFlag::is_cancelled)
    }
}

/// Severity of a finding.
///
/// Every finding is an error. Problems that do not fail a cell, such as an
/// unknown constraint, are reported through [`InspectionReport::warnings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The cell violates the schema
    #[default]
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One reported validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Column name
    pub column: String,
    /// Zero-based row index
    pub row: usize,
    /// Constraint code (e.g. "minimum-constraint")
    pub code: String,
    /// Rendered human-readable message
    pub message: String,
    /// Severity
    pub severity: Severity,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} row {}: {}",
            self.code, self.column, self.row, self.message
        )
    }
}

/// Statistics about an inspection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionStats {
    /// Number of columns with a compiled plan
    pub columns_checked: usize,
    /// Number of validators compiled across all columns
    pub validators_compiled: usize,
    /// Number of rows in the dataset
    pub rows_scanned: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Report of an inspection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    /// Findings in column, validator, row order
    pub findings: Vec<Finding>,

    /// Non-fatal problems: missing schema, skipped constraints, ...
    pub warnings: Vec<String>,

    /// Execution statistics
    pub stats: InspectionStats,

    /// True if the run stopped early because it was cancelled
    pub interrupted: bool,
}

impl InspectionReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty report carrying a single warning.
    pub fn empty_with_warning(warning: impl Into<String>) -> Self {
        Self {
            warnings: vec![warning.into()],
            ..Self::default()
        }
    }

    /// Returns true if no finding was produced.
    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Returns findings for one column.
    pub fn findings_for<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| f.column == column)
    }

    /// Returns the JSON shape consumed by the command layer.
    pub fn to_json(&self) -> Value {
        json!({ "validation-reports": self.findings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_options_from_request_json() {
        let options: InspectOptions =
            serde_json::from_str(r#"{"columnNames": ["Year", "Value"]}"#).unwrap();
        assert_eq!(options.column_names, vec!["Year", "Value"]);
        assert!(options.strict);
        assert!(options.messages.is_empty());
        assert!(!options.is_cancelled());
    }

    #[test]
    fn test_cancellation_is_shared() {
        let flag = CancellationFlag::new();
        let options = InspectOptions::new().with_cancellation(flag.clone());
        assert!(!options.is_cancelled());
        flag.cancel();
        assert!(options.is_cancelled());
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = InspectionReport::new();
        report.findings.push(Finding {
            column: "Year".to_string(),
            row: 0,
            code: "minimum-constraint".to_string(),
            message: "too small".to_string(),
            severity: Severity::Error,
        });
        assert_eq!(
            report.to_json(),
            json!({
                "validation-reports": [{
                    "column": "Year",
                    "row": 0,
                    "code": "minimum-constraint",
                    "message": "too small",
                    "severity": "error"
                }]
            })
        );
        assert!(!report.passed());
    }

    #[test]
    fn test_only_error_severity_is_accepted() {
        assert_eq!(Severity::default(), Severity::Error);
        assert_eq!(Severity::Error.to_string(), "error");
        assert!(serde_json::from_value::<Severity>(json!("warning")).is_err());
    }
}
