//! Per-cell validators.
//!
//! One validator exists per (column, constraint) pair of a compiled plan. Each
//! holds only the parameters it captured at construction, so a plan can be
//! shared across worker tasks behind an [`Arc`](std::sync::Arc).
//!
//! Messages are rendered from templates with `{name}` placeholders. Every
//! template can use `{value}`, `{row_number}`, `{column_number}` (both
//! 1-based) and `{column_name}`; validators add their own parameters through
//! [`CellValidator::lookup`].

mod bounds;
mod enumeration;
mod length;
mod pattern;
mod required;
mod type_format;
mod unique;

pub use bounds::BoundValidator;
pub use enumeration::EnumValidator;
pub use length::LengthValidator;
pub use pattern::PatternValidator;
pub use required::RequiredValidator;
pub use type_format::TypeOrFormatValidator;
pub use unique::UniqueValidator;

use crate::{InspectionError, ValueCoercer};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use cellcheck_core::{CancellationFlag, Cell, Field, Finding, InspectOptions, Row, Severity};
use serde_json::Value;
use std::fmt;

/// Code of the mandatory type and format check.
pub const TYPE_OR_FORMAT_ERROR: &str = "type-or-format-error";
/// Code of the `minimum` check.
pub const MINIMUM_CONSTRAINT: &str = "minimum-constraint";
/// Code of the `maximum` check.
pub const MAXIMUM_CONSTRAINT: &str = "maximum-constraint";
/// Code of the `minLength` check.
pub const MINIMUM_LENGTH_CONSTRAINT: &str = "minimum-length-constraint";
/// Code of the `maxLength` check.
pub const MAXIMUM_LENGTH_CONSTRAINT: &str = "maximum-length-constraint";
/// Code of the `pattern` check.
pub const PATTERN_CONSTRAINT: &str = "pattern-constraint";
/// Code of the `enum` check.
pub const ENUMERABLE_CONSTRAINT: &str = "enumerable-constraint";
/// Code of the `required` check.
pub const REQUIRED_CONSTRAINT: &str = "required-constraint";
/// Code of the `unique` check.
pub const UNIQUE_CONSTRAINT: &str = "unique-constraint";

/// Returns the built-in message template for a finding code.
pub fn default_template(code: &str) -> &'static str {
    match code {
        TYPE_OR_FORMAT_ERROR => {
            "The value {value} in row {row_number} and column {column_number} is not type {field_type} and format {field_format}"
        }
        MINIMUM_CONSTRAINT => {
            "The value {value} in row {row_number} and column {column_number} does not conform to the minimum constraint of {constraint}"
        }
        MAXIMUM_CONSTRAINT => {
            "The value {value} in row {row_number} and column {column_number} does not conform to the maximum constraint of {constraint}"
        }
        MINIMUM_LENGTH_CONSTRAINT => {
            "The value {value} in row {row_number} and column {column_number} does not conform to the minimum length constraint of {constraint}"
        }
        MAXIMUM_LENGTH_CONSTRAINT => {
            "The value {value} in row {row_number} and column {column_number} does not conform to the maximum length constraint of {constraint}"
        }
        PATTERN_CONSTRAINT => {
            "The value {value} in row {row_number} and column {column_number} does not conform to the pattern constraint of {constraint}"
        }
        ENUMERABLE_CONSTRAINT => {
            "The value {value} in row {row_number} and column {column_number} does not conform to the given enumeration: {constraint}"
        }
        REQUIRED_CONSTRAINT => {
            "Column {column_number} is a required field, but row {row_number} has no value"
        }
        UNIQUE_CONSTRAINT => {
            "The value {value} in row {row_number} and column {column_number} repeats row {first_row_number}, violating the unique constraint"
        }
        _ => "The value {value} in row {row_number} and column {column_number} failed check {code}",
    }
}

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    // Constant pattern, known to be valid
    #[allow(clippy::expect_used)]
    Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid")
});

/// Substitutes `{name}` placeholders in a single scan of the template.
/// Unknown placeholders are left as they are; substituted text is never
/// rescanned.
pub fn render_template(template: &str, params: &[(&str, String)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.clone())
        })
        .into_owned()
}

/// The column a validator reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTarget {
    /// Column name
    pub name: String,
    /// Zero-based position in the column model
    pub position: usize,
    /// Index of the column's cells within a row
    pub cell_index: usize,
}

impl ColumnTarget {
    /// Reads this column's cell from a row.
    pub fn cell<'r>(&self, row: &'r Row) -> Option<&'r Cell> {
        row.cell(self.cell_index)
    }
}

/// State shared by all validators: where to read and how to report.
#[derive(Debug, Clone)]
pub struct ValidatorBase {
    target: ColumnTarget,
    template: String,
}

impl ValidatorBase {
    /// Resolves the message template for `code`, honoring overrides.
    pub fn new(code: &str, target: &ColumnTarget, options: &InspectOptions) -> Self {
        let template = options
            .messages
            .get(code)
            .cloned()
            .unwrap_or_else(|| default_template(code).to_string());
        Self {
            target: target.clone(),
            template,
        }
    }

    /// Returns the target column.
    pub fn target(&self) -> &ColumnTarget {
        &self.target
    }

    /// Returns the message template.
    pub fn template(&self) -> &str {
        &self.template
    }
}

/// Input of a constraint validator constructor.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintContext<'a> {
    /// Column the constraint is declared on
    pub target: &'a ColumnTarget,
    /// Field carrying the constraint
    pub field: &'a Field,
    /// Constraint name
    pub constraint: &'a str,
    /// Constraint payload
    pub payload: &'a Value,
    /// Options of the current run
    pub options: &'a InspectOptions,
}

impl ConstraintContext<'_> {
    /// Returns a coercer for the field's type and format.
    pub fn coercer(&self) -> ValueCoercer {
        ValueCoercer::for_field(self.field, self.options.strict)
    }

    /// Builds the shared validator state for a finding code.
    pub fn base(&self, code: &str) -> ValidatorBase {
        ValidatorBase::new(code, self.target, self.options)
    }

    /// Rejects the payload.
    pub fn invalid(&self, reason: impl ToString) -> InspectionError {
        InspectionError::construction(&self.target.name, self.constraint, reason)
    }

    /// Reads a `true`/`false` payload.
    pub fn flag(&self) -> Result<bool, InspectionError> {
        self.payload
            .as_bool()
            .ok_or_else(|| self.invalid(format!("expected a boolean, found {}", self.payload)))
    }

    /// Reads a non-negative integer payload, also accepted as text.
    pub fn count(&self) -> Result<usize, InspectionError> {
        let count = match self.payload {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        count
            .and_then(|c| usize::try_from(c).ok())
            .ok_or_else(|| {
                self.invalid(format!("expected a non-negative integer, found {}", self.payload))
            })
    }
}

/// Rows handed to validators, plus the interruption flag of the run.
#[derive(Debug, Clone, Copy)]
pub struct ValidationPass<'a> {
    rows: &'a [Row],
    cancellation: Option<&'a CancellationFlag>,
}

impl<'a> ValidationPass<'a> {
    /// Creates a pass over `rows`.
    pub fn new(rows: &'a [Row]) -> Self {
        Self {
            rows,
            cancellation: None,
        }
    }

    /// Attaches an interruption flag.
    pub fn with_cancellation(mut self, cancellation: Option<&'a CancellationFlag>) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns the rows.
    pub fn rows(&self) -> &'a [Row] {
        self.rows
    }

    /// Returns true once the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_some_and(CancellationFlag::is_cancelled)
    }
}

/// A check of one column, run cell by cell.
pub trait CellValidator: fmt::Debug + Send + Sync {
    /// Finding code.
    fn code(&self) -> &'static str;

    /// Shared state.
    fn base(&self) -> &ValidatorBase;

    /// Decides whether a cell is checked at all. Defaults to every cell.
    fn filter(&self, _cell: Option<&Cell>) -> bool {
        true
    }

    /// Returns true if the cell passes. Never panics.
    fn check_cell(&self, cell: Option<&Cell>) -> bool;

    /// Validator-specific message parameters.
    fn lookup(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Checks every row, stopping between rows once the pass is cancelled.
    fn validate(&self, pass: &ValidationPass<'_>) -> Vec<Finding> {
        let target = self.base().target();
        let mut findings = Vec::new();
        for (row, cells) in pass.rows().iter().enumerate() {
            if pass.is_cancelled() {
                break;
            }
            let cell = target.cell(cells);
            if self.filter(cell) && !self.check_cell(cell) {
                findings.push(finding(self, row, cell, Vec::new()));
            }
        }
        findings
    }
}

/// Renders the finding of a validator for one failing cell.
///
/// `extra` parameters are substituted after the common and validator-specific
/// ones.
pub fn finding<V: CellValidator + ?Sized>(
    validator: &V,
    row: usize,
    cell: Option<&Cell>,
    extra: Vec<(&'static str, String)>,
) -> Finding {
    let base = validator.base();
    let target = base.target();
    let mut params = vec![
        ("value", cell.map(Cell::text).unwrap_or_default()),
        ("row_number", (row + 1).to_string()),
        ("column_number", (target.position + 1).to_string()),
        ("column_name", target.name.clone()),
        ("code", validator.code().to_string()),
    ];
    params.extend(validator.lookup());
    params.extend(extra);

    Finding {
        column: target.name.clone(),
        row,
        code: validator.code().to_string(),
        message: render_template(base.template(), &params),
        severity: Severity::Error,
    }
}

/// Formats a constraint payload for messages: strings unquoted, JSON otherwise.
pub(crate) fn payload_text(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use cellcheck_core::{CellValue, FieldBuilder};

    pub fn target() -> ColumnTarget {
        ColumnTarget {
            name: "Year".to_string(),
            position: 1,
            cell_index: 0,
        }
    }

    pub fn field(field_type: &str) -> Field {
        FieldBuilder::new("Year", field_type).build()
    }

    pub fn context<'a>(
        target: &'a ColumnTarget,
        field: &'a Field,
        constraint: &'a str,
        payload: &'a Value,
        options: &'a InspectOptions,
    ) -> ConstraintContext<'a> {
        ConstraintContext {
            target,
            field,
            constraint,
            payload,
            options,
        }
    }

    pub fn cell(value: impl Into<CellValue>) -> Cell {
        Cell::new(value)
    }

    pub fn rows<I, V>(values: I) -> Vec<Row>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        values
            .into_iter()
            .map(|v| Row::from_values([v]))
            .collect()
    }
}
