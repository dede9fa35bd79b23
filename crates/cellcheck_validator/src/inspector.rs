//! Compilation and execution of column check plans.
//!
//! An inspection runs in two passes. First every requested column is compiled
//! into a list of validators (type and format check first, then one validator
//! per declared constraint in declaration order) and the plan is logged. Only
//! then are rows scanned. Problems found while compiling skip a column or a
//! constraint and become report warnings; they never abort the run.

use crate::checks::{
    CellValidator, ColumnTarget, ConstraintContext, TypeOrFormatValidator, ValidationPass,
};
use crate::{ConstraintRegistry, InspectionError};
use cellcheck_core::{Dataset, Field, Finding, InspectOptions, InspectionReport, Row, Schema};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Validators compiled for one column.
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    /// Column name
    pub column: String,
    /// Validators in execution order
    pub validators: Vec<Arc<dyn CellValidator>>,
}

impl ColumnPlan {
    /// Returns the finding codes of the compiled validators.
    pub fn codes(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.code()).collect()
    }

    fn run(&self, pass: &ValidationPass<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for validator in &self.validators {
            if pass.is_cancelled() {
                break;
            }
            findings.extend(validator.validate(pass));
        }
        findings
    }
}

/// The compiled checks of an inspection request.
#[derive(Debug, Clone, Default)]
pub struct CheckPlan {
    /// Column plans in request order
    pub columns: Vec<ColumnPlan>,
    /// Warnings collected while compiling
    pub warnings: Vec<String>,
}

impl CheckPlan {
    /// Returns the total number of validators.
    pub fn validator_count(&self) -> usize {
        self.columns.iter().map(|c| c.validators.len()).sum()
    }
}

/// Builds and runs check plans against datasets.
#[derive(Debug, Clone)]
pub struct ValidationInspector {
    registry: Arc<ConstraintRegistry>,
}

impl Default for ValidationInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationInspector {
    /// Creates an inspector using the shared built-in registry.
    pub fn new() -> Self {
        Self::with_registry(ConstraintRegistry::shared())
    }

    /// Creates an inspector with a custom registry.
    pub fn with_registry(registry: Arc<ConstraintRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry used to resolve constraints.
    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// Compiles the requested columns.
    ///
    /// # Errors
    ///
    /// Returns [`InspectionError::SchemaMissing`] when the dataset has no
    /// schema. Every other problem is recorded in [`CheckPlan::warnings`].
    pub fn compile(
        &self,
        dataset: &Dataset,
        options: &InspectOptions,
    ) -> Result<CheckPlan, InspectionError> {
        let schema = dataset
            .schema()
            .ok_or_else(|| InspectionError::SchemaMissing(dataset.id().to_string()))?;

        let mut plan = CheckPlan::default();
        for name in &options.column_names {
            match self.compile_column(dataset, schema, name, options, &mut plan.warnings) {
                Ok(column) => plan.columns.push(column),
                Err(err) => {
                    warn!(dataset = %dataset.id(), "{}", err);
                    plan.warnings.push(err.to_string());
                }
            }
        }
        Ok(plan)
    }

    fn compile_column(
        &self,
        dataset: &Dataset,
        schema: &Schema,
        name: &str,
        options: &InspectOptions,
        warnings: &mut Vec<String>,
    ) -> Result<ColumnPlan, InspectionError> {
        let field = schema
            .field(name)
            .ok_or_else(|| InspectionError::FieldNotFound(name.to_string()))?;
        let position = dataset
            .columns
            .column_index(name)
            .ok_or_else(|| InspectionError::ColumnNotFound(name.to_string()))?;
        let target = ColumnTarget {
            name: name.to_string(),
            position,
            cell_index: dataset.columns.columns()[position].cell_index,
        };

        let mut validators: Vec<Arc<dyn CellValidator>> =
            vec![Arc::new(TypeOrFormatValidator::new(&target, field, options))];
        for (constraint, payload) in &field.constraints {
            match self.build_constraint(&target, field, constraint, payload, options) {
                Ok(validator) => validators.push(validator),
                Err(err) => {
                    warn!(dataset = %dataset.id(), "skipping constraint: {}", err);
                    warnings.push(err.to_string());
                }
            }
        }

        Ok(ColumnPlan {
            column: name.to_string(),
            validators,
        })
    }

    fn build_constraint(
        &self,
        target: &ColumnTarget,
        field: &Field,
        constraint: &str,
        payload: &serde_json::Value,
        options: &InspectOptions,
    ) -> Result<Arc<dyn CellValidator>, InspectionError> {
        let constructor =
            self.registry
                .resolve(constraint)
                .ok_or_else(|| InspectionError::UnknownConstraint {
                    column: target.name.clone(),
                    constraint: constraint.to_string(),
                })?;
        constructor(&ConstraintContext {
            target,
            field,
            constraint,
            payload,
            options,
        })
    }

    /// Runs a compiled plan over rows, in column, validator, row order.
    pub fn execute(
        &self,
        plan: &CheckPlan,
        rows: &[Row],
        options: &InspectOptions,
    ) -> InspectionReport {
        let pass = ValidationPass::new(rows).with_cancellation(options.cancellation.as_ref());
        let mut report = report_for(plan, rows.len());
        for column in &plan.columns {
            if pass.is_cancelled() {
                break;
            }
            report.findings.extend(column.run(&pass));
        }
        report.interrupted = pass.is_cancelled();
        report
    }

    /// Validates the requested columns of a dataset.
    ///
    /// Never fails: a missing schema yields an empty report with a warning.
    pub fn inspect(&self, dataset: &Dataset, options: &InspectOptions) -> InspectionReport {
        let start = Instant::now();
        info!(
            dataset = %dataset.id(),
            columns = ?options.column_names,
            "starting inspection"
        );

        let Some(plan) = self.compile_logged(dataset, options) else {
            return InspectionReport::empty_with_warning(
                InspectionError::SchemaMissing(dataset.id().to_string()).to_string(),
            );
        };
        let mut report = self.execute(&plan, dataset.rows(), options);
        finish(dataset, &mut report, start);
        report
    }

    /// Validates the requested columns with one blocking task per column.
    ///
    /// Columns share the compiled plan and a snapshot of the rows. Results are
    /// reassembled in request order, so the report equals the one of
    /// [`ValidationInspector::inspect`].
    pub async fn inspect_concurrent(
        &self,
        dataset: &Dataset,
        options: &InspectOptions,
    ) -> InspectionReport {
        let start = Instant::now();
        info!(
            dataset = %dataset.id(),
            columns = ?options.column_names,
            "starting concurrent inspection"
        );

        let Some(plan) = self.compile_logged(dataset, options) else {
            return InspectionReport::empty_with_warning(
                InspectionError::SchemaMissing(dataset.id().to_string()).to_string(),
            );
        };

        let rows = dataset.shared_rows();
        let tasks: Vec<_> = plan
            .columns
            .iter()
            .cloned()
            .map(|column| {
                let rows = Arc::clone(&rows);
                let cancellation = options.cancellation.clone();
                tokio::task::spawn_blocking(move || {
                    let pass = ValidationPass::new(&rows).with_cancellation(cancellation.as_ref());
                    column.run(&pass)
                })
            })
            .collect();

        let mut report = report_for(&plan, rows.len());
        for (column, task) in plan.columns.iter().zip(tasks) {
            match task.await {
                Ok(findings) => report.findings.extend(findings),
                Err(err) => {
                    error!(column = %column.column, "validation task failed: {}", err);
                    report.add_warning(format!(
                        "Validation of column '{}' failed: {}",
                        column.column, err
                    ));
                }
            }
        }
        report.interrupted = options.is_cancelled();
        finish(dataset, &mut report, start);
        report
    }

    fn compile_logged(&self, dataset: &Dataset, options: &InspectOptions) -> Option<CheckPlan> {
        match self.compile(dataset, options) {
            Ok(plan) => {
                for column in &plan.columns {
                    debug!(column = %column.column, validators = ?column.codes(), "compiled checks");
                }
                debug!(
                    columns = plan.columns.len(),
                    validators = plan.validator_count(),
                    "check plan ready"
                );
                Some(plan)
            }
            Err(err) => {
                error!("cannot compile checks: {}", err);
                None
            }
        }
    }
}

fn report_for(plan: &CheckPlan, rows: usize) -> InspectionReport {
    let mut report = InspectionReport::new();
    report.warnings = plan.warnings.clone();
    report.stats.columns_checked = plan.columns.len();
    report.stats.validators_compiled = plan.validator_count();
    report.stats.rows_scanned = rows;
    report
}

fn finish(dataset: &Dataset, report: &mut InspectionReport, start: Instant) {
    report.stats.duration_ms = start.elapsed().as_millis() as u64;
    if report.interrupted {
        warn!(dataset = %dataset.id(), "inspection interrupted");
    }
    info!(
        dataset = %dataset.id(),
        findings = report.findings.len(),
        warnings = report.warnings.len(),
        duration_ms = report.stats.duration_ms,
        "inspection finished"
    );
}
