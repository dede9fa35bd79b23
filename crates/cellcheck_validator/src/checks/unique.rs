use super::{
    CellValidator, ConstraintContext, UNIQUE_CONSTRAINT, ValidationPass, ValidatorBase, finding,
};
use crate::{InspectionError, TypedValue, ValueCoercer};
use cellcheck_core::{Cell, Finding};
use std::collections::HashMap;

/// Fails every repeat of a value already seen earlier in the column.
///
/// Values are compared after coercion, so `1` and `1.0` in a number column are
/// the same value. Missing cells never repeat.
#[derive(Debug, Clone)]
pub struct UniqueValidator {
    base: ValidatorBase,
    coercer: ValueCoercer,
    unique: bool,
}

impl UniqueValidator {
    /// Reads the boolean payload.
    pub fn new(ctx: &ConstraintContext<'_>) -> Result<Self, InspectionError> {
        Ok(Self {
            base: ctx.base(UNIQUE_CONSTRAINT),
            coercer: ctx.coercer(),
            unique: ctx.flag()?,
        })
    }

    fn key(&self, cell: Option<&Cell>) -> Option<String> {
        match self.coercer.coerce_cell(cell) {
            Ok(TypedValue::Null) => None,
            // -0.0 and 0.0 are the same value.
            Ok(TypedValue::Number(n)) if n == 0.0 => Some(TypedValue::Number(0.0).to_string()),
            Ok(value) => Some(value.to_string()),
            // Cells that fail coercion are compared by their raw text.
            Err(err) => Some(err.value),
        }
    }
}

impl CellValidator for UniqueValidator {
    fn code(&self) -> &'static str {
        UNIQUE_CONSTRAINT
    }

    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    /// A single cell is always unique on its own.
    fn check_cell(&self, _cell: Option<&Cell>) -> bool {
        true
    }

    fn validate(&self, pass: &ValidationPass<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        if !self.unique {
            return findings;
        }

        let target = self.base.target();
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for (row, cells) in pass.rows().iter().enumerate() {
            if pass.is_cancelled() {
                break;
            }
            let cell = target.cell(cells);
            if !self.filter(cell) {
                continue;
            }
            let Some(key) = self.key(cell) else {
                continue;
            };
            match first_seen.get(&key) {
                Some(&first) => findings.push(finding(
                    self,
                    row,
                    cell,
                    vec![("first_row_number", (first + 1).to_string())],
                )),
                None => {
                    first_seen.insert(key, row);
                }
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{cell, context, field, rows, target};
    use cellcheck_core::InspectOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn build(field_type: &str, payload: serde_json::Value) -> UniqueValidator {
        let (target, field, options) = (target(), field(field_type), InspectOptions::new());
        UniqueValidator::new(&context(&target, &field, "unique", &payload, &options)).unwrap()
    }

    #[test]
    fn test_repeats_after_first_occurrence_fail() {
        let validator = build("string", json!(true));
        let rows = rows(["a", "b", "a", "", "", "a"]);
        let findings = validator.validate(&ValidationPass::new(&rows));

        let failing: Vec<usize> = findings.iter().map(|f| f.row).collect();
        assert_eq!(failing, vec![2, 5]);
        assert_eq!(
            findings[0].message,
            "The value a in row 3 and column 2 repeats row 1, violating the unique constraint"
        );
    }

    #[test]
    fn test_typed_duplicates() {
        let validator = build("number", json!(true));
        let rows = rows(["1", "1.0", "2"]);
        assert_eq!(validator.validate(&ValidationPass::new(&rows)).len(), 1);
    }

    #[test]
    fn test_signed_zeros_repeat() {
        let validator = build("number", json!(true));
        let rows = rows(["-0.0", "0.0", "-0", "1"]);
        let failing: Vec<usize> = validator
            .validate(&ValidationPass::new(&rows))
            .iter()
            .map(|f| f.row)
            .collect();
        assert_eq!(failing, vec![1, 2]);
    }

    #[test]
    fn test_unique_false_and_single_cell() {
        let rows = rows(["a", "a"]);
        assert!(build("string", json!(false)).validate(&ValidationPass::new(&rows)).is_empty());
        assert!(build("string", json!(true)).check_cell(Some(&cell("a"))));
    }
}
