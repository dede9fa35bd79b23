use super::{CellValidator, ConstraintContext, PATTERN_CONSTRAINT, ValidatorBase};
use crate::InspectionError;
use cellcheck_core::Cell;
use regex::Regex;

/// Requires the raw text to match a regular expression in full.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    base: ValidatorBase,
    pattern: String,
    regex: Regex,
}

impl PatternValidator {
    /// Compiles the pattern payload, anchored at both ends.
    pub fn new(ctx: &ConstraintContext<'_>) -> Result<Self, InspectionError> {
        let pattern = ctx
            .payload
            .as_str()
            .ok_or_else(|| ctx.invalid(format!("expected a string, found {}", ctx.payload)))?;
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| ctx.invalid(e))?;
        Ok(Self {
            base: ctx.base(PATTERN_CONSTRAINT),
            pattern: pattern.to_string(),
            regex,
        })
    }
}

impl CellValidator for PatternValidator {
    fn code(&self) -> &'static str {
        PATTERN_CONSTRAINT
    }

    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    fn check_cell(&self, cell: Option<&Cell>) -> bool {
        match cell {
            Some(cell) if !cell.is_missing() => self.regex.is_match(&cell.text()),
            _ => true,
        }
    }

    fn lookup(&self) -> Vec<(&'static str, String)> {
        vec![("constraint", self.pattern.clone())]
    }
}
