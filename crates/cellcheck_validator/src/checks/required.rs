use super::{CellValidator, ConstraintContext, REQUIRED_CONSTRAINT, ValidatorBase};
use crate::InspectionError;
use cellcheck_core::Cell;

/// Fails missing cells when the field is required.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    base: ValidatorBase,
    required: bool,
}

impl RequiredValidator {
    /// Reads the boolean payload. `required: false` builds a check that never fails.
    pub fn new(ctx: &ConstraintContext<'_>) -> Result<Self, InspectionError> {
        Ok(Self {
            base: ctx.base(REQUIRED_CONSTRAINT),
            required: ctx.flag()?,
        })
    }
}

impl CellValidator for RequiredValidator {
    fn code(&self) -> &'static str {
        REQUIRED_CONSTRAINT
    }

    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    fn check_cell(&self, cell: Option<&Cell>) -> bool {
        !self.required || cell.is_some_and(|cell| !cell.is_missing())
    }
}
