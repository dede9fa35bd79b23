use super::{
    CellValidator, ConstraintContext, MAXIMUM_CONSTRAINT, MINIMUM_CONSTRAINT, ValidatorBase,
    payload_text,
};
use crate::{InspectionError, TypedValue, ValueCoercer};
use cellcheck_core::Cell;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Minimum,
    Maximum,
}

/// Compares a coerced cell against a `minimum` or `maximum` bound.
///
/// Values exactly on the bound pass. [`CellValidator::check_cell`] fails a
/// cell that does not coerce, but such cells are filtered out of a pass so the
/// type and format check reports them once. A missing cell is left to
/// `required`.
#[derive(Debug, Clone)]
pub struct BoundValidator {
    base: ValidatorBase,
    coercer: ValueCoercer,
    bound: Bound,
    limit: TypedValue,
    limit_text: String,
}

impl BoundValidator {
    /// Builds a `minimum` check.
    pub fn minimum(ctx: &ConstraintContext<'_>) -> Result<Self, InspectionError> {
        Self::build(ctx, Bound::Minimum)
    }

    /// Builds a `maximum` check.
    pub fn maximum(ctx: &ConstraintContext<'_>) -> Result<Self, InspectionError> {
        Self::build(ctx, Bound::Maximum)
    }

    fn build(ctx: &ConstraintContext<'_>, bound: Bound) -> Result<Self, InspectionError> {
        let field_type = &ctx.field.field_type;
        if !field_type.is_orderable() {
            return Err(ctx.invalid(format!("type '{field_type}' has no ordering")));
        }

        let coercer = ctx.coercer();
        let limit = coercer.coerce_payload(ctx.payload).map_err(|e| ctx.invalid(e))?;
        if limit.is_null() {
            return Err(ctx.invalid("bound is empty"));
        }

        let code = match bound {
            Bound::Minimum => MINIMUM_CONSTRAINT,
            Bound::Maximum => MAXIMUM_CONSTRAINT,
        };
        Ok(Self {
            base: ctx.base(code),
            coercer,
            bound,
            limit,
            limit_text: payload_text(ctx.payload),
        })
    }
}

impl CellValidator for BoundValidator {
    fn code(&self) -> &'static str {
        match self.bound {
            Bound::Minimum => MINIMUM_CONSTRAINT,
            Bound::Maximum => MAXIMUM_CONSTRAINT,
        }
    }

    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    /// Cells that do not coerce are left to the type and format check.
    fn filter(&self, cell: Option<&Cell>) -> bool {
        self.coercer.coerce_cell(cell).is_ok()
    }

    fn check_cell(&self, cell: Option<&Cell>) -> bool {
        let value = match self.coercer.coerce_cell(cell) {
            Ok(TypedValue::Null) => return true,
            Ok(value) => value,
            Err(_) => return false,
        };
        match (self.bound, value.compare(&self.limit)) {
            (Bound::Minimum, Some(order)) => order != Ordering::Less,
            (Bound::Maximum, Some(order)) => order != Ordering::Greater,
            (_, None) => false,
        }
    }

    fn lookup(&self) -> Vec<(&'static str, String)> {
        vec![("constraint", self.limit_text.clone())]
    }
}
